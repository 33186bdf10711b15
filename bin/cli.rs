//! CLI tool for deploying and operating the prize vault contracts.

use prize_vault_contracts::tokens::UnderlyingToken;
use prize_vault_contracts::vault::{PrizeVault, SkimMode};
use prize_vault_contracts::yield_source::ShareMarket;
use odra::casper_types::U256;
use odra::prelude::{Address, Addressable};
use odra::host::HostEnv;
use odra::schema::casper_contract_schema::NamedCLType;
use odra_cli::{
    deploy::DeployScript,
    scenario::{Args, Error, Scenario, ScenarioMetadata},
    CommandArg, ContractProvider, DeployedContractsContainer, DeployerExt,
    OdraCli,
};

/// Deploys a mintable underlying asset and a share market for it.
pub struct MarketDeployScript;

impl DeployScript for MarketDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer
    ) -> Result<(), odra_cli::deploy::Error> {
        use prize_vault_contracts::tokens::UnderlyingTokenInitArgs;
        use prize_vault_contracts::yield_source::share_market::ShareMarketInitArgs;

        let asset = UnderlyingToken::load_or_deploy(
            &env,
            UnderlyingTokenInitArgs {
                name: String::from("USD Coin"),
                symbol: String::from("USDC"),
                decimals: 6,
            },
            container,
            300_000_000_000
        )?;

        let _market = ShareMarket::load_or_deploy(
            &env,
            ShareMarketInitArgs {
                asset: asset.address().clone(),
            },
            container,
            300_000_000_000
        )?;

        Ok(())
    }
}

/// Deploys the prize vault on top of the deployed share market.
/// Requires the market to be deployed first.
pub struct VaultDeployScript;

impl DeployScript for VaultDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer
    ) -> Result<(), odra_cli::deploy::Error> {
        use prize_vault_contracts::vault::prize_vault::PrizeVaultInitArgs;

        let asset = container.contract_ref::<UnderlyingToken>(env)?;
        let market = container.contract_ref::<ShareMarket>(env)?;
        let caller = env.caller();

        let _vault = PrizeVault::load_or_deploy(
            &env,
            PrizeVaultInitArgs {
                asset: asset.address().clone(),
                yield_source: market.address().clone(),
                yield_recipient: caller,
                name: String::from("Prize USDC"),
                symbol: String::from("pUSDC"),
                decimals_offset: 6,
                yield_buffer: U256::from(100_000),
                skim_mode: SkimMode::MintShares,
            },
            container,
            600_000_000_000
        )?;

        Ok(())
    }
}

/// Deploys the market and the vault.
pub struct PrizeVaultDeployScript;

impl DeployScript for PrizeVaultDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer
    ) -> Result<(), odra_cli::deploy::Error> {
        MarketDeployScript.deploy(env, container)?;
        VaultDeployScript.deploy(env, container)?;
        Ok(())
    }
}

/// Scenario to skim surplus yield to the yield recipient.
pub struct SkimYieldScenario;

impl Scenario for SkimYieldScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        _args: Args
    ) -> Result<(), Error> {
        let mut vault = container.contract_ref::<PrizeVault>(env)?;

        env.set_gas(300_000_000_000);
        let skimmed = vault.try_skim_yield()?;

        println!("Skimmed {} assets of yield", skimmed);
        Ok(())
    }
}

impl ScenarioMetadata for SkimYieldScenario {
    const NAME: &'static str = "skim-yield";
    const DESCRIPTION: &'static str = "Realizes surplus yield for the yield recipient";
}

/// Scenario to point skimmed yield at a new recipient.
pub struct SetYieldRecipientScenario;

impl Scenario for SetYieldRecipientScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![CommandArg::new(
            "recipient",
            "Address receiving skimmed yield",
            NamedCLType::Key,
        )]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        args: Args
    ) -> Result<(), Error> {
        let mut vault = container.contract_ref::<PrizeVault>(env)?;
        let recipient = args.get_single::<Address>("recipient")?;

        env.set_gas(100_000_000_000);
        vault.try_set_yield_recipient(recipient)?;

        println!("Yield recipient updated");
        Ok(())
    }
}

impl ScenarioMetadata for SetYieldRecipientScenario {
    const NAME: &'static str = "set-yield-recipient";
    const DESCRIPTION: &'static str = "Sets the address that receives skimmed yield";
}

/// Main function to run the CLI tool.
pub fn main() {
    OdraCli::new()
        .about("CLI tool for the prize vault contracts")
        // Deploy scripts
        .deploy(MarketDeployScript)
        .deploy(VaultDeployScript)
        .deploy(PrizeVaultDeployScript)
        // Contract references
        .contract::<UnderlyingToken>()
        .contract::<ShareMarket>()
        .contract::<PrizeVault>()
        // Scenarios
        .scenario(SkimYieldScenario)
        .scenario(SetYieldRecipientScenario)
        .build()
        .run();
}
