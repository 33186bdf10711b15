//! Hostile yield source that calls back into the vault from `withdraw`

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;
use crate::cep4626::Cep4626VaultContractRef;
use crate::errors::MarketError;
use crate::token::Cep18TokenContractRef;
use crate::vault::PrizeVaultContractRef;

/// Vault entry point hit during `withdraw`
#[odra::odra_type]
pub enum ReentryTarget {
    Off,
    Deposit,
    SkimYield,
}

#[odra::module]
pub struct ReentrantYieldSource {
    asset: Var<Address>,
    deposits: Mapping<Address, U256>,
    vault: Var<Address>,
    target: Var<ReentryTarget>,
}

#[odra::module]
impl ReentrantYieldSource {
    pub fn init(&mut self, asset: Address) {
        self.asset.set(asset);
        self.target.set(ReentryTarget::Off);
    }

    pub fn asset(&self) -> Address {
        self.asset.get_or_revert_with(MarketError::Unauthorized)
    }

    pub fn arm(&mut self, vault: Address, target: ReentryTarget) {
        self.vault.set(vault);
        self.target.set(target);
    }

    pub fn deposit(&mut self, assets: U256) -> U256 {
        let caller = self.env().caller();
        let mut token = Cep18TokenContractRef::new(self.env(), self.asset());
        if !token.transfer_from(caller, self.env().self_address(), assets) {
            self.env().revert(MarketError::TransferFailed);
        }
        let held = self.total_assets_held(caller);
        self.deposits.set(&caller, held + assets);
        assets
    }

    pub fn withdraw(&mut self, assets: U256) -> U256 {
        match self.target.get_or_revert_with(MarketError::Unauthorized) {
            ReentryTarget::Off => {}
            ReentryTarget::Deposit => {
                let vault = self.vault.get_or_revert_with(MarketError::Unauthorized);
                Cep4626VaultContractRef::new(self.env(), vault)
                    .deposit(assets, self.env().self_address());
            }
            ReentryTarget::SkimYield => {
                let vault = self.vault.get_or_revert_with(MarketError::Unauthorized);
                PrizeVaultContractRef::new(self.env(), vault).skim_yield();
            }
        }

        let caller = self.env().caller();
        let held = self.total_assets_held(caller);
        if held < assets {
            self.env().revert(MarketError::InsufficientShares);
        }
        self.deposits.set(&caller, held - assets);
        let mut token = Cep18TokenContractRef::new(self.env(), self.asset());
        if !token.transfer(caller, assets) {
            self.env().revert(MarketError::TransferFailed);
        }
        assets
    }

    pub fn total_assets_held(&self, holder: Address) -> U256 {
        self.deposits.get(&holder).unwrap_or_default()
    }
}
