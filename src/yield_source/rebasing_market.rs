//! Rebasing Market - index-scaled yield source
//!
//! Holdings are stored as scaled balances and valued against an index the
//! admin rebases up or down. The index is not backed by the market's real
//! balance: after an upward rebase the market reports more than it can pay
//! and withdrawals are capped at what it actually holds.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;
use crate::errors::MarketError;
use crate::math::{Rounding, VaultMath};
use crate::token::Cep18TokenContractRef;

/// Index scale (1e18 = 1.0)
pub const INDEX_SCALE: u128 = 1_000_000_000_000_000_000;

/// Rebasing Market contract
#[odra::module]
pub struct RebasingMarket {
    /// Underlying asset address
    asset: Var<Address>,
    /// Current rebase index, scaled by 1e18
    index: Var<U256>,
    /// Scaled balances per holder
    scaled_balances: Mapping<Address, U256>,
    /// Sum of scaled balances
    total_scaled: Var<U256>,
    /// Admin address
    admin: Var<Address>,
}

#[odra::module]
impl RebasingMarket {
    /// Initialize the market for `asset` at index 1.0
    pub fn init(&mut self, asset: Address) {
        let caller = self.env().caller();
        self.asset.set(asset);
        self.index.set(U256::from(INDEX_SCALE));
        self.total_scaled.set(U256::zero());
        self.admin.set(caller);
    }

    pub fn asset(&self) -> Address {
        self.asset.get_or_revert_with(MarketError::Unauthorized)
    }

    pub fn index(&self) -> U256 {
        self.index.get_or_default()
    }

    pub fn scaled_balance_of(&self, holder: Address) -> U256 {
        self.scaled_balances.get(&holder).unwrap_or_default()
    }

    pub fn total_scaled(&self) -> U256 {
        self.total_scaled.get_or_default()
    }

    /// Deposit `assets` from the caller
    pub fn deposit(&mut self, assets: U256) -> U256 {
        let caller = self.env().caller();
        let scaled = self.scale(assets, Rounding::Down);
        if scaled.is_zero() {
            self.env().revert(MarketError::ZeroShares);
        }

        let mut token = Cep18TokenContractRef::new(self.env(), self.asset());
        if !token.transfer_from(caller, self.env().self_address(), assets) {
            self.env().revert(MarketError::TransferFailed);
        }

        let balance = self.scaled_balance_of(caller);
        self.scaled_balances.set(&caller, balance + scaled);
        let total = self.total_scaled();
        self.total_scaled.set(total + scaled);

        assets
    }

    /// Withdraw up to `assets` to the caller
    ///
    /// Pays at most the market's real asset balance.
    pub fn withdraw(&mut self, assets: U256) -> U256 {
        let caller = self.env().caller();
        let scaled = self.scale(assets, Rounding::Up);
        let balance = self.scaled_balance_of(caller);
        if balance < scaled {
            self.env().revert(MarketError::InsufficientShares);
        }

        self.scaled_balances.set(&caller, balance - scaled);
        let total = self.total_scaled();
        self.total_scaled.set(total - scaled);

        let mut token = Cep18TokenContractRef::new(self.env(), self.asset());
        let payout = assets.min(token.balance_of(self.env().self_address()));
        if !token.transfer(caller, payout) {
            self.env().revert(MarketError::TransferFailed);
        }

        payout
    }

    /// Underlying value of `holder`'s scaled balance at the current index
    pub fn total_assets_held(&self, holder: Address) -> U256 {
        VaultMath::mul_div(
            self.scaled_balance_of(holder),
            self.index(),
            U256::from(INDEX_SCALE),
            Rounding::Down,
        )
        .unwrap_or_else(|err| self.env().revert(err))
    }

    /// Move the index, revaluing every holder
    pub fn rebase(&mut self, new_index: U256) {
        let caller = self.env().caller();
        let admin = self.admin.get_or_revert_with(MarketError::Unauthorized);
        if caller != admin {
            self.env().revert(MarketError::Unauthorized);
        }
        self.index.set(new_index);
    }

    fn scale(&self, assets: U256, rounding: Rounding) -> U256 {
        VaultMath::mul_div(assets, U256::from(INDEX_SCALE), self.index(), rounding)
            .unwrap_or_else(|err| self.env().revert(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odra::host::{Deployer, HostRef};
    use crate::tokens::{UnderlyingToken, UnderlyingTokenInitArgs};

    #[test]
    fn test_rebase_revalues_and_caps_payout() {
        let env = odra_test::env();
        let mut asset = UnderlyingToken::deploy(&env, UnderlyingTokenInitArgs {
            name: String::from("Staked ETH"),
            symbol: String::from("stETH"),
            decimals: 18,
        });
        let mut market = RebasingMarket::deploy(&env, RebasingMarketInitArgs {
            asset: asset.address().clone(),
        });
        let admin = env.get_account(0);
        let user = env.get_account(1);
        let market_address = market.address().clone();

        asset.mint(user, U256::from(1_000));
        env.set_caller(user);
        asset.approve(market_address, U256::from(1_000));
        market.deposit(U256::from(1_000));

        // +10% index without funding: the market over-reports
        env.set_caller(admin);
        market.rebase(U256::from(INDEX_SCALE / 10 * 11));
        assert_eq!(market.total_assets_held(user), U256::from(1_100));

        env.set_caller(user);
        let paid = market.withdraw(U256::from(1_100));
        assert_eq!(paid, U256::from(1_000));
        assert_eq!(market.scaled_balance_of(user), U256::zero());
    }

    #[test]
    fn test_negative_rebase() {
        let env = odra_test::env();
        let mut asset = UnderlyingToken::deploy(&env, UnderlyingTokenInitArgs {
            name: String::from("Staked ETH"),
            symbol: String::from("stETH"),
            decimals: 18,
        });
        let mut market = RebasingMarket::deploy(&env, RebasingMarketInitArgs {
            asset: asset.address().clone(),
        });
        let user = env.get_account(1);
        let market_address = market.address().clone();

        asset.mint(user, U256::from(1_000));
        env.set_caller(user);
        asset.approve(market_address, U256::from(1_000));
        market.deposit(U256::from(1_000));

        env.set_caller(env.get_account(0));
        market.rebase(U256::from(INDEX_SCALE / 2));
        assert_eq!(market.total_assets_held(user), U256::from(500));

        env.set_caller(user);
        assert_eq!(
            market.try_withdraw(U256::from(501)),
            Err(MarketError::InsufficientShares.into())
        );
    }
}
