//! Share Market - ERC4626-style pooled yield source
//!
//! Depositors receive market shares priced against the market's whole asset
//! balance, so anything sent to the market (interest, donations) raises every
//! holder's claim. Shares round down on deposit and up on withdrawal, which
//! leaves holders one or two units short of their nominal deposits.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;
use crate::errors::MarketError;
use crate::math::{Rounding, VaultMath};
use crate::token::Cep18TokenContractRef;

/// Share Market contract
#[odra::module]
pub struct ShareMarket {
    /// Underlying asset address
    asset: Var<Address>,
    /// Total market shares outstanding
    total_shares: Var<U256>,
    /// Market shares per holder
    shares: Mapping<Address, U256>,
    /// Amount withheld from every withdrawal
    withdraw_haircut: Var<U256>,
    /// Most a single deposit call accepts; unset means unlimited
    deposit_limit: Var<U256>,
    /// Admin address
    admin: Var<Address>,
}

#[odra::module]
impl ShareMarket {
    /// Initialize the market for `asset`
    pub fn init(&mut self, asset: Address) {
        let caller = self.env().caller();
        self.asset.set(asset);
        self.total_shares.set(U256::zero());
        self.withdraw_haircut.set(U256::zero());
        self.admin.set(caller);
    }

    pub fn asset(&self) -> Address {
        self.asset.get_or_revert_with(MarketError::Unauthorized)
    }

    pub fn total_shares(&self) -> U256 {
        self.total_shares.get_or_default()
    }

    pub fn shares_of(&self, holder: Address) -> U256 {
        self.shares.get(&holder).unwrap_or_default()
    }

    /// Asset balance of the market
    pub fn total_market_assets(&self) -> U256 {
        let token = Cep18TokenContractRef::new(self.env(), self.asset());
        token.balance_of(self.env().self_address())
    }

    /// Deposit up to `assets` from the caller and credit market shares
    ///
    /// Returns the amount actually pulled, capped by the deposit limit.
    pub fn deposit(&mut self, assets: U256) -> U256 {
        let caller = self.env().caller();
        let assets = assets.min(self.deposit_limit());
        let shares = self.to_shares(assets, Rounding::Down);
        if shares.is_zero() {
            self.env().revert(MarketError::ZeroShares);
        }

        let mut token = Cep18TokenContractRef::new(self.env(), self.asset());
        if !token.transfer_from(caller, self.env().self_address(), assets) {
            self.env().revert(MarketError::TransferFailed);
        }

        let total = self.total_shares();
        self.total_shares.set(total + shares);
        let held = self.shares_of(caller);
        self.shares.set(&caller, held + shares);

        assets
    }

    /// Withdraw `assets` to the caller, burning the shares they are worth
    pub fn withdraw(&mut self, assets: U256) -> U256 {
        let caller = self.env().caller();
        let shares = self.to_shares(assets, Rounding::Up);
        let held = self.shares_of(caller);
        if held < shares {
            self.env().revert(MarketError::InsufficientShares);
        }

        self.shares.set(&caller, held - shares);
        let total = self.total_shares();
        self.total_shares.set(total - shares);

        let payout = assets.saturating_sub(self.withdraw_haircut.get_or_default());
        let mut token = Cep18TokenContractRef::new(self.env(), self.asset());
        if !token.transfer(caller, payout) {
            self.env().revert(MarketError::TransferFailed);
        }

        payout
    }

    pub fn deposit_limit(&self) -> U256 {
        self.deposit_limit.get().unwrap_or(U256::MAX)
    }

    /// Underlying value of `holder`'s shares, rounded down
    pub fn total_assets_held(&self, holder: Address) -> U256 {
        VaultMath::to_assets(
            self.shares_of(holder),
            self.total_market_assets(),
            self.total_shares(),
            0,
            Rounding::Down,
        )
        .unwrap_or_else(|err| self.env().revert(err))
    }

    // ========================================
    // Admin Functions
    // ========================================

    /// Move `amount` of the market's assets to the admin, lowering every holder's claim
    pub fn simulate_loss(&mut self, amount: U256) {
        let admin = self.only_admin();
        let mut token = Cep18TokenContractRef::new(self.env(), self.asset());
        if !token.transfer(admin, amount) {
            self.env().revert(MarketError::TransferFailed);
        }
    }

    /// Make every withdrawal pay `amount` less than requested
    pub fn set_withdraw_haircut(&mut self, amount: U256) {
        self.only_admin();
        self.withdraw_haircut.set(amount);
    }

    /// Cap how much a single deposit call accepts
    pub fn set_deposit_limit(&mut self, limit: U256) {
        self.only_admin();
        self.deposit_limit.set(limit);
    }

    fn to_shares(&self, assets: U256, rounding: Rounding) -> U256 {
        VaultMath::to_shares(
            assets,
            self.total_market_assets(),
            self.total_shares(),
            0,
            rounding,
        )
        .unwrap_or_else(|err| self.env().revert(err))
    }

    fn only_admin(&self) -> Address {
        let caller = self.env().caller();
        let admin = self.admin.get_or_revert_with(MarketError::Unauthorized);
        if caller != admin {
            self.env().revert(MarketError::Unauthorized);
        }
        admin
    }
}
