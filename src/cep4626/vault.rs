//! Caller-side view of a CEP-4626 vault
//!
//! Shares are CEP-18 tokens; every amount is in base units.

use odra::prelude::*;
use odra::casper_types::U256;

/// Public surface shared by CEP-4626 vaults
#[odra::external_contract]
pub trait Cep4626Vault {
    /// Underlying CEP-18 asset
    fn asset(&self) -> Address;
    /// Assets under management, idle and invested
    fn total_assets(&self) -> U256;

    /// Asset limit for `deposit`; U256::MAX when uncapped
    fn max_deposit(&self, receiver: Address) -> U256;
    fn max_mint(&self, receiver: Address) -> U256;
    fn max_withdraw(&self, owner: Address) -> U256;
    fn max_redeem(&self, owner: Address) -> U256;

    /// Caller-independent conversions, both rounded down
    fn convert_to_shares(&self, assets: U256) -> U256;
    fn convert_to_assets(&self, shares: U256) -> U256;

    // previews round against the caller
    fn preview_deposit(&self, assets: U256) -> U256;
    fn preview_mint(&self, shares: U256) -> U256;
    fn preview_withdraw(&self, assets: U256) -> U256;
    fn preview_redeem(&self, shares: U256) -> U256;

    /// Pulls `assets` from the caller; returns shares minted to `receiver`
    fn deposit(&mut self, assets: U256, receiver: Address) -> U256;
    /// Mints `shares` to `receiver`; returns assets pulled from the caller
    fn mint(&mut self, shares: U256, receiver: Address) -> U256;
    /// Pays `assets` to `receiver`; returns shares burned from `owner`
    fn withdraw(&mut self, assets: U256, receiver: Address, owner: Address) -> U256;
    /// Burns `shares` from `owner`; returns assets paid to `receiver`
    fn redeem(&mut self, shares: U256, receiver: Address, owner: Address) -> U256;
}
