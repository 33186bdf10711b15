//! Yield sources the prize vault can be bound to
//!
//! A yield source holds the vault's idle capital and reports how much
//! underlying value the vault can claim. Real markets are not trusted to be
//! monotonic: they round, rebase in either direction, and can briefly report
//! more than they can pay out.

use odra::prelude::*;
use odra::casper_types::U256;

pub mod share_market;
pub mod rebasing_market;

#[cfg(test)]
pub mod reentrant;

pub use share_market::ShareMarket;
pub use rebasing_market::RebasingMarket;

/// Yield source interface consumed by the vault
#[odra::external_contract]
pub trait YieldSource {
    /// Underlying asset accepted by the source
    fn asset(&self) -> Address;

    /// Pulls `assets` from the caller via `transfer_from`.
    /// Returns the amount credited to the caller.
    fn deposit(&mut self, assets: U256) -> U256;

    /// Sends up to `assets` back to the caller.
    /// Returns the amount sent, which may be short of the request.
    fn withdraw(&mut self, assets: U256) -> U256;

    /// Underlying value currently claimable by `holder`
    fn total_assets_held(&self, holder: Address) -> U256;
}
