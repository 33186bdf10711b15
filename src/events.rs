//! Event definitions for the prize vault contracts
use odra::prelude::*;
use odra::casper_types::U256;
use crate::vault::SkimMode;

/// Event emitted when shares or assets are transferred
#[odra::event]
pub struct Transfer {
    /// From address
    pub from: Address,
    /// To address
    pub to: Address,
    /// Amount transferred
    pub value: U256,
}

/// Event emitted when approval is granted
#[odra::event]
pub struct Approval {
    /// Owner address
    pub owner: Address,
    /// Spender address
    pub spender: Address,
    /// Amount approved
    pub value: U256,
}

/// CEP-4626 event emitted when assets enter the vault
#[odra::event]
pub struct Deposit {
    /// Caller that supplied the assets
    pub sender: Address,
    /// Receiver of the minted shares
    pub owner: Address,
    pub assets: U256,
    pub shares: U256,
}

/// CEP-4626 event emitted when assets leave the vault
#[odra::event]
pub struct Withdraw {
    /// Caller that burned the shares
    pub sender: Address,
    /// Receiver of the assets
    pub receiver: Address,
    /// Owner of the burned shares
    pub owner: Address,
    /// Assets actually paid out
    pub assets: U256,
    pub shares: U256,
}

/// Event emitted when surplus yield is skimmed
#[odra::event]
pub struct YieldSkimmed {
    /// Address that triggered the skim
    pub caller: Address,
    /// Yield recipient
    pub recipient: Address,
    /// Assets realized for the recipient
    pub assets: U256,
    /// Shares minted to the recipient (zero when assets were transferred)
    pub shares: U256,
    /// Assets taken as yield fee
    pub fee_assets: U256,
    /// Shares minted to the yield fee recipient
    pub fee_shares: U256,
}

/// Event emitted when the yield recipient changes
#[odra::event]
pub struct YieldRecipientSet {
    pub recipient: Address,
}

/// Event emitted when the yield fee changes
#[odra::event]
pub struct YieldFeeSet {
    /// Fee in basis points of skimmed yield
    pub fee_bps: u32,
    pub recipient: Address,
}

/// Event emitted when the deposit cap changes
#[odra::event]
pub struct DepositCapSet {
    pub cap: U256,
}

/// Event emitted when the skim mode changes
#[odra::event]
pub struct SkimModeSet {
    pub mode: SkimMode,
}
