//! Error definitions for the prize vault contracts
use odra::prelude::*;

/// Custom errors for the prize vault
#[odra::odra_error]
#[derive(Debug)]
pub enum VaultError {
    /// Zero assets or shares requested
    ZeroAmount = 1,

    /// Deposit would mint zero shares
    ZeroSharesMinted = 2,

    /// Redemption would pay out zero assets
    ZeroAssets = 3,

    /// Deposit exceeds the configured cap
    MaxDepositExceeded = 4,

    /// Owner does not hold enough shares
    InsufficientShares = 5,

    /// Caller is not approved for enough shares
    InsufficientAllowance = 6,

    /// Yield source or asset accepted less than requested
    DepositFailed = 7,

    /// Yield source returned less than the tolerated amount
    WithdrawFailed = 8,

    /// Asset transfer returned false
    TransferFailed = 9,

    /// Guarded entry point re-entered
    ReentrantCall = 10,

    /// Unauthorized access
    Unauthorized = 11,

    /// Invalid configuration
    InvalidConfiguration = 12,

    /// Yield fee above the allowed maximum
    InvalidYieldFee = 13,

    /// Overflow error
    Overflow = 14,

    /// Division by zero
    DivisionByZero = 15,
}

/// Custom errors for CEP-18 ledgers
#[odra::odra_error]
pub enum TokenError {
    /// Insufficient allowance for transfer
    InsufficientAllowance = 100,

    /// Insufficient balance for operation
    InsufficientBalance = 101,
}

/// Custom errors for the bundled yield source markets
#[odra::odra_error]
pub enum MarketError {
    /// Holder does not own enough market shares
    InsufficientShares = 300,

    /// Deposit is too small to mint a market share
    ZeroShares = 301,

    /// Caller is not the market admin
    Unauthorized = 302,

    /// Asset transfer returned false
    TransferFailed = 303,
}
