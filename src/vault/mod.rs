//! Prize vault: share accounting over a single yield source, plus yield skimming

pub mod prize_vault;


pub use prize_vault::{PrizeVault, PrizeVaultContractRef, SkimMode, MAX_YIELD_FEE_BPS, WITHDRAW_TOLERANCE};
