//! CEP-4626: Tokenized Vault Standard for Casper
//!
//! Casper adaptation of ERC-4626: a standard API for tokenized vaults
//! representing shares of a single underlying CEP-18 token. The prize vault
//! implements it; integrators and the test fixtures call vaults through
//! [`Cep4626VaultContractRef`].

pub mod vault;

pub use vault::Cep4626VaultContractRef;
