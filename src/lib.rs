#![cfg_attr(not(test), no_std)]
#![cfg_attr(not(test), no_main)]
extern crate alloc;

// Shared building blocks
pub mod errors;
pub mod events;
pub mod math;
pub mod token;
pub mod tokens;

// CEP-4626: Tokenized Vault Standard
pub mod cep4626;

// Yield sources
pub mod yield_source;

// Prize vault
pub mod vault;
