//! Binary for building contract schemas from odra modules.
#![doc = "Binary for building contract schemas from odra modules."]

#[allow(unused_imports)]
use prize_vault_contracts;

fn main() {
    // Schema generation is driven by odra-build; this binary only links the crate
}
