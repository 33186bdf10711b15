//! CEP-18 share ledger with time-weighted balances for prize eligibility
use odra::prelude::*;
use odra::casper_types::U256;
use crate::events::{Transfer, Approval};
use crate::errors::TokenError;

/// Time-weighted balance record
///
/// `cumulative` is the sum of `balance * elapsed_ms` up to `updated_at`.
#[odra::odra_type]
#[derive(Default)]
pub struct TwabAccount {
    pub balance: U256,
    pub cumulative: U256,
    pub updated_at: u64,
}

impl TwabAccount {
    /// Accumulator value at `now` without mutating the record
    pub fn accumulator_at(&self, now: u64) -> U256 {
        let elapsed = now.saturating_sub(self.updated_at);
        self.cumulative
            .saturating_add(self.balance.saturating_mul(U256::from(elapsed)))
    }

    fn settle(&mut self, now: u64, new_balance: U256) {
        self.cumulative = self.accumulator_at(now);
        self.updated_at = now;
        self.balance = new_balance;
    }
}

/// Share ledger module implementing the CEP-18 standard
///
/// Owned by the vault as a submodule; every mint, burn and transfer
/// settles the time-weighted accumulators in the same call.
#[odra::module]
pub struct ShareLedger {
    name: Var<String>,
    symbol: Var<String>,
    decimals: Var<u8>,
    total_supply: Var<U256>,
    balances: Mapping<Address, U256>,
    /// (owner, spender) -> remaining allowance
    allowances: Mapping<(Address, Address), U256>,
    twabs: Mapping<Address, TwabAccount>,
    supply_twab: Var<TwabAccount>,
}

#[odra::module]
impl ShareLedger {
    /// Initialize the ledger metadata
    pub fn init(&mut self, name: String, symbol: String, decimals: u8) {
        self.name.set(name);
        self.symbol.set(symbol);
        self.decimals.set(decimals);
        self.total_supply.set(U256::zero());
    }

    pub fn name(&self) -> String {
        self.name.get_or_default()
    }

    pub fn symbol(&self) -> String {
        self.symbol.get_or_default()
    }

    pub fn decimals(&self) -> u8 {
        self.decimals.get_or_default()
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply.get_or_default()
    }

    pub fn balance_of(&self, owner: Address) -> U256 {
        self.balances.get(&owner).unwrap_or_default()
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get(&(owner, spender)).unwrap_or_default()
    }

    /// Balance-time accumulator of `owner` at the current block time
    pub fn balance_accumulator(&self, owner: Address) -> U256 {
        let now = self.env().get_block_time();
        self.twabs.get(&owner).unwrap_or_default().accumulator_at(now)
    }

    /// Supply-time accumulator at the current block time
    pub fn supply_accumulator(&self) -> U256 {
        let now = self.env().get_block_time();
        self.supply_twab.get_or_default().accumulator_at(now)
    }

    pub fn transfer(&mut self, to: Address, amount: U256) -> bool {
        let caller = self.env().caller();
        self.transfer_internal(caller, to, amount);
        true
    }

    pub fn approve(&mut self, spender: Address, amount: U256) -> bool {
        let caller = self.env().caller();
        self.approve_internal(caller, spender, amount);
        true
    }

    /// Moves `from`'s shares, spending the caller's allowance
    pub fn transfer_from(&mut self, from: Address, to: Address, amount: U256) -> bool {
        let caller = self.env().caller();
        self.spend_allowance(from, caller, amount);
        self.transfer_internal(from, to, amount);
        true
    }

    /// Reduce `spender`'s allowance over `owner`'s shares
    pub fn spend_allowance(&mut self, owner: Address, spender: Address, amount: U256) {
        let current_allowance = self.allowance(owner, spender);
        if current_allowance == U256::MAX {
            return;
        }
        if current_allowance < amount {
            self.env().revert(TokenError::InsufficientAllowance);
        }
        self.approve_internal(owner, spender, current_allowance - amount);
    }

    /// Mint new shares (called by the owning vault)
    pub fn mint(&mut self, to: Address, amount: U256) {
        let supply = self.total_supply() + amount;
        self.set_total_supply(supply);
        let balance = self.balance_of(to) + amount;
        self.set_balance(to, balance);

        self.env().emit_event(Transfer {
            from: self.env().self_address(),
            to,
            value: amount,
        });
    }

    /// Burn shares (called by the owning vault)
    pub fn burn(&mut self, from: Address, amount: U256) {
        let balance = self.balance_of(from);
        if balance < amount {
            self.env().revert(TokenError::InsufficientBalance);
        }
        self.set_balance(from, balance - amount);
        let supply = self.total_supply() - amount;
        self.set_total_supply(supply);

        self.env().emit_event(Transfer {
            from,
            to: self.env().self_address(),
            value: amount,
        });
    }

    fn transfer_internal(&mut self, from: Address, to: Address, amount: U256) {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            self.env().revert(TokenError::InsufficientBalance);
        }
        self.set_balance(from, from_balance - amount);
        let to_balance = self.balance_of(to);
        self.set_balance(to, to_balance + amount);

        self.env().emit_event(Transfer {
            from,
            to,
            value: amount,
        });
    }

    fn approve_internal(&mut self, owner: Address, spender: Address, amount: U256) {
        self.allowances.set(&(owner, spender), amount);

        self.env().emit_event(Approval {
            owner,
            spender,
            value: amount,
        });
    }

    fn set_balance(&mut self, owner: Address, balance: U256) {
        let now = self.env().get_block_time();
        let mut twab = self.twabs.get(&owner).unwrap_or_default();
        twab.settle(now, balance);
        self.twabs.set(&owner, twab);
        self.balances.set(&owner, balance);
    }

    fn set_total_supply(&mut self, supply: U256) {
        let now = self.env().get_block_time();
        let mut twab = self.supply_twab.get_or_default();
        twab.settle(now, supply);
        self.supply_twab.set(twab);
        self.total_supply.set(supply);
    }
}

/// The slice of CEP-18 the vault and markets call on an asset
#[odra::external_contract]
pub trait Cep18Token {
    fn balance_of(&self, owner: Address) -> U256;
    fn transfer(&mut self, to: Address, amount: U256) -> bool;
    fn transfer_from(&mut self, from: Address, to: Address, amount: U256) -> bool;
    fn approve(&mut self, spender: Address, amount: U256) -> bool;
    fn decimals(&self) -> u8;
}

#[cfg(test)]
mod tests {
    use super::*;
    use odra::host::{Deployer, HostEnv};

    fn setup() -> (HostEnv, ShareLedgerHostRef) {
        let env = odra_test::env();
        let init_args = ShareLedgerInitArgs {
            name: String::from("Prize USDC"),
            symbol: String::from("pUSDC"),
            decimals: 12,
        };
        let ledger = ShareLedger::deploy(&env, init_args);
        (env, ledger)
    }

    #[test]
    fn test_init() {
        let (_, ledger) = setup();
        assert_eq!(ledger.name(), "Prize USDC");
        assert_eq!(ledger.symbol(), "pUSDC");
        assert_eq!(ledger.decimals(), 12);
        assert_eq!(ledger.total_supply(), U256::zero());
    }

    #[test]
    fn test_mint_and_burn() {
        let (env, mut ledger) = setup();
        let user = env.get_account(1);
        let amount = U256::from(1000);

        ledger.mint(user, amount);
        assert_eq!(ledger.balance_of(user), amount);
        assert_eq!(ledger.total_supply(), amount);

        ledger.burn(user, amount);
        assert_eq!(ledger.balance_of(user), U256::zero());
        assert_eq!(ledger.total_supply(), U256::zero());
    }

    #[test]
    fn test_burn_more_than_balance() {
        let (env, mut ledger) = setup();
        let user = env.get_account(1);

        ledger.mint(user, U256::from(10));
        assert_eq!(
            ledger.try_burn(user, U256::from(11)),
            Err(TokenError::InsufficientBalance.into())
        );
    }

    #[test]
    fn test_transfer_from_spends_allowance() {
        let (env, mut ledger) = setup();
        let owner = env.get_account(0);
        let spender = env.get_account(1);
        let receiver = env.get_account(2);

        ledger.mint(owner, U256::from(1000));
        env.set_caller(owner);
        ledger.approve(spender, U256::from(600));

        env.set_caller(spender);
        ledger.transfer_from(owner, receiver, U256::from(400));
        assert_eq!(ledger.allowance(owner, spender), U256::from(200));
        assert_eq!(ledger.balance_of(receiver), U256::from(400));

        assert_eq!(
            ledger.try_transfer_from(owner, receiver, U256::from(201)),
            Err(TokenError::InsufficientAllowance.into())
        );
    }

    #[test]
    fn test_accumulators_track_balance_time() {
        let (env, mut ledger) = setup();
        let alice = env.get_account(1);
        let bob = env.get_account(2);

        ledger.mint(alice, U256::from(100));
        let start_alice = ledger.balance_accumulator(alice);
        let start_supply = ledger.supply_accumulator();

        env.advance_block_time(1_000);
        env.set_caller(alice);
        ledger.transfer(bob, U256::from(40));
        env.advance_block_time(500);

        // alice: 100 for 1000ms, then 60 for 500ms
        assert_eq!(
            ledger.balance_accumulator(alice) - start_alice,
            U256::from(100 * 1_000 + 60 * 500)
        );
        assert_eq!(ledger.balance_accumulator(bob), U256::from(40 * 500));
        // transfers leave the supply untouched
        assert_eq!(
            ledger.supply_accumulator() - start_supply,
            U256::from(100 * 1_500)
        );
    }
}
