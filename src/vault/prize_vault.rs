//! Prize Vault - CEP-4626 vault that skims yield for prize liquidation
//!
//! Depositors receive shares against a recorded debt. Assets are parked in a
//! single yield source; whatever the source holds above the debt (less a
//! small buffer) is yield that anyone can skim to the yield recipient.
//!
//! Share price is computed against `min(held, debt)`:
//! - unskimmed yield and donations never raise it,
//! - a shortfall in the yield source lowers it for everyone (latent loss)
//!   without any explicit realization step.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;
use crate::errors::VaultError;
use crate::events::{
    Deposit, DepositCapSet, SkimModeSet, Withdraw, YieldFeeSet, YieldRecipientSet, YieldSkimmed,
};
use crate::math::{Rounding, VaultMath, MAX_DECIMALS_OFFSET};
use crate::token::{Cep18TokenContractRef, ShareLedger};
use crate::yield_source::YieldSourceContractRef;

/// Largest shortfall a withdrawal absorbs from yield source rounding
pub const WITHDRAW_TOLERANCE: u64 = 2;

/// Largest yield fee, in basis points
pub const MAX_YIELD_FEE_BPS: u32 = 9_000;

/// How skimmed yield reaches the yield recipient
#[odra::odra_type]
pub enum SkimMode {
    /// Mint vault shares backed by the yield
    MintShares,
    /// Withdraw the yield from the source and transfer the assets
    TransferAssets,
}

/// Figures a single call prices against
struct Snapshot {
    held: U256,
    debt: U256,
    supply: U256,
}

impl Snapshot {
    fn backed(&self) -> U256 {
        self.held.min(self.debt)
    }

    fn is_lossy(&self) -> bool {
        self.held < self.debt
    }
}

/// Prize Vault contract
#[odra::module]
pub struct PrizeVault {
    /// Share ledger (CEP-18 + time-weighted balances)
    shares: SubModule<ShareLedger>,
    /// Underlying asset address
    asset: Var<Address>,
    /// Yield source holding the vault's assets
    yield_source: Var<Address>,
    /// Receiver of skimmed yield
    yield_recipient: Var<Address>,
    /// Skim delivery mode
    skim_mode: Var<SkimMode>,
    /// Virtual share decimals
    decimals_offset: Var<u8>,
    /// Surplus kept back from skims
    yield_buffer: Var<U256>,
    /// Cap on total debt (U256::MAX = none)
    deposit_cap: Var<U256>,
    /// Share of skimmed yield taken as fee
    yield_fee_bps: Var<u32>,
    /// Receiver of yield fee shares
    yield_fee_recipient: Var<Address>,
    /// Assets owed to shareholders
    total_debt: Var<U256>,
    /// Owner address
    owner: Var<Address>,
    /// Reentrancy lock
    locked: Var<bool>,
}

#[odra::module]
impl PrizeVault {
    /// Initialize the vault and bind it to `yield_source`
    pub fn init(
        &mut self,
        asset: Address,
        yield_source: Address,
        yield_recipient: Address,
        name: String,
        symbol: String,
        decimals_offset: u8,
        yield_buffer: U256,
        skim_mode: SkimMode,
    ) {
        if decimals_offset > MAX_DECIMALS_OFFSET {
            self.env().revert(VaultError::InvalidConfiguration);
        }
        let source = YieldSourceContractRef::new(self.env(), yield_source);
        if source.asset() != asset {
            self.env().revert(VaultError::InvalidConfiguration);
        }
        let asset_decimals = Cep18TokenContractRef::new(self.env(), asset).decimals();
        let decimals = asset_decimals
            .checked_add(decimals_offset)
            .unwrap_or_else(|| self.env().revert(VaultError::InvalidConfiguration));

        let caller = self.env().caller();
        self.shares.init(name, symbol, decimals);

        self.asset.set(asset);
        self.yield_source.set(yield_source);
        self.yield_recipient.set(yield_recipient);
        self.skim_mode.set(skim_mode);
        self.decimals_offset.set(decimals_offset);
        self.yield_buffer.set(yield_buffer);
        self.deposit_cap.set(U256::MAX);
        self.yield_fee_bps.set(0);
        self.yield_fee_recipient.set(caller);
        self.total_debt.set(U256::zero());
        self.owner.set(caller);
        self.locked.set(false);
    }

    // ========================================
    // CEP-18 Share Token
    // ========================================

    pub fn name(&self) -> String {
        self.shares.name()
    }

    pub fn symbol(&self) -> String {
        self.shares.symbol()
    }

    pub fn decimals(&self) -> u8 {
        self.shares.decimals()
    }

    pub fn total_supply(&self) -> U256 {
        self.shares.total_supply()
    }

    pub fn balance_of(&self, owner: Address) -> U256 {
        self.shares.balance_of(owner)
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.shares.allowance(owner, spender)
    }

    pub fn transfer(&mut self, to: Address, amount: U256) -> bool {
        self.shares.transfer(to, amount)
    }

    pub fn approve(&mut self, spender: Address, amount: U256) -> bool {
        self.shares.approve(spender, amount)
    }

    pub fn transfer_from(&mut self, from: Address, to: Address, amount: U256) -> bool {
        self.shares.transfer_from(from, to, amount)
    }

    /// Balance-time accumulator of `owner`, for prize eligibility
    pub fn balance_accumulator(&self, owner: Address) -> U256 {
        self.shares.balance_accumulator(owner)
    }

    /// Supply-time accumulator, for prize eligibility
    pub fn supply_accumulator(&self) -> U256 {
        self.shares.supply_accumulator()
    }

    // ========================================
    // CEP-4626 Views
    // ========================================

    pub fn asset(&self) -> Address {
        self.asset.get_or_revert_with(VaultError::InvalidConfiguration)
    }

    /// Assets the vault can claim: idle balance plus yield source position
    pub fn total_assets(&self) -> U256 {
        self.held_assets()
    }

    pub fn total_debt(&self) -> U256 {
        self.total_debt.get_or_default()
    }

    /// Zero while the vault holds less than its debt
    pub fn max_deposit(&self, _receiver: Address) -> U256 {
        let snapshot = self.snapshot();
        if snapshot.is_lossy() {
            return U256::zero();
        }
        let cap = self.deposit_cap();
        if cap == U256::MAX {
            return U256::MAX;
        }
        cap.saturating_sub(snapshot.debt)
    }

    pub fn max_mint(&self, receiver: Address) -> U256 {
        let max_assets = self.max_deposit(receiver);
        if max_assets == U256::MAX {
            return U256::MAX;
        }
        self.shares_for(max_assets, &self.snapshot(), Rounding::Down)
    }

    pub fn max_withdraw(&self, owner: Address) -> U256 {
        self.preview_redeem(self.balance_of(owner))
    }

    pub fn max_redeem(&self, owner: Address) -> U256 {
        self.balance_of(owner)
    }

    pub fn convert_to_shares(&self, assets: U256) -> U256 {
        self.shares_for(assets, &self.snapshot(), Rounding::Down)
    }

    pub fn convert_to_assets(&self, shares: U256) -> U256 {
        self.assets_for(shares, &self.snapshot(), Rounding::Down)
    }

    pub fn preview_deposit(&self, assets: U256) -> U256 {
        self.shares_for(assets, &self.snapshot(), Rounding::Down)
    }

    pub fn preview_mint(&self, shares: U256) -> U256 {
        self.assets_for(shares, &self.snapshot(), Rounding::Up)
    }

    pub fn preview_withdraw(&self, assets: U256) -> U256 {
        self.shares_for(assets, &self.snapshot(), Rounding::Up)
    }

    pub fn preview_redeem(&self, shares: U256) -> U256 {
        self.assets_for(shares, &self.snapshot(), Rounding::Down)
    }

    // ========================================
    // CEP-4626 Deposit/Mint
    // ========================================

    /// Deposit `assets` and mint shares to `receiver`
    pub fn deposit(&mut self, assets: U256, receiver: Address) -> U256 {
        self.non_reentrant(|vault| {
            if assets.is_zero() {
                vault.env().revert(VaultError::ZeroAmount);
            }
            if assets > vault.max_deposit(receiver) {
                vault.env().revert(VaultError::MaxDepositExceeded);
            }

            let snapshot = vault.snapshot();
            let shares = vault.shares_for(assets, &snapshot, Rounding::Down);
            if shares.is_zero() {
                vault.env().revert(VaultError::ZeroSharesMinted);
            }

            vault.enter(receiver, assets, shares);
            shares
        })
    }

    /// Mint exactly `shares` to `receiver`, charging the rounded-up asset amount
    pub fn mint(&mut self, shares: U256, receiver: Address) -> U256 {
        self.non_reentrant(|vault| {
            if shares.is_zero() {
                vault.env().revert(VaultError::ZeroAmount);
            }

            let snapshot = vault.snapshot();
            let assets = vault.assets_for(shares, &snapshot, Rounding::Up);
            if assets > vault.max_deposit(receiver) {
                vault.env().revert(VaultError::MaxDepositExceeded);
            }

            vault.enter(receiver, assets, shares);
            assets
        })
    }

    // ========================================
    // CEP-4626 Withdraw/Redeem
    // ========================================

    /// Withdraw `assets` to `receiver`, burning the rounded-up share amount from `owner`
    pub fn withdraw(&mut self, assets: U256, receiver: Address, owner: Address) -> U256 {
        self.non_reentrant(|vault| {
            if assets.is_zero() {
                vault.env().revert(VaultError::ZeroAmount);
            }

            let snapshot = vault.snapshot();
            let shares = vault.shares_for(assets, &snapshot, Rounding::Up);
            vault.exit(&snapshot, receiver, owner, assets, shares);
            shares
        })
    }

    /// Redeem `shares` from `owner`, paying the rounded-down asset amount to `receiver`
    pub fn redeem(&mut self, shares: U256, receiver: Address, owner: Address) -> U256 {
        self.non_reentrant(|vault| {
            if shares.is_zero() {
                vault.env().revert(VaultError::ZeroAmount);
            }

            let snapshot = vault.snapshot();
            let assets = vault.assets_for(shares, &snapshot, Rounding::Down);
            if assets.is_zero() {
                vault.env().revert(VaultError::ZeroAssets);
            }

            vault.exit(&snapshot, receiver, owner, assets, shares)
        })
    }

    // ========================================
    // Yield
    // ========================================

    /// Realize surplus yield for the yield recipient
    ///
    /// Callable by anyone. Returns the assets realized, fee included;
    /// zero when there is nothing to skim.
    pub fn skim_yield(&mut self) -> U256 {
        self.non_reentrant(|vault| {
            let snapshot = vault.snapshot();
            let available = vault.available_yield(&snapshot);
            if available.is_zero() {
                return U256::zero();
            }

            let (net, fee) = vault.split_yield(available);
            let fee_shares = vault.shares_for(fee, &snapshot, Rounding::Down);
            let mode = vault.skim_mode();
            let shares = match mode {
                SkimMode::MintShares => vault.shares_for(net, &snapshot, Rounding::Down),
                SkimMode::TransferAssets => U256::zero(),
            };
            let transfers_assets = matches!(mode, SkimMode::TransferAssets) && !net.is_zero();
            if shares.is_zero() && fee_shares.is_zero() && !transfers_assets {
                return U256::zero();
            }

            let recipient = vault.yield_recipient();
            let mut realized_debt = U256::zero();
            let fee_assets = if fee_shares.is_zero() { U256::zero() } else { fee };
            if !fee_shares.is_zero() {
                let fee_recipient = vault.yield_fee_recipient();
                vault.shares.mint(fee_recipient, fee_shares);
                realized_debt = fee;
            }
            if !shares.is_zero() {
                vault.shares.mint(recipient, shares);
                realized_debt = vault.checked(realized_debt.checked_add(net).ok_or(VaultError::Overflow));
            }
            let debt = vault.checked(snapshot.debt.checked_add(realized_debt).ok_or(VaultError::Overflow));
            vault.total_debt.set(debt);

            let recipient_assets = if transfers_assets {
                let available = vault.pull_assets(net);
                let paid = net.min(available);
                vault.send_assets(recipient, paid);
                paid
            } else if shares.is_zero() {
                U256::zero()
            } else {
                net
            };

            vault.env().emit_event(YieldSkimmed {
                caller: vault.env().caller(),
                recipient,
                assets: recipient_assets,
                shares,
                fee_assets,
                fee_shares,
            });

            recipient_assets + fee_assets
        })
    }

    /// Surplus of held assets over debt and buffer
    pub fn available_yield_balance(&self) -> U256 {
        self.available_yield(&self.snapshot())
    }

    /// Yield the recipient would receive in `token` on the next skim
    ///
    /// Counted in shares when `token` is this vault and yield is minted,
    /// in assets when `token` is the asset and yield is transferred.
    pub fn liquidatable_balance_of(&self, token: Address) -> U256 {
        let snapshot = self.snapshot();
        let (net, _) = self.split_yield(self.available_yield(&snapshot));
        match self.skim_mode() {
            SkimMode::MintShares if token == self.env().self_address() => {
                self.shares_for(net, &snapshot, Rounding::Down)
            }
            SkimMode::TransferAssets if token == self.asset() => net,
            _ => U256::zero(),
        }
    }

    // ========================================
    // Configuration
    // ========================================

    pub fn yield_source(&self) -> Address {
        self.yield_source.get_or_revert_with(VaultError::InvalidConfiguration)
    }

    pub fn yield_recipient(&self) -> Address {
        self.yield_recipient.get_or_revert_with(VaultError::InvalidConfiguration)
    }

    pub fn skim_mode(&self) -> SkimMode {
        self.skim_mode.get_or_revert_with(VaultError::InvalidConfiguration)
    }

    pub fn decimals_offset(&self) -> u8 {
        self.decimals_offset.get_or_default()
    }

    pub fn yield_buffer(&self) -> U256 {
        self.yield_buffer.get_or_default()
    }

    pub fn deposit_cap(&self) -> U256 {
        self.deposit_cap.get_or_default()
    }

    pub fn yield_fee_bps(&self) -> u32 {
        self.yield_fee_bps.get_or_default()
    }

    pub fn yield_fee_recipient(&self) -> Address {
        self.yield_fee_recipient.get_or_revert_with(VaultError::InvalidConfiguration)
    }

    pub fn owner(&self) -> Address {
        self.owner.get_or_revert_with(VaultError::Unauthorized)
    }

    pub fn set_yield_recipient(&mut self, recipient: Address) {
        self.only_owner();
        self.yield_recipient.set(recipient);
        self.env().emit_event(YieldRecipientSet { recipient });
    }

    pub fn set_skim_mode(&mut self, mode: SkimMode) {
        self.only_owner();
        self.skim_mode.set(mode);
        self.env().emit_event(SkimModeSet { mode: self.skim_mode() });
    }

    pub fn set_deposit_cap(&mut self, cap: U256) {
        self.only_owner();
        self.deposit_cap.set(cap);
        self.env().emit_event(DepositCapSet { cap });
    }

    pub fn set_yield_fee(&mut self, fee_bps: u32, recipient: Address) {
        self.only_owner();
        if fee_bps > MAX_YIELD_FEE_BPS {
            self.env().revert(VaultError::InvalidYieldFee);
        }
        self.yield_fee_bps.set(fee_bps);
        self.yield_fee_recipient.set(recipient);
        self.env().emit_event(YieldFeeSet { fee_bps, recipient });
    }
}

impl PrizeVault {
    /// Runs `body` while holding the reentrancy lock
    ///
    /// A revert inside `body` rolls back the whole call, lock included.
    fn non_reentrant<T>(&mut self, body: impl FnOnce(&mut Self) -> T) -> T {
        if self.locked.get_or_default() {
            self.env().revert(VaultError::ReentrantCall);
        }
        self.locked.set(true);
        let result = body(self);
        self.locked.set(false);
        result
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            held: self.held_assets(),
            debt: self.total_debt(),
            supply: self.shares.total_supply(),
        }
    }

    fn held_assets(&self) -> U256 {
        let vault_address = self.env().self_address();
        let idle = self.asset_token().balance_of(vault_address);
        let invested = self.source().total_assets_held(vault_address);
        self.checked(idle.checked_add(invested).ok_or(VaultError::Overflow))
    }

    fn shares_for(&self, assets: U256, snapshot: &Snapshot, rounding: Rounding) -> U256 {
        self.checked(VaultMath::to_shares(
            assets,
            snapshot.backed(),
            snapshot.supply,
            self.decimals_offset(),
            rounding,
        ))
    }

    fn assets_for(&self, shares: U256, snapshot: &Snapshot, rounding: Rounding) -> U256 {
        self.checked(VaultMath::to_assets(
            shares,
            snapshot.backed(),
            snapshot.supply,
            self.decimals_offset(),
            rounding,
        ))
    }

    fn available_yield(&self, snapshot: &Snapshot) -> U256 {
        snapshot
            .held
            .saturating_sub(snapshot.debt)
            .saturating_sub(self.yield_buffer())
    }

    /// Splits yield into (net for the recipient, fee)
    fn split_yield(&self, available: U256) -> (U256, U256) {
        let fee = self.checked(VaultMath::bps_of(available, self.yield_fee_bps()));
        (available - fee, fee)
    }

    /// Books a deposit: debt and shares first, then pulls assets into the source
    fn enter(&mut self, receiver: Address, assets: U256, shares: U256) {
        let caller = self.env().caller();
        let debt = self.checked(self.total_debt().checked_add(assets).ok_or(VaultError::Overflow));
        self.total_debt.set(debt);
        self.shares.mint(receiver, shares);

        let vault_address = self.env().self_address();
        let mut token = self.asset_token();
        let before = token.balance_of(vault_address);
        if !token.transfer_from(caller, vault_address, assets) {
            self.env().revert(VaultError::TransferFailed);
        }
        let received = token.balance_of(vault_address).saturating_sub(before);
        if received < assets {
            self.env().revert(VaultError::DepositFailed);
        }

        let source_address = self.yield_source();
        if !token.approve(source_address, assets) {
            self.env().revert(VaultError::TransferFailed);
        }
        let accepted = YieldSourceContractRef::new(self.env(), source_address).deposit(assets);
        if accepted < assets {
            self.env().revert(VaultError::DepositFailed);
        }

        self.env().emit_event(Deposit {
            sender: caller,
            owner: receiver,
            assets,
            shares,
        });
    }

    /// Books a withdrawal: burns shares and reduces debt, then pays out.
    /// Returns the assets actually paid.
    fn exit(
        &mut self,
        snapshot: &Snapshot,
        receiver: Address,
        owner: Address,
        assets: U256,
        shares: U256,
    ) -> U256 {
        let caller = self.env().caller();
        if caller != owner {
            if self.shares.allowance(owner, caller) < shares {
                self.env().revert(VaultError::InsufficientAllowance);
            }
            self.shares.spend_allowance(owner, caller, shares);
        }
        if self.shares.balance_of(owner) < shares {
            self.env().revert(VaultError::InsufficientShares);
        }
        self.shares.burn(owner, shares);

        // while lossy, retire the shares' face value so a full exit clears the debt
        let debt_share = if snapshot.is_lossy() {
            self.checked(VaultMath::to_assets(
                shares,
                snapshot.debt,
                snapshot.supply,
                self.decimals_offset(),
                Rounding::Down,
            ))
        } else {
            assets
        };
        self.total_debt.set(snapshot.debt.saturating_sub(debt_share));

        let available = self.pull_assets(assets);
        let paid = assets.min(available);
        if assets - paid > U256::from(WITHDRAW_TOLERANCE) {
            self.env().revert(VaultError::WithdrawFailed);
        }
        self.send_assets(receiver, paid);

        self.env().emit_event(Withdraw {
            sender: caller,
            receiver,
            owner,
            assets: paid,
            shares,
        });

        paid
    }

    /// Makes `assets` idle, withdrawing the missing part from the yield source.
    /// Returns the idle balance measured afterwards.
    fn pull_assets(&mut self, assets: U256) -> U256 {
        let vault_address = self.env().self_address();
        let token = self.asset_token();
        let idle = token.balance_of(vault_address);
        if idle >= assets {
            return idle;
        }

        let mut source = self.source();
        source.withdraw(assets - idle);
        token.balance_of(vault_address)
    }

    fn send_assets(&mut self, to: Address, amount: U256) {
        if amount.is_zero() {
            return;
        }
        let mut token = self.asset_token();
        if !token.transfer(to, amount) {
            self.env().revert(VaultError::TransferFailed);
        }
    }

    fn asset_token(&self) -> Cep18TokenContractRef {
        Cep18TokenContractRef::new(self.env(), self.asset())
    }

    fn source(&self) -> YieldSourceContractRef {
        YieldSourceContractRef::new(self.env(), self.yield_source())
    }

    fn checked<T>(&self, result: Result<T, VaultError>) -> T {
        result.unwrap_or_else(|err| self.env().revert(err))
    }

    fn only_owner(&self) {
        let caller = self.env().caller();
        if caller != self.owner() {
            self.env().revert(VaultError::Unauthorized);
        }
    }
}
