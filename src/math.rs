//! Share/asset conversion for the prize vault
//! Implements overflow-safe mul-div and the decimal-offset virtual share formulas
use odra::casper_types::{U256, U512};
use crate::errors::VaultError;

/// Largest decimals offset accepted by a vault
pub const MAX_DECIMALS_OFFSET: u8 = 18;

/// Rounding direction of a conversion
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rounding {
    /// Toward zero
    Down,
    /// Away from zero when there is a remainder
    Up,
}

/// Conversion engine between asset and share amounts
pub struct VaultMath;

impl VaultMath {
    /// Computes `x * y / denominator` with a 512-bit intermediate product
    pub fn mul_div(
        x: U256,
        y: U256,
        denominator: U256,
        rounding: Rounding,
    ) -> Result<U256, VaultError> {
        if denominator.is_zero() {
            return Err(VaultError::DivisionByZero);
        }

        let product = widen(x) * widen(y);
        let (quotient, remainder) = product.div_mod(widen(denominator));
        let quotient = match rounding {
            Rounding::Up if !remainder.is_zero() => quotient + U512::one(),
            _ => quotient,
        };

        narrow(quotient)
    }

    /// Converts assets to shares:
    /// `assets * (total_shares + 10^offset) / (total_assets + 1)`
    pub fn to_shares(
        assets: U256,
        total_assets: U256,
        total_shares: U256,
        decimals_offset: u8,
        rounding: Rounding,
    ) -> Result<U256, VaultError> {
        let virtual_shares = total_shares
            .checked_add(Self::virtual_shares(decimals_offset))
            .ok_or(VaultError::Overflow)?;
        let virtual_assets = total_assets
            .checked_add(U256::one())
            .ok_or(VaultError::Overflow)?;

        Self::mul_div(assets, virtual_shares, virtual_assets, rounding)
    }

    /// Converts shares to assets:
    /// `shares * (total_assets + 1) / (total_shares + 10^offset)`
    pub fn to_assets(
        shares: U256,
        total_assets: U256,
        total_shares: U256,
        decimals_offset: u8,
        rounding: Rounding,
    ) -> Result<U256, VaultError> {
        let virtual_shares = total_shares
            .checked_add(Self::virtual_shares(decimals_offset))
            .ok_or(VaultError::Overflow)?;
        let virtual_assets = total_assets
            .checked_add(U256::one())
            .ok_or(VaultError::Overflow)?;

        Self::mul_div(shares, virtual_assets, virtual_shares, rounding)
    }

    /// Applies a basis point fraction, rounding down
    pub fn bps_of(amount: U256, bps: u32) -> Result<U256, VaultError> {
        Self::mul_div(amount, U256::from(bps), U256::from(BPS_DENOMINATOR), Rounding::Down)
    }

    fn virtual_shares(decimals_offset: u8) -> U256 {
        U256::exp10(decimals_offset as usize)
    }
}

/// Basis point denominator
pub const BPS_DENOMINATOR: u32 = 10_000;

fn widen(value: U256) -> U512 {
    let mut bytes = [0u8; 32];
    value.to_little_endian(&mut bytes);
    U512::from_little_endian(&bytes)
}

fn narrow(value: U512) -> Result<U256, VaultError> {
    let mut bytes = [0u8; 64];
    value.to_little_endian(&mut bytes);
    if bytes[32..].iter().any(|byte| *byte != 0) {
        return Err(VaultError::Overflow);
    }
    Ok(U256::from_little_endian(&bytes[..32]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div_rounding() {
        let seven = U256::from(7);
        let two = U256::from(2);
        let one = U256::one();

        assert_eq!(VaultMath::mul_div(seven, one, two, Rounding::Down).unwrap(), U256::from(3));
        assert_eq!(VaultMath::mul_div(seven, one, two, Rounding::Up).unwrap(), U256::from(4));
        // exact division never rounds up
        assert_eq!(VaultMath::mul_div(seven, two, two, Rounding::Up).unwrap(), seven);
    }

    #[test]
    fn test_mul_div_wide_intermediate() {
        // MAX * MAX / MAX fits even though the product does not
        let max = U256::MAX;
        assert_eq!(VaultMath::mul_div(max, max, max, Rounding::Down).unwrap(), max);
        assert_eq!(VaultMath::mul_div(max, U256::from(2), U256::from(4), Rounding::Up).unwrap(), max / 2 + 1);
    }

    #[test]
    fn test_mul_div_errors() {
        assert!(matches!(
            VaultMath::mul_div(U256::one(), U256::one(), U256::zero(), Rounding::Down),
            Err(VaultError::DivisionByZero)
        ));
        assert!(matches!(
            VaultMath::mul_div(U256::MAX, U256::from(2), U256::one(), Rounding::Down),
            Err(VaultError::Overflow)
        ));
    }

    #[test]
    fn test_empty_vault_conversion() {
        let assets = U256::from(1_000_000u64);
        let shares = VaultMath::to_shares(assets, U256::zero(), U256::zero(), 6, Rounding::Down).unwrap();
        assert_eq!(shares, U256::from(1_000_000_000_000u64));

        let back = VaultMath::to_assets(shares, assets, shares, 6, Rounding::Down).unwrap();
        assert_eq!(back, assets);
    }

    #[test]
    fn test_rounding_favors_vault() {
        // 3 assets backing 10 shares with no offset
        let total_assets = U256::from(3);
        let total_shares = U256::from(10);

        let down = VaultMath::to_shares(U256::one(), total_assets, total_shares, 0, Rounding::Down).unwrap();
        let up = VaultMath::to_shares(U256::one(), total_assets, total_shares, 0, Rounding::Up).unwrap();
        assert_eq!(down, U256::from(2));
        assert_eq!(up, U256::from(3));

        let paid = VaultMath::to_assets(U256::from(5), total_assets, total_shares, 0, Rounding::Down).unwrap();
        let charged = VaultMath::to_assets(U256::from(5), total_assets, total_shares, 0, Rounding::Up).unwrap();
        assert_eq!(paid, U256::from(1));
        assert_eq!(charged, U256::from(2));
    }

    #[test]
    fn test_inflation_attack_is_unprofitable() {
        // attacker holds 1 share (offset 0 => 1 wei deposit) and donates 1e18
        let donated = U256::exp10(18);
        let total_assets = donated + U256::one();
        let total_shares = U256::one();

        // a victim depositing 1e18 still receives a share
        let victim_shares =
            VaultMath::to_shares(donated, total_assets, total_shares, 0, Rounding::Down).unwrap();
        assert_eq!(victim_shares, U256::one());

        // with a 6 decimal offset the victim keeps nearly all value
        let victim_shares =
            VaultMath::to_shares(donated, total_assets, total_shares, 6, Rounding::Down).unwrap();
        let victim_assets = VaultMath::to_assets(
            victim_shares,
            total_assets + donated,
            total_shares + victim_shares,
            6,
            Rounding::Down,
        )
        .unwrap();
        assert!(victim_assets * U256::from(1000) >= donated * U256::from(999));
    }

    #[test]
    fn test_bps_of() {
        assert_eq!(VaultMath::bps_of(U256::from(10_000), 250).unwrap(), U256::from(250));
        assert_eq!(VaultMath::bps_of(U256::from(99), 100).unwrap(), U256::zero());
    }
}
