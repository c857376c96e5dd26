//! Fixed-point value ratio
//!
//! Position value over reference value, scaled by 1e18 (WAD). On-chain amounts are
//! integers, so everything stays in `U256` and no precision is lost below 1.0.

use std::fmt;

use ethers::types::{U256, U512};
use rust_decimal::Decimal;
use thiserror::Error;

/// 1.0 in fixed point
pub const WAD: U256 = U256([1_000_000_000_000_000_000, 0, 0, 0]);

const WAD_DECIMALS: u32 = 18;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RatioError {
    #[error("Reference value is zero")]
    ZeroReference,

    #[error("Ratio cannot be negative: {0}")]
    Negative(Decimal),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ratio(U256);

impl Ratio {
    pub const ONE: Ratio = Ratio(WAD);

    pub fn from_wad(raw: U256) -> Self {
        Self(raw)
    }

    pub fn as_wad(&self) -> U256 {
        self.0
    }

    /// `current / reference`; saturates at `U256::MAX`
    pub fn of(current: U256, reference: U256) -> Result<Self, RatioError> {
        if reference.is_zero() {
            return Err(RatioError::ZeroReference);
        }

        let scaled = current.full_mul(WAD) / U512::from(reference);
        Ok(Self(U256::try_from(scaled).unwrap_or(U256::MAX)))
    }

    /// Convert an operator threshold such as `2.5` into fixed point.
    /// Digits past the 18th decimal are truncated.
    pub fn from_decimal(value: Decimal) -> Result<Self, RatioError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(RatioError::Negative(value));
        }

        let mantissa = U256::from(value.mantissa().unsigned_abs());
        let scale = value.scale();
        let raw = if scale <= WAD_DECIMALS {
            mantissa * U256::exp10((WAD_DECIMALS - scale) as usize)
        } else {
            mantissa / U256::exp10((scale - WAD_DECIMALS) as usize)
        };
        Ok(Self(raw))
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / WAD;
        let fraction = (self.0 % WAD) / U256::exp10(14);
        write!(f, "{}.{:04}", whole, fraction.as_u64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ratio_of_exact() {
        let ratio = Ratio::of(U256::from(2000u64), U256::from(1000u64)).unwrap();
        assert_eq!(ratio, Ratio::from_decimal(dec!(2)).unwrap());
    }

    #[test]
    fn test_ratio_below_one_keeps_precision() {
        let ratio = Ratio::of(U256::from(200u64), U256::from(1000u64)).unwrap();
        assert_eq!(ratio.as_wad(), U256::exp10(17) * 2);
        assert_eq!(ratio.to_string(), "0.2000");
    }

    #[test]
    fn test_ratio_zero_reference() {
        assert_eq!(
            Ratio::of(U256::one(), U256::zero()),
            Err(RatioError::ZeroReference)
        );
    }

    #[test]
    fn test_ratio_large_amounts() {
        // 18-decimal token amounts in the billions
        let reference = U256::exp10(27);
        let current = U256::exp10(27) * 3 / 2;
        let ratio = Ratio::of(current, reference).unwrap();
        assert_eq!(ratio, Ratio::from_decimal(dec!(1.5)).unwrap());
    }

    #[test]
    fn test_ratio_saturates() {
        let ratio = Ratio::of(U256::MAX, U256::one()).unwrap();
        assert_eq!(ratio.as_wad(), U256::MAX);
    }

    #[test]
    fn test_from_decimal() {
        assert_eq!(Ratio::from_decimal(dec!(1)).unwrap(), Ratio::ONE);
        assert_eq!(Ratio::from_decimal(dec!(0.25)).unwrap().as_wad(), U256::exp10(16) * 25);
        assert_eq!(Ratio::from_decimal(dec!(0)).unwrap().as_wad(), U256::zero());
        assert!(matches!(
            Ratio::from_decimal(dec!(-0.5)),
            Err(RatioError::Negative(_))
        ));
    }

    #[test]
    fn test_from_decimal_truncates_past_wad_precision() {
        let tiny = Decimal::from_i128_with_scale(15, 20);
        assert_eq!(Ratio::from_decimal(tiny).unwrap().as_wad(), U256::zero());
    }

    #[test]
    fn test_display() {
        assert_eq!(Ratio::from_decimal(dec!(2.5)).unwrap().to_string(), "2.5000");
        assert_eq!(Ratio::ONE.to_string(), "1.0000");
    }
}
