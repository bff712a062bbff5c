//! Human-unit to fixed-point conversions for ledger call arguments.

use crate::constants::WEIGHT_SCALE;
use crate::error::UnitsError;

// 10^19 already exceeds u64::MAX
const MAX_DECIMALS: u8 = 19;

/// Convert a human-unit amount (e.g. `1.5` tokens) into integer base units
/// for a coin with `decimals` decimals, rounding to the nearest unit.
pub fn to_base_units(amount: f64, decimals: u8) -> Result<u64, UnitsError> {
    if decimals > MAX_DECIMALS {
        return Err(UnitsError::Decimals(decimals));
    }
    if !amount.is_finite() || amount < 0.0 {
        return Err(UnitsError::Invalid(amount));
    }

    let scaled = (amount * 10f64.powi(decimals as i32)).round();
    if scaled >= u64::MAX as f64 {
        return Err(UnitsError::Overflow { amount, decimals });
    }
    Ok(scaled as u64)
}

/// Scale weight fractions into the ledger's fixed-point representation.
pub fn weights_to_fixed(fractions: &[f64]) -> Result<Vec<u64>, UnitsError> {
    fractions
        .iter()
        .map(|f| {
            if !f.is_finite() || *f < 0.0 {
                return Err(UnitsError::Invalid(*f));
            }
            let scaled = (f * WEIGHT_SCALE as f64).round();
            if scaled >= u64::MAX as f64 {
                return Err(UnitsError::Overflow {
                    amount: *f,
                    decimals: 9,
                });
            }
            Ok(scaled as u64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_base_units() {
        assert_eq!(to_base_units(1.5, 9).unwrap(), 1_500_000_000);
        assert_eq!(to_base_units(0.1, 9).unwrap(), 100_000_000);
        assert_eq!(to_base_units(0.0, 6).unwrap(), 0);
        assert_eq!(to_base_units(42.0, 0).unwrap(), 42);
    }

    #[test]
    fn test_invalid_amounts() {
        assert!(matches!(to_base_units(-1.0, 9), Err(UnitsError::Invalid(_))));
        assert!(matches!(to_base_units(f64::NAN, 9), Err(UnitsError::Invalid(_))));
        assert!(matches!(to_base_units(1e30, 9), Err(UnitsError::Overflow { .. })));
        assert!(matches!(to_base_units(1.0, 20), Err(UnitsError::Decimals(20))));
    }

    #[test]
    fn test_weights_to_fixed() {
        assert_eq!(
            weights_to_fixed(&[0.25, 1.0]).unwrap(),
            vec![250_000_000, 1_000_000_000]
        );
        assert!(weights_to_fixed(&[]).unwrap().is_empty());
    }
}
