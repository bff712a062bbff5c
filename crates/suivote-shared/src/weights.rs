//! Whitelist weight normalization.
//!
//! Weights are advisory voting-power shares. They are converted
//! `percent / 100` and never rescaled to force a 100% total; callers warn
//! about deviating totals via [`crate::whitelist::weight_total_deviation`].

use std::fmt;

use tracing::warn;

use crate::constants::{DEFAULT_WEIGHT, MAX_WEIGHT_PERCENT};
use crate::whitelist::WhitelistEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightWarningReason {
    Missing,
    NotANumber,
}

/// A row whose weight could not be used and was defaulted to 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightWarning {
    /// Position of the row in the whitelist.
    pub position: usize,
    pub address: String,
    pub reason: WeightWarningReason,
}

impl fmt::Display for WeightWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self.reason {
            WeightWarningReason::Missing => "missing",
            WeightWarningReason::NotANumber => "not a number",
        };
        write!(
            f,
            "Weight for {} (row {}) is {reason}, using default {DEFAULT_WEIGHT}",
            self.address, self.position
        )
    }
}

/// Normalization output, positionally aligned with the input entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedWeights {
    pub weights: Vec<f64>,
    pub warnings: Vec<WeightWarning>,
}

/// Convert whitelist percentages into decimal fractions.
///
/// With weighting disabled the result is empty, which the ledger call reads
/// as "uniform weight 1 per address".
pub fn normalize(entries: &[WhitelistEntry], weighting_enabled: bool) -> NormalizedWeights {
    if !weighting_enabled {
        return NormalizedWeights::default();
    }

    let mut out = NormalizedWeights {
        weights: Vec::with_capacity(entries.len()),
        warnings: Vec::new(),
    };

    for (position, entry) in entries.iter().enumerate() {
        let reason = match entry.weight_percent {
            Some(w) if w.is_finite() => {
                out.weights.push(w / MAX_WEIGHT_PERCENT);
                continue;
            }
            Some(_) => WeightWarningReason::NotANumber,
            None => WeightWarningReason::Missing,
        };

        let warning = WeightWarning {
            position,
            address: entry.address.clone(),
            reason,
        };
        warn!(%warning, "Defaulting whitelist weight");
        out.weights.push(DEFAULT_WEIGHT);
        out.warnings.push(warning);
    }

    out
}
