//! Whitelist entries and their validation.
//!
//! Malformed addresses, duplicates and out-of-range weights are rejected
//! here so that nothing invalid reaches weight normalization or the
//! transaction stage.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::constants::MAX_WEIGHT_PERCENT;
use crate::error::ValidationError;
use crate::types::parse_address;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhitelistEntry {
    pub address: String,
    /// Advisory voting-power share in percent, `0 < w <= 100`.
    pub weight_percent: Option<f64>,
}

impl WhitelistEntry {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            weight_percent: None,
        }
    }

    pub fn weighted(address: impl Into<String>, weight_percent: f64) -> Self {
        Self {
            address: address.into(),
            weight_percent: Some(weight_percent),
        }
    }
}

/// Validate a single entry and return it with a normalized address.
///
/// A NaN weight is not rejected here: it is treated as "non-numeric" and
/// defaulted with a warning by the weight normalizer.
pub fn validate_entry(entry: &WhitelistEntry) -> Result<WhitelistEntry, ValidationError> {
    let address = parse_address(&entry.address)?;

    if let Some(weight) = entry.weight_percent {
        if !weight.is_nan() && !(weight > 0.0 && weight <= MAX_WEIGHT_PERCENT) {
            return Err(ValidationError::WeightOutOfRange { address, weight });
        }
    }

    Ok(WhitelistEntry {
        address,
        weight_percent: entry.weight_percent,
    })
}

/// Validate a full list, rejecting the first malformed or duplicate entry.
pub fn validate_whitelist(entries: &[WhitelistEntry]) -> Result<Vec<WhitelistEntry>, ValidationError> {
    let mut seen = HashSet::with_capacity(entries.len());
    let mut valid = Vec::with_capacity(entries.len());

    for entry in entries {
        let checked = validate_entry(entry)?;
        if !seen.insert(checked.address.clone()) {
            return Err(ValidationError::DuplicateAddress(checked.address));
        }
        valid.push(checked);
    }

    Ok(valid)
}

/// How far the declared weights sum away from 100%.
///
/// Positive means over-allocated. Entries without a numeric weight are
/// ignored. Weights are advisory shares, so this is only ever reported.
pub fn weight_total_deviation(entries: &[WhitelistEntry]) -> f64 {
    let total: f64 = entries
        .iter()
        .filter_map(|e| e.weight_percent)
        .filter(|w| w.is_finite())
        .sum();
    total - MAX_WEIGHT_PERCENT
}

/// Whitelist under construction. Each `add` is checked immediately so the
/// list never holds an invalid or duplicate row.
#[derive(Debug, Clone, Default)]
pub struct Whitelist {
    entries: Vec<WhitelistEntry>,
}

impl Whitelist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: WhitelistEntry) -> Result<(), ValidationError> {
        let checked = validate_entry(&entry)?;
        if self.contains(&checked.address) {
            return Err(ValidationError::DuplicateAddress(checked.address));
        }
        self.entries.push(checked);
        Ok(())
    }

    pub fn remove(&mut self, address: &str) -> bool {
        let Ok(address) = parse_address(address) else {
            return false;
        };
        let before = self.entries.len();
        self.entries.retain(|e| e.address != address);
        self.entries.len() != before
    }

    pub fn contains(&self, normalized_address: &str) -> bool {
        self.entries.iter().any(|e| e.address == normalized_address)
    }

    pub fn entries(&self) -> &[WhitelistEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn weight_total_deviation(&self) -> f64 {
        weight_total_deviation(&self.entries)
    }
}
