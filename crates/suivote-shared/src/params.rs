//! Input to one vote-creation attempt.
//!
//! [`VoteCreationParams`] is immutable for the duration of an attempt:
//! upload and assembly only read from it.

use std::collections::{HashMap, HashSet};

use crate::constants::{MIN_OPTIONS_PER_POLL, NATIVE_COIN_DECIMALS};
use crate::error::ValidationError;
use crate::poll::{MediaAsset, PollDraft};
use crate::whitelist::{validate_whitelist, WhitelistEntry};

/// Token requirement and token-weighted voting.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenGating {
    /// Fully qualified coin type, e.g. `0x2::sui::SUI`.
    pub required_token_type: Option<String>,
    /// Minimum balance in human units.
    pub required_amount: Option<f64>,
    /// Decimals of `required_token_type`.
    pub token_decimals: u8,
    /// Voting power proportional to token holdings.
    pub is_weighted: bool,
    /// Tokens (human units) that buy one vote when weighted.
    pub weight_per_vote: Option<f64>,
}

impl Default for TokenGating {
    fn default() -> Self {
        Self {
            required_token_type: None,
            required_amount: None,
            token_decimals: NATIVE_COIN_DECIMALS,
            is_weighted: false,
            weight_per_vote: None,
        }
    }
}

/// Fee each voter pays to cast a ballot, in native coin units.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentConfig {
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhitelistConfig {
    pub enabled: bool,
    pub entries: Vec<WhitelistEntry>,
    /// Per-address weights; uniform weight 1 when disabled.
    pub weighting_enabled: bool,
}

#[derive(Debug, Clone)]
pub struct VoteCreationParams {
    pub title: String,
    pub description: String,
    pub polls: Vec<PollDraft>,
    /// Media assets referenced by option `media_ref`s, keyed by local id.
    pub media: HashMap<String, MediaAsset>,
    pub token_gating: TokenGating,
    pub payment: PaymentConfig,
    pub whitelist: WhitelistConfig,
    /// Epoch milliseconds.
    pub start_timestamp: u64,
    pub end_timestamp: u64,
}

impl VoteCreationParams {
    pub fn new(title: impl Into<String>, start_timestamp: u64, end_timestamp: u64) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            polls: Vec::new(),
            media: HashMap::new(),
            token_gating: TokenGating::default(),
            payment: PaymentConfig::default(),
            whitelist: WhitelistConfig::default(),
            start_timestamp,
            end_timestamp,
        }
    }

    pub fn with_poll(mut self, poll: PollDraft) -> Self {
        self.polls.push(poll);
        self
    }

    pub fn with_media(mut self, asset: MediaAsset) -> Self {
        self.media.insert(asset.local_id.clone(), asset);
        self
    }

    /// Check everything that can be checked without network access.
    pub fn validate(&self, now_ms: u64) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingTitle);
        }

        if self.start_timestamp >= self.end_timestamp {
            return Err(ValidationError::InvalidTimeRange {
                start: self.start_timestamp,
                end: self.end_timestamp,
            });
        }
        if self.end_timestamp <= now_ms {
            return Err(ValidationError::EndInPast {
                end: self.end_timestamp,
                now: now_ms,
            });
        }

        if self.polls.is_empty() {
            return Err(ValidationError::NoPolls);
        }
        for (index, poll) in self.polls.iter().enumerate() {
            validate_poll(index, poll)?;
        }

        let gating = &self.token_gating;
        check_amount("required_amount", gating.required_amount)?;
        check_amount("weight_per_vote", gating.weight_per_vote)?;
        check_amount("payment", self.payment.amount)?;
        let needs_token = gating.required_amount.is_some_and(|a| a > 0.0) || gating.is_weighted;
        if needs_token && gating.required_token_type.as_deref().map_or(true, |t| t.trim().is_empty()) {
            return Err(ValidationError::MissingTokenType);
        }

        if self.whitelist.enabled {
            if self.whitelist.entries.is_empty() {
                return Err(ValidationError::EmptyWhitelist);
            }
            validate_whitelist(&self.whitelist.entries)?;
        }

        Ok(())
    }
}

fn validate_poll(index: usize, poll: &PollDraft) -> Result<(), ValidationError> {
    if poll.title.trim().is_empty() {
        return Err(ValidationError::PollMissingTitle { poll: index });
    }

    let count = poll.options.len();
    if count < MIN_OPTIONS_PER_POLL {
        return Err(ValidationError::TooFewOptions {
            poll: index,
            count,
            min: MIN_OPTIONS_PER_POLL,
        });
    }

    let mut seen = HashSet::with_capacity(count);
    for (position, option) in poll.options.iter().enumerate() {
        if !seen.insert(option.stable_id.as_str()) {
            return Err(ValidationError::DuplicateOptionId {
                poll: index,
                stable_id: option.stable_id.clone(),
            });
        }
        if option.text.trim().is_empty() && option.media_ref.is_none() {
            return Err(ValidationError::EmptyOption {
                poll: index,
                option: position,
            });
        }
    }

    let max = poll.effective_max_selections();
    if max == 0 || max as usize > count {
        return Err(ValidationError::InvalidMaxSelections {
            poll: index,
            max,
            count,
        });
    }

    Ok(())
}

fn check_amount(field: &'static str, value: Option<f64>) -> Result<(), ValidationError> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(ValidationError::InvalidAmount { field, value: v }),
        _ => Ok(()),
    }
}
