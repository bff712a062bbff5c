use thiserror::Error;

/// Rejections raised while checking vote-creation input, before any
/// upload or ledger call is attempted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Malformed address: {0}")]
    MalformedAddress(String),

    #[error("Duplicate whitelist address: {0}")]
    DuplicateAddress(String),

    #[error("Weight for {address} out of range: {weight} (expected 0 < weight <= 100)")]
    WeightOutOfRange { address: String, weight: f64 },

    #[error("Whitelist is enabled but has no entries")]
    EmptyWhitelist,

    #[error("Vote title is required")]
    MissingTitle,

    #[error("At least one poll is required")]
    NoPolls,

    #[error("Poll {poll} has no title")]
    PollMissingTitle { poll: usize },

    #[error("Poll {poll} needs at least {min} options, has {count}")]
    TooFewOptions { poll: usize, count: usize, min: usize },

    #[error("Poll {poll} has duplicate option id {stable_id}")]
    DuplicateOptionId { poll: usize, stable_id: String },

    #[error("Poll {poll}, option {option} has neither text nor media")]
    EmptyOption { poll: usize, option: usize },

    #[error("Poll {poll} allows {max} selections but has {count} options")]
    InvalidMaxSelections { poll: usize, max: u32, count: usize },

    #[error("Start time {start} must be before end time {end}")]
    InvalidTimeRange { start: u64, end: u64 },

    #[error("End time {end} is already in the past (now {now})")]
    EndInPast { end: u64, now: u64 },

    #[error("Token type is required when a token amount is set")]
    MissingTokenType,

    #[error("Invalid amount for {field}: {value}")]
    InvalidAmount { field: &'static str, value: f64 },
}

/// Errors converting human-unit amounts into ledger base units.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UnitsError {
    #[error("Amount must be finite and non-negative, got {0}")]
    Invalid(f64),

    #[error("Amount {amount} overflows u64 at {decimals} decimals")]
    Overflow { amount: f64, decimals: u8 },

    #[error("Unsupported decimals: {0}")]
    Decimals(u8),
}
