/// Move module that hosts the voting entry points and the `Vote` object type
pub const VOTING_MODULE: &str = "voting";

/// Entry point that registers a vote with all of its polls
pub const CREATE_VOTE_FUNCTION: &str = "create_vote";

/// Entry point that records one voter's selections
pub const CAST_VOTE_FUNCTION: &str = "cast_vote";

/// Struct name of the shared vote object created by `create_vote`
pub const VOTE_STRUCT: &str = "Vote";

/// Shared system clock object passed to every timed entry point
pub const CLOCK_OBJECT_ID: &str = "0x6";

/// Decimals of the native coin (1 SUI = 10^9 MIST)
pub const NATIVE_COIN_DECIMALS: u8 = 9;

/// Fixed-point scale for whitelist weight fractions (1.0 == WEIGHT_SCALE)
pub const WEIGHT_SCALE: u64 = 1_000_000_000;

/// Weight substituted for a whitelist row with a missing or unusable weight
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Upper bound of a whitelist weight, in percent
pub const MAX_WEIGHT_PERCENT: f64 = 100.0;

/// Hex characters in an account address, after the `0x` prefix
pub const ADDRESS_HEX_LEN: usize = 64;

/// Minimum number of options a poll must offer
pub const MIN_OPTIONS_PER_POLL: usize = 2;

/// Storage epochs requested for each uploaded blob
pub const DEFAULT_STORAGE_EPOCHS: u32 = 5;

/// Maximum media asset size in bytes (10 MiB)
pub const DEFAULT_MAX_MEDIA_BYTES: usize = 10 * 1024 * 1024;

/// MIME types accepted for option media by default
pub const DEFAULT_MEDIA_TYPES: &[&str] = &["image/png", "image/jpeg", "image/gif", "image/webp"];

/// Maximum number of votes receiving live updates at once
pub const DEFAULT_MAX_TRACKED_VOTES: usize = 10;

/// Coalescing window for bursts of vote update events
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Default public endpoints (testnet)
pub const DEFAULT_PUBLISHER_URL: &str = "https://publisher.walrus-testnet.walrus.space";
pub const DEFAULT_AGGREGATOR_URL: &str = "https://aggregator.walrus-testnet.walrus.space";
pub const DEFAULT_RPC_URL: &str = "https://fullnode.testnet.sui.io:443";
