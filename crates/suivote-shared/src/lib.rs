//! # suivote-shared
//!
//! Domain types and pure functions shared by every suivote crate: poll
//! drafts and media assets, whitelist validation, option index mapping,
//! weight normalization, fixed-point units, and the vote status merge
//! table.

pub mod constants;
pub mod error;
pub mod options;
pub mod params;
pub mod poll;
pub mod types;
pub mod units;
pub mod vote;
pub mod weights;
pub mod whitelist;

pub use error::{UnitsError, ValidationError};
pub use options::{from_indices, to_indices, Mapped, MappingFault, OptionList};
pub use params::{PaymentConfig, TokenGating, VoteCreationParams, WhitelistConfig};
pub use poll::{MediaAsset, MediaStatus, OptionDraft, PollDraft, ResolvedOption, ResolvedPoll};
pub use types::{now_millis, VoteId};
pub use vote::{OptionRecord, PollRecord, VoteRecord, VoteStatus, VoteUpdateEvent};
pub use weights::{normalize, NormalizedWeights, WeightWarning};
pub use whitelist::{Whitelist, WhitelistEntry};
