use thiserror::Error;

use suivote_shared::VoteId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("Already tracking the maximum of {max} votes")]
    WorkingSetFull { max: usize },

    #[error("No record for vote {0}")]
    UnknownVote(VoteId),
}
