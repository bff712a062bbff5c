use thiserror::Error;

use suivote_ledger::{AssemblyError, CastError, RpcError, SubmissionError, SubmissionErrorKind};
use suivote_shared::UnitsError;
use suivote_sync::SyncError;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("A vote creation is already in progress")]
    AttemptInProgress,

    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    #[error("Invalid ballot: {0}")]
    Cast(#[from] CastError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error("Amount conversion failed: {0}")]
    Units(#[from] UnitsError),

    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Sync(#[from] SyncError),
}

impl ClientError {
    /// Whether resubmitting the same request verbatim is safe: only an
    /// aborted upload or a network-classified submission failure.
    pub fn is_retry_safe(&self) -> bool {
        match self {
            ClientError::Assembly(e) => e.is_retry_safe(),
            ClientError::Submission(e) => e.kind == SubmissionErrorKind::Network,
            ClientError::AttemptInProgress
            | ClientError::Rpc(_)
            | ClientError::Cast(_)
            | ClientError::Units(_)
            | ClientError::Sync(_) => false,
        }
    }
}
