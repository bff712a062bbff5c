use std::fmt;

use thiserror::Error;

use suivote_media::MediaError;
use suivote_shared::{UnitsError, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionErrorKind {
    UserDeclined,
    InsufficientFunds,
    Network,
    Wallet,
    Unknown,
}

// Checked in order; the first group with a matching substring wins.
const CLASSIFIERS: &[(SubmissionErrorKind, &[&str])] = &[
    (
        SubmissionErrorKind::InsufficientFunds,
        &["insufficient", "balance", "no valid gas coins", "gas budget"],
    ),
    (
        SubmissionErrorKind::UserDeclined,
        &["rejected", "declined", "denied", "cancelled", "canceled"],
    ),
    (
        SubmissionErrorKind::Network,
        &["network", "timeout", "timed out", "fetch", "connection", "unreachable"],
    ),
    (
        SubmissionErrorKind::Wallet,
        &["wallet", "not connected", "signer", "account"],
    ),
];

impl SubmissionErrorKind {
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        CLASSIFIERS
            .iter()
            .find(|(_, needles)| needles.iter().any(|n| lower.contains(n)))
            .map(|(kind, _)| *kind)
            .unwrap_or(SubmissionErrorKind::Unknown)
    }
}

impl fmt::Display for SubmissionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubmissionErrorKind::UserDeclined => "user declined",
            SubmissionErrorKind::InsufficientFunds => "insufficient funds",
            SubmissionErrorKind::Network => "network",
            SubmissionErrorKind::Wallet => "wallet",
            SubmissionErrorKind::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// The ledger or wallet refused or failed to execute a transaction.
/// `message` is the underlying text, unmodified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Transaction failed ({kind}): {message}")]
pub struct SubmissionError {
    pub kind: SubmissionErrorKind,
    pub message: String,
}

impl SubmissionError {
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: SubmissionErrorKind::classify(&message),
            message,
        }
    }
}

#[derive(Error, Debug)]
pub enum AssemblyError {
    #[error("Invalid vote parameters: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error("Amount conversion failed: {0}")]
    Units(#[from] UnitsError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    /// Executed, but no vote object appeared in the effects. The ledger has
    /// already changed, so resubmitting could create a duplicate vote.
    #[error("Transaction {digest} succeeded but the created vote could not be located")]
    AmbiguousSuccess { digest: String },
}

impl AssemblyError {
    /// Whether the same attempt can be submitted again without risking a
    /// duplicate or overriding a user decision.
    pub fn is_retry_safe(&self) -> bool {
        match self {
            AssemblyError::Media(e) => e.is_retry_safe(),
            AssemblyError::Submission(e) => e.kind == SubmissionErrorKind::Network,
            AssemblyError::Validation(_) | AssemblyError::Units(_) | AssemblyError::AmbiguousSuccess { .. } => false,
        }
    }
}

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("RPC transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Malformed RPC response: {0}")]
    Malformed(String),
}
