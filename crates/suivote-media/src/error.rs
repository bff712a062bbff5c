use thiserror::Error;

/// Failure of a single blob upload.
#[derive(Error, Debug)]
pub enum UploadError {
    /// The store answered with a non-2xx status.
    #[error("Blob store responded {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid blob store response: {0}")]
    InvalidResponse(String),

    /// The asset violates the caller's size/type policy and was never sent.
    #[error("Media rejected: {0}")]
    Rejected(String),
}

impl UploadError {
    /// HTTP status attached to the failure, if the store answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            UploadError::Http { status, .. } => Some(*status),
            UploadError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Worth another attempt: connection problems and 5xx answers.
    pub fn is_transient(&self) -> bool {
        match self {
            UploadError::Network(_) => true,
            UploadError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Failure to resolve the media of a poll set.
#[derive(Error, Debug)]
pub enum MediaError {
    /// An upload failed, so the whole vote-creation attempt is abandoned.
    #[error("Upload of media asset {local_id} failed: {source}")]
    AssemblyAbort {
        local_id: String,
        #[source]
        source: UploadError,
    },

    #[error("Option references unknown media asset {0}")]
    UnknownAsset(String),
}

impl MediaError {
    /// Local id of the asset that caused the failure.
    pub fn local_id(&self) -> &str {
        match self {
            MediaError::AssemblyAbort { local_id, .. } => local_id,
            MediaError::UnknownAsset(local_id) => local_id,
        }
    }

    /// Nothing reached the ledger, so the same attempt can be repeated.
    pub fn is_retry_safe(&self) -> bool {
        matches!(self, MediaError::AssemblyAbort { .. })
    }
}
