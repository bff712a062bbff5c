use suivote_shared::constants::{DEFAULT_MAX_MEDIA_BYTES, DEFAULT_MEDIA_TYPES};
use suivote_shared::MediaAsset;

use crate::error::UploadError;

/// Caller-supplied size and MIME limits, checked before an asset is handed
/// to the uploader.
#[derive(Debug, Clone)]
pub struct MediaPolicy {
    pub max_bytes: usize,
    /// Accepted MIME types, lowercase. Empty accepts anything.
    pub allowed_types: Vec<String>,
}

impl Default for MediaPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_MEDIA_BYTES,
            allowed_types: DEFAULT_MEDIA_TYPES.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl MediaPolicy {
    pub fn check(&self, asset: &MediaAsset) -> Result<(), UploadError> {
        if asset.raw_bytes.is_empty() {
            return Err(UploadError::Rejected(format!("{} is empty", asset.local_id)));
        }
        if asset.size() > self.max_bytes {
            return Err(UploadError::Rejected(format!(
                "{} is {} bytes (max {})",
                asset.local_id,
                asset.size(),
                self.max_bytes
            )));
        }

        // Ignore parameters such as "; charset=..."
        let mime = asset
            .content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if !self.allowed_types.is_empty() && !self.allowed_types.iter().any(|t| *t == mime) {
            return Err(UploadError::Rejected(format!(
                "{} has unsupported type {}",
                asset.local_id, asset.content_type
            )));
        }

        Ok(())
    }
}
