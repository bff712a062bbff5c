// Media upload for poll options: blob store client, upload policy, and
// the fan-out orchestrator that resolves a whole poll set.

pub mod error;
pub mod orchestrator;
pub mod policy;
pub mod uploader;

pub use error::{MediaError, UploadError};
pub use orchestrator::{
    referenced_assets, rewrite_polls, MediaProgress, MediaUploadOrchestrator, ProgressSender, ResolvedMedia,
};
pub use policy::MediaPolicy;
pub use uploader::{blob_url, BlobUpload, BlobUploader, StoredBlob};
