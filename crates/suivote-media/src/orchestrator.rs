//! Resolves every media asset referenced by a poll set.
//!
//! Each distinct local id is uploaded at most once, all uploads run
//! concurrently, and the call only returns once every upload has settled.
//! A single failure fails the whole resolution: a vote must never be
//! assembled from a partially resolved poll set.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use suivote_shared::{MediaAsset, MediaStatus, PollDraft, ResolvedOption, ResolvedPoll};

use crate::error::{MediaError, UploadError};
use crate::policy::MediaPolicy;
use crate::uploader::{BlobUpload, StoredBlob};

/// Local id -> stored blob.
pub type ResolvedMedia = HashMap<String, StoredBlob>;

/// One transition of an asset's upload state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaProgress {
    pub local_id: String,
    pub status: MediaStatus,
}

pub type ProgressSender = mpsc::UnboundedSender<MediaProgress>;

const RETRY_BACKOFF: Duration = Duration::from_millis(250);

pub struct MediaUploadOrchestrator<U> {
    uploader: U,
    policy: MediaPolicy,
    attempts: u32,
}

impl<U: BlobUpload> MediaUploadOrchestrator<U> {
    pub fn new(uploader: U, policy: MediaPolicy) -> Self {
        Self {
            uploader,
            policy,
            attempts: 1,
        }
    }

    /// Total attempts per asset for transient failures (1 = no retry).
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    pub fn uploader(&self) -> &U {
        &self.uploader
    }

    /// Upload every asset referenced by `polls` and return the blob each
    /// local id resolved to.
    ///
    /// Assets that already carry a blob reference are not uploaded again.
    pub async fn resolve_all(
        &self,
        polls: &[PollDraft],
        assets: &HashMap<String, MediaAsset>,
        progress: Option<&ProgressSender>,
    ) -> Result<ResolvedMedia, MediaError> {
        let mut resolved = ResolvedMedia::new();
        let mut pending: Vec<&MediaAsset> = Vec::new();

        // Policy is checked for every asset before anything is sent
        for local_id in referenced_assets(polls) {
            let asset = assets
                .get(&local_id)
                .ok_or_else(|| MediaError::UnknownAsset(local_id.clone()))?;

            if let Some(ref blob_reference) = asset.blob_reference {
                debug!(local_id = %local_id, "Asset already uploaded, reusing reference");
                resolved.insert(
                    local_id,
                    StoredBlob {
                        blob_reference: blob_reference.clone(),
                        storage_object_id: asset.storage_object_id.clone(),
                    },
                );
                continue;
            }

            if let Err(source) = self.policy.check(asset) {
                report(progress, &local_id, MediaStatus::Error);
                return Err(MediaError::AssemblyAbort { local_id, source });
            }

            report(progress, &local_id, MediaStatus::Pending);
            pending.push(asset);
        }

        if pending.is_empty() {
            return Ok(resolved);
        }

        info!(count = pending.len(), "Uploading media assets");

        let results = join_all(pending.iter().map(|asset| self.upload_one(asset, progress))).await;

        let mut failure: Option<(String, UploadError)> = None;
        for (asset, result) in pending.iter().zip(results) {
            match result {
                Ok(stored) => {
                    resolved.insert(asset.local_id.clone(), stored);
                }
                Err(e) if failure.is_none() => failure = Some((asset.local_id.clone(), e)),
                Err(e) => warn!(local_id = %asset.local_id, error = %e, "Additional upload failure"),
            }
        }

        if let Some((local_id, source)) = failure {
            warn!(local_id = %local_id, error = %source, "Media resolution aborted");
            return Err(MediaError::AssemblyAbort { local_id, source });
        }

        Ok(resolved)
    }

    async fn upload_one(&self, asset: &MediaAsset, progress: Option<&ProgressSender>) -> Result<StoredBlob, UploadError> {
        report(progress, &asset.local_id, MediaStatus::Uploading);

        let mut attempt = 1;
        loop {
            match self.uploader.upload(asset).await {
                Ok(stored) => {
                    report(progress, &asset.local_id, MediaStatus::Complete);
                    return Ok(stored);
                }
                Err(e) if e.is_transient() && attempt < self.attempts => {
                    warn!(
                        local_id = %asset.local_id,
                        attempt,
                        error = %e,
                        "Transient upload failure, retrying"
                    );
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                    attempt += 1;
                }
                Err(e) => {
                    report(progress, &asset.local_id, MediaStatus::Error);
                    return Err(e);
                }
            }
        }
    }
}

/// Distinct local ids referenced across all options, in first-seen order.
pub fn referenced_assets(polls: &[PollDraft]) -> Vec<String> {
    let mut seen = HashSet::new();
    polls
        .iter()
        .flat_map(|p| p.media_refs())
        .filter(|id| seen.insert(*id))
        .map(str::to_string)
        .collect()
}

/// Substitute resolved blob references into the option payloads.
/// Options without media are left untouched.
pub fn rewrite_polls(polls: &[PollDraft], resolved: &ResolvedMedia) -> Result<Vec<ResolvedPoll>, MediaError> {
    polls
        .iter()
        .map(|poll| {
            let options = poll
                .options
                .iter()
                .map(|option| {
                    let media_reference = match option.media_ref {
                        Some(ref local_id) => Some(
                            resolved
                                .get(local_id)
                                .map(|b| b.blob_reference.clone())
                                .ok_or_else(|| MediaError::UnknownAsset(local_id.clone()))?,
                        ),
                        None => None,
                    };
                    Ok(ResolvedOption {
                        text: option.text.clone(),
                        media_reference,
                    })
                })
                .collect::<Result<Vec<_>, MediaError>>()?;

            Ok(ResolvedPoll {
                title: poll.title.clone(),
                description: poll.description.clone(),
                is_multi_select: poll.is_multi_select,
                max_selections: poll.effective_max_selections(),
                is_required: poll.is_required,
                options,
            })
        })
        .collect()
}

fn report(progress: Option<&ProgressSender>, local_id: &str, status: MediaStatus) {
    debug!(local_id, status = ?status, "Media status");
    if let Some(tx) = progress {
        // Receiver gone means nobody is watching; uploads continue regardless
        let _ = tx.send(MediaProgress {
            local_id: local_id.to_string(),
            status,
        });
    }
}
