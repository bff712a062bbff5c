//! Poll authoring model.
//!
//! A [`PollDraft`] is what the user edits; option order inside it is the
//! only source of the positional indices the ledger program understands.
//! Media attached to options is referenced by the local id of a
//! [`MediaAsset`] until the upload step rewrites it into a
//! [`ResolvedPoll`].

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Media
// ---------------------------------------------------------------------------

/// Upload lifecycle of a media asset. Only the upload orchestrator moves an
/// asset between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaStatus {
    Pending,
    Uploading,
    Complete,
    Error,
}

/// A media file attached to one or more options during an authoring session.
#[derive(Debug, Clone)]
pub struct MediaAsset {
    /// Session-local identifier referenced by [`OptionDraft::media_ref`].
    pub local_id: String,
    pub raw_bytes: Bytes,
    pub content_type: String,
    pub status: MediaStatus,
    /// Blob id returned by the store. Set once, never overwritten.
    pub blob_reference: Option<String>,
    /// Ledger object that certifies the stored blob, when known.
    pub storage_object_id: Option<String>,
}

impl MediaAsset {
    pub fn new(local_id: impl Into<String>, raw_bytes: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            local_id: local_id.into(),
            raw_bytes: raw_bytes.into(),
            content_type: content_type.into(),
            status: MediaStatus::Pending,
            blob_reference: None,
            storage_object_id: None,
        }
    }

    pub fn size(&self) -> usize {
        self.raw_bytes.len()
    }

    /// Record the result of a successful upload.
    ///
    /// Returns `false` and leaves the asset untouched if it already carries
    /// a blob reference.
    pub fn mark_resolved(&mut self, blob_reference: String, storage_object_id: Option<String>) -> bool {
        if self.blob_reference.is_some() {
            return false;
        }
        self.blob_reference = Some(blob_reference);
        self.storage_object_id = storage_object_id;
        self.status = MediaStatus::Complete;
        true
    }
}

// ---------------------------------------------------------------------------
// Drafts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionDraft {
    /// Client-only id that survives reordering. Never sent to the ledger.
    pub stable_id: String,
    pub text: String,
    /// Local id of an attached [`MediaAsset`].
    pub media_ref: Option<String>,
}

impl OptionDraft {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            stable_id: Uuid::new_v4().to_string(),
            text: text.into(),
            media_ref: None,
        }
    }

    pub fn with_media(mut self, local_id: impl Into<String>) -> Self {
        self.media_ref = Some(local_id.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollDraft {
    pub title: String,
    pub description: String,
    pub is_multi_select: bool,
    pub max_selections: u32,
    pub is_required: bool,
    pub options: Vec<OptionDraft>,
}

impl PollDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            is_multi_select: false,
            max_selections: 1,
            is_required: true,
            options: Vec::new(),
        }
    }

    /// Append an option and return its stable id.
    pub fn add_option(&mut self, option: OptionDraft) -> String {
        let id = option.stable_id.clone();
        self.options.push(option);
        id
    }

    pub fn remove_option(&mut self, stable_id: &str) -> Option<OptionDraft> {
        let pos = self.options.iter().position(|o| o.stable_id == stable_id)?;
        Some(self.options.remove(pos))
    }

    /// Move an option to a new position. Positional indices of every option
    /// in between shift accordingly; stable ids do not.
    pub fn move_option(&mut self, stable_id: &str, to: usize) -> bool {
        let Some(from) = self.options.iter().position(|o| o.stable_id == stable_id) else {
            return false;
        };
        let option = self.options.remove(from);
        let to = to.min(self.options.len());
        self.options.insert(to, option);
        true
    }

    /// Local ids of media referenced by this poll's options, in option order.
    pub fn media_refs(&self) -> impl Iterator<Item = &str> {
        self.options.iter().filter_map(|o| o.media_ref.as_deref())
    }

    /// Selection cap actually sent to the ledger: single-select polls
    /// always allow exactly one.
    pub fn effective_max_selections(&self) -> u32 {
        if self.is_multi_select {
            self.max_selections
        } else {
            1
        }
    }
}

// ---------------------------------------------------------------------------
// Resolved payload
// ---------------------------------------------------------------------------

/// Poll payload after media resolution, in the exact order the ledger
/// will index it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPoll {
    pub title: String,
    pub description: String,
    pub is_multi_select: bool,
    pub max_selections: u32,
    pub is_required: bool,
    pub options: Vec<ResolvedOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedOption {
    pub text: String,
    pub media_reference: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poll_with(texts: &[&str]) -> PollDraft {
        let mut poll = PollDraft::new("Lunch");
        for t in texts {
            poll.add_option(OptionDraft::new(*t));
        }
        poll
    }

    #[test]
    fn test_move_option_keeps_stable_ids() {
        let mut poll = poll_with(&["a", "b", "c"]);
        let c_id = poll.options[2].stable_id.clone();

        assert!(poll.move_option(&c_id, 0));
        let texts: Vec<_> = poll.options.iter().map(|o| o.text.as_str()).collect();
        assert_eq!(texts, vec!["c", "a", "b"]);
        assert_eq!(poll.options[0].stable_id, c_id);
    }

    #[test]
    fn test_remove_unknown_option() {
        let mut poll = poll_with(&["a"]);
        assert!(poll.remove_option("missing").is_none());
        assert_eq!(poll.options.len(), 1);
    }

    #[test]
    fn test_mark_resolved_only_once() {
        let mut asset = MediaAsset::new("img-1", vec![1u8, 2, 3], "image/png");
        assert!(asset.mark_resolved("blob-a".into(), Some("0x1".into())));
        assert!(!asset.mark_resolved("blob-b".into(), None));
        assert_eq!(asset.blob_reference.as_deref(), Some("blob-a"));
        assert_eq!(asset.status, MediaStatus::Complete);
    }

    #[test]
    fn test_single_select_caps_at_one() {
        let mut poll = poll_with(&["a", "b", "c"]);
        poll.max_selections = 3;
        assert_eq!(poll.effective_max_selections(), 1);
        poll.is_multi_select = true;
        assert_eq!(poll.effective_max_selections(), 3);
    }
}
