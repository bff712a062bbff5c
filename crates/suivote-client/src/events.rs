use serde::Serialize;
use tokio::sync::mpsc;

use suivote_shared::VoteId;

pub const EVENT_CREATION_PROGRESS: &str = "creation-progress";
pub const EVENT_MEDIA_PROGRESS: &str = "media-progress";
pub const EVENT_VOTE_UPDATED: &str = "vote-updated";

/// Stage of a vote-creation attempt.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "stage", rename_all = "camelCase")]
pub enum CreationProgress {
    #[serde(rename_all = "camelCase")]
    UploadingMedia { assets: usize },
    Submitting,
    #[serde(rename_all = "camelCase")]
    Created { vote_id: VoteId, digest: String },
    #[serde(rename_all = "camelCase")]
    Failed { message: String, retry_safe: bool },
}

/// Named event for presentation code.
#[derive(Debug, Clone, Serialize)]
pub struct ClientEvent {
    pub name: &'static str,
    pub payload: serde_json::Value,
}

pub type EventSender = mpsc::UnboundedSender<ClientEvent>;

pub fn emit_event<S: Serialize>(tx: &EventSender, name: &'static str, payload: S) {
    let payload = match serde_json::to_value(payload) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!(event = name, error = %e, "Failed to serialize event payload");
            return;
        }
    };
    if tx.send(ClientEvent { name, payload }).is_err() {
        tracing::debug!(event = name, "No event listener");
    }
}
