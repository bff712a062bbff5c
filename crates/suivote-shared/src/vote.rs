//! Vote records as seen by list and detail views, the partial update
//! events that refresh them, and the status precedence table that merges
//! the two.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::options::OptionList;
use crate::types::VoteId;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteStatus {
    /// Awaiting an action from the local user.
    Pending,
    Upcoming,
    Active,
    /// The local user has already participated.
    Voted,
    /// Terminal and absorbing.
    Closed,
}

impl VoteStatus {
    /// Resulting status when an event declaring `incoming` is merged into a
    /// record currently at `self`.
    pub fn merge(self, incoming: VoteStatus) -> VoteStatus {
        use VoteStatus::*;

        match (self, incoming) {
            // Closed always wins, and once closed nothing reopens the vote
            (_, Closed) => Closed,
            (Closed, Pending | Upcoming | Active | Voted) => Closed,
            // Own participation is never erased by a generic refresh
            (Pending | Upcoming | Active | Voted, Voted) => Voted,
            (Voted, Pending | Upcoming | Active) => Voted,
            // Pending outranks a plain status refresh
            (Pending, Pending | Upcoming | Active) => Pending,
            (Upcoming | Active, next @ (Pending | Upcoming | Active)) => next,
        }
    }

    /// Status of a freshly read vote as seen by one account: its own
    /// ballot makes it `Voted`, and an open vote it may still vote on is
    /// `Pending`.
    pub fn for_viewer(self, has_voted: bool, eligible: bool) -> VoteStatus {
        use VoteStatus::*;

        match self {
            Closed => Closed,
            _ if has_voted => Voted,
            Active if eligible => Pending,
            other => other,
        }
    }

    /// Status implied by the voting window alone.
    pub fn from_window(start_ms: u64, end_ms: u64, now_ms: u64) -> VoteStatus {
        if now_ms >= end_ms {
            VoteStatus::Closed
        } else if now_ms < start_ms {
            VoteStatus::Upcoming
        } else {
            VoteStatus::Active
        }
    }
}

// ---------------------------------------------------------------------------
// Record and events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRecord {
    pub id: VoteId,
    pub title: String,
    pub description: String,
    pub status: VoteStatus,
    pub total_votes: u64,
    pub polls_count: u64,
    pub start_timestamp: u64,
    pub end_timestamp: u64,
    pub token_requirement: Option<String>,
    pub token_amount: Option<u64>,
    pub has_whitelist: bool,
    pub is_whitelisted: Option<bool>,
}

/// Partial vote record pushed by the ledger subscription. Absent fields
/// leave the current value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteUpdateEvent {
    pub id: VoteId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<VoteStatus>,
    pub total_votes: Option<u64>,
    pub polls_count: Option<u64>,
    pub start_timestamp: Option<u64>,
    pub end_timestamp: Option<u64>,
    pub token_requirement: Option<String>,
    pub token_amount: Option<u64>,
    pub has_whitelist: Option<bool>,
    pub is_whitelisted: Option<bool>,
}

impl VoteUpdateEvent {
    pub fn new(id: VoteId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: VoteStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_total_votes(mut self, total: u64) -> Self {
        self.total_votes = Some(total);
        self
    }
}

impl From<VoteRecord> for VoteUpdateEvent {
    fn from(record: VoteRecord) -> Self {
        Self {
            id: record.id,
            title: Some(record.title),
            description: Some(record.description),
            status: Some(record.status),
            total_votes: Some(record.total_votes),
            polls_count: Some(record.polls_count),
            start_timestamp: Some(record.start_timestamp),
            end_timestamp: Some(record.end_timestamp),
            token_requirement: record.token_requirement,
            token_amount: record.token_amount,
            has_whitelist: Some(record.has_whitelist),
            is_whitelisted: record.is_whitelisted,
        }
    }
}

impl VoteRecord {
    /// Merge an update into this record.
    ///
    /// Only `status` follows the precedence table; every other field present
    /// in the event overwrites the current value. Returns `true` if anything
    /// changed.
    pub fn apply(&mut self, event: &VoteUpdateEvent) -> bool {
        let before = self.clone();

        if let Some(incoming) = event.status {
            self.status = self.status.merge(incoming);
        }
        if let Some(ref title) = event.title {
            self.title = title.clone();
        }
        if let Some(ref description) = event.description {
            self.description = description.clone();
        }
        if let Some(total) = event.total_votes {
            self.total_votes = total;
        }
        if let Some(count) = event.polls_count {
            self.polls_count = count;
        }
        if let Some(start) = event.start_timestamp {
            self.start_timestamp = start;
        }
        if let Some(end) = event.end_timestamp {
            self.end_timestamp = end;
        }
        if event.token_requirement.is_some() {
            self.token_requirement = event.token_requirement.clone();
        }
        if event.token_amount.is_some() {
            self.token_amount = event.token_amount;
        }
        if let Some(has) = event.has_whitelist {
            self.has_whitelist = has;
        }
        if event.is_whitelisted.is_some() {
            self.is_whitelisted = event.is_whitelisted;
        }

        *self != before
    }
}

// ---------------------------------------------------------------------------
// Loaded polls
// ---------------------------------------------------------------------------

/// A poll read back from the ledger, with stable ids assigned on load so
/// the same mapping code serves drafts and published votes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollRecord {
    pub title: String,
    pub description: String,
    pub is_multi_select: bool,
    pub max_selections: u32,
    pub is_required: bool,
    pub options: Vec<OptionRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionRecord {
    pub stable_id: String,
    pub text: String,
    pub media_reference: Option<String>,
    pub votes: u64,
}

impl OptionRecord {
    pub fn new(text: impl Into<String>, media_reference: Option<String>, votes: u64) -> Self {
        Self {
            stable_id: Uuid::new_v4().to_string(),
            text: text.into(),
            media_reference,
            votes,
        }
    }
}

impl OptionList for PollRecord {
    fn option_ids(&self) -> Vec<&str> {
        self.options.iter().map(|o| o.stable_id.as_str()).collect()
    }
}
