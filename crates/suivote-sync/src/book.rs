//! The one shared mutable resource: vote id -> merged record, plus the
//! live subscriptions. Every merge happens under this lock, and so does
//! every publish, so removing a subscription is a hard stop for its
//! callbacks.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::debug;

use suivote_shared::{VoteId, VoteRecord, VoteUpdateEvent};

pub(crate) struct Subscription {
    pub token: u64,
    pub events: mpsc::UnboundedSender<VoteUpdateEvent>,
    pub task: JoinHandle<()>,
}

#[derive(Default)]
pub(crate) struct Book {
    pub records: HashMap<VoteId, VoteRecord>,
    pub subscriptions: HashMap<VoteId, Subscription>,
}

impl Book {
    /// Fold events into the record in arrival order and publish the result
    /// once if anything changed. Returns `false` if there is no record yet.
    pub fn merge(&mut self, id: &VoteId, events: &[VoteUpdateEvent], updates: &broadcast::Sender<VoteRecord>) -> bool {
        let Some(record) = self.records.get_mut(id) else {
            debug!(vote_id = %id.short(), count = events.len(), "No record yet, dropping updates");
            return false;
        };

        let mut changed = false;
        for event in events {
            changed |= record.apply(event);
        }

        if changed {
            debug!(vote_id = %id.short(), status = ?record.status, merged = events.len(), "Publishing vote update");
            // No subscribers is not an error
            let _ = updates.send(record.clone());
        }
        true
    }

    pub fn is_current(&self, id: &VoteId, token: u64) -> bool {
        self.subscriptions.get(id).is_some_and(|s| s.token == token)
    }
}

pub(crate) type SharedBook = std::sync::Arc<Mutex<Book>>;

/// Lock the book, ignoring poisoning.
pub(crate) fn lock(book: &Mutex<Book>) -> MutexGuard<'_, Book> {
    book.lock().unwrap_or_else(PoisonError::into_inner)
}
