//! Per-vote subscription task.
//!
//! Events are collected until the vote has been quiet for `debounce`, or
//! until `max_wait` has passed since the first event of the burst, then
//! merged and published in one step. The last event of a burst is always
//! part of the flush.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::time::{sleep_until, Instant};
use tracing::debug;

use suivote_shared::{VoteId, VoteRecord, VoteUpdateEvent};

use crate::book::{lock, SharedBook};

pub(crate) struct VoteActor {
    pub id: VoteId,
    pub token: u64,
    pub events: mpsc::UnboundedReceiver<VoteUpdateEvent>,
    pub book: SharedBook,
    pub updates: broadcast::Sender<VoteRecord>,
    pub debounce: Duration,
    pub max_wait: Duration,
}

impl VoteActor {
    pub async fn run(mut self) {
        debug!(vote_id = %self.id.short(), "Vote subscription started");

        while let Some(first) = self.events.recv().await {
            let mut batch = vec![first];
            let deadline = Instant::now() + self.max_wait;
            let mut closed = false;

            loop {
                let quiet_until = (Instant::now() + self.debounce).min(deadline);
                tokio::select! {
                    next = self.events.recv() => match next {
                        Some(event) => batch.push(event),
                        None => {
                            closed = true;
                            break;
                        }
                    },
                    _ = sleep_until(quiet_until) => break,
                }
            }

            if !self.flush(&batch) || closed {
                break;
            }
        }

        debug!(vote_id = %self.id.short(), "Vote subscription stopped");
    }

    /// Returns `false` once this subscription has been cancelled.
    fn flush(&self, batch: &[VoteUpdateEvent]) -> bool {
        let mut book = lock(&self.book);
        if !book.is_current(&self.id, self.token) {
            return false;
        }
        book.merge(&self.id, batch, &self.updates);
        true
    }
}
