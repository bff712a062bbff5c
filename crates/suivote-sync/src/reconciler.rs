//! Live vote state.
//!
//! Holds the merged [`VoteRecord`] of every known vote and keeps a bounded
//! set of them subscribed to pushed [`VoteUpdateEvent`]s. Each subscribed
//! vote gets its own task that debounces bursts; votes outside the working
//! set only change through [`VoteStatusReconciler::ingest_snapshot`].
//!
//! Must be used from within a tokio runtime.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use suivote_shared::constants::{DEFAULT_DEBOUNCE_MS, DEFAULT_MAX_TRACKED_VOTES};
use suivote_shared::{VoteId, VoteRecord, VoteUpdateEvent};

use crate::actor::VoteActor;
use crate::book::{lock, Book, SharedBook, Subscription};
use crate::error::SyncError;
use crate::working_set::select_working_set;

const UPDATE_CHANNEL_SIZE: usize = 256;

#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// Maximum number of votes with a live subscription.
    pub max_tracked: usize,
    /// Quiet period that ends a burst.
    pub debounce: Duration,
    /// Upper bound on how long a continuous stream is held back.
    pub max_wait: Duration,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            max_tracked: DEFAULT_MAX_TRACKED_VOTES,
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            max_wait: Duration::from_millis(DEFAULT_DEBOUNCE_MS * 4),
        }
    }
}

/// Working-set changes made by [`VoteStatusReconciler::sync_working_set`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingSetChange {
    pub tracked: Vec<VoteId>,
    pub untracked: Vec<VoteId>,
}

pub struct VoteStatusReconciler {
    book: SharedBook,
    updates: broadcast::Sender<VoteRecord>,
    config: ReconcilerConfig,
    next_token: AtomicU64,
}

impl VoteStatusReconciler {
    pub fn new(config: ReconcilerConfig) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_SIZE);
        Self {
            book: Arc::new(Mutex::new(Book::default())),
            updates,
            config,
            next_token: AtomicU64::new(1),
        }
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Every merged record that changed, as it is published.
    pub fn subscribe_updates(&self) -> broadcast::Receiver<VoteRecord> {
        self.updates.subscribe()
    }

    pub fn get(&self, id: &VoteId) -> Option<VoteRecord> {
        lock(&self.book).records.get(id).cloned()
    }

    pub fn records(&self) -> Vec<VoteRecord> {
        lock(&self.book).records.values().cloned().collect()
    }

    pub fn tracked(&self) -> Vec<VoteId> {
        lock(&self.book).subscriptions.keys().cloned().collect()
    }

    pub fn is_tracked(&self, id: &VoteId) -> bool {
        lock(&self.book).subscriptions.contains_key(id)
    }

    /// Merge an authoritative read of a vote.
    ///
    /// A first read inserts the record as is. Later reads go through the
    /// same precedence table as pushed events, so a refresh can neither
    /// reopen a closed vote nor erase the local user's participation.
    pub fn ingest_snapshot(&self, record: VoteRecord) {
        let mut book = lock(&self.book);
        let id = record.id.clone();

        if book.records.contains_key(&id) {
            book.merge(&id, &[VoteUpdateEvent::from(record)], &self.updates);
        } else {
            debug!(vote_id = %id.short(), status = ?record.status, "New vote record");
            book.records.insert(id, record.clone());
            let _ = self.updates.send(record);
        }
    }

    /// Merge an event immediately, bypassing debounce. For changes caused
    /// by the local user, such as a cast ballot.
    pub fn apply_local(&self, event: VoteUpdateEvent) -> Result<(), SyncError> {
        let mut book = lock(&self.book);
        if !book.merge(&event.id, std::slice::from_ref(&event), &self.updates) {
            return Err(SyncError::UnknownVote(event.id));
        }
        Ok(())
    }

    /// Start a live subscription for `id`. Returns `false` if one already
    /// exists.
    pub fn track(&self, id: VoteId) -> Result<bool, SyncError> {
        let mut book = lock(&self.book);
        if book.subscriptions.contains_key(&id) {
            return Ok(false);
        }
        if book.subscriptions.len() >= self.config.max_tracked {
            return Err(SyncError::WorkingSetFull {
                max: self.config.max_tracked,
            });
        }

        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let actor = VoteActor {
            id: id.clone(),
            token,
            events: events_rx,
            book: Arc::clone(&self.book),
            updates: self.updates.clone(),
            debounce: self.config.debounce,
            max_wait: self.config.max_wait,
        };
        let task = tokio::spawn(actor.run());

        info!(vote_id = %id.short(), tracked = book.subscriptions.len() + 1, "Tracking vote");
        book.subscriptions.insert(
            id,
            Subscription {
                token,
                events: events_tx,
                task,
            },
        );
        Ok(true)
    }

    /// Stop the live subscription for `id`.
    ///
    /// Synchronous: once this returns, no merge or publish for `id` happens
    /// from pushed events, including any still waiting in the debounce
    /// window. The record itself is kept.
    pub fn untrack(&self, id: &VoteId) -> bool {
        let removed = lock(&self.book).subscriptions.remove(id);
        match removed {
            Some(subscription) => {
                subscription.task.abort();
                info!(vote_id = %id.short(), "Stopped tracking vote");
                true
            }
            None => false,
        }
    }

    /// Route a pushed event to its vote's subscription. Events for votes
    /// outside the working set are ignored.
    pub fn dispatch(&self, event: VoteUpdateEvent) -> bool {
        dispatch(&self.book, event)
    }

    /// Forward every event from `feed` into [`Self::dispatch`] until the feed
    /// closes.
    pub fn spawn_feed(&self, mut feed: mpsc::Receiver<VoteUpdateEvent>) -> JoinHandle<()> {
        let book = Arc::clone(&self.book);
        tokio::spawn(async move {
            while let Some(event) = feed.recv().await {
                dispatch(&book, event);
            }
            debug!("Vote event feed closed");
        })
    }

    /// Track exactly the votes [`select_working_set`] picks from the current
    /// records.
    pub fn sync_working_set(&self) -> WorkingSetChange {
        let wanted: HashSet<VoteId> = {
            let book = lock(&self.book);
            select_working_set(book.records.values(), self.config.max_tracked)
                .into_iter()
                .collect()
        };

        let mut change = WorkingSetChange::default();
        for id in self.tracked() {
            if !wanted.contains(&id) && self.untrack(&id) {
                change.untracked.push(id);
            }
        }
        for id in wanted {
            if let Ok(true) = self.track(id.clone()) {
                change.tracked.push(id);
            }
        }
        change
    }
}

impl Default for VoteStatusReconciler {
    fn default() -> Self {
        Self::new(ReconcilerConfig::default())
    }
}

impl Drop for VoteStatusReconciler {
    fn drop(&mut self) {
        for (_, subscription) in lock(&self.book).subscriptions.drain() {
            subscription.task.abort();
        }
    }
}

fn dispatch(book: &Mutex<Book>, event: VoteUpdateEvent) -> bool {
    let book = lock(book);
    match book.subscriptions.get(&event.id) {
        Some(subscription) => subscription.events.send(event).is_ok(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use suivote_shared::VoteStatus;
    use tokio::sync::broadcast::error::TryRecvError;
    use tokio::time::sleep;

    fn record(id: &str, status: VoteStatus) -> VoteRecord {
        VoteRecord {
            id: VoteId::new(id),
            title: "Budget".into(),
            description: String::new(),
            status,
            total_votes: 0,
            polls_count: 1,
            start_timestamp: 0,
            end_timestamp: 10_000,
            token_requirement: None,
            token_amount: None,
            has_whitelist: false,
            is_whitelisted: None,
        }
    }

    fn event(id: &str) -> VoteUpdateEvent {
        VoteUpdateEvent::new(VoteId::new(id))
    }

    fn reconciler() -> VoteStatusReconciler {
        VoteStatusReconciler::new(ReconcilerConfig {
            max_tracked: 2,
            debounce: Duration::from_millis(500),
            max_wait: Duration::from_secs(2),
        })
    }

    // Receiver is created after the insert, so it only sees later merges
    fn seeded(r: &VoteStatusReconciler, id: &str, status: VoteStatus) -> broadcast::Receiver<VoteRecord> {
        r.ingest_snapshot(record(id, status));
        r.track(VoteId::new(id)).unwrap();
        r.subscribe_updates()
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_publishes_once() {
        let r = reconciler();
        let mut updates = seeded(&r, "0x1", VoteStatus::Pending);

        for total in 1..=5 {
            let mut e = event("0x1").with_status(VoteStatus::Active).with_total_votes(total);
            e.title = Some(format!("Budget v{total}"));
            assert!(r.dispatch(e));
            sleep(Duration::from_millis(100)).await;
        }

        let published = updates.recv().await.unwrap();
        assert_eq!(published.total_votes, 5);
        assert_eq!(published.title, "Budget v5");
        assert_eq!(published.status, VoteStatus::Pending);

        sleep(Duration::from_secs(5)).await;
        assert!(matches!(updates.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_merge_after_untrack() {
        let r = reconciler();
        let mut updates = seeded(&r, "0x1", VoteStatus::Active);

        r.dispatch(event("0x1").with_total_votes(9));
        assert!(r.untrack(&VoteId::new("0x1")));

        sleep(Duration::from_secs(3)).await;
        assert!(matches!(updates.try_recv(), Err(TryRecvError::Empty)));
        assert_eq!(r.get(&VoteId::new("0x1")).unwrap().total_votes, 0);
        assert!(!r.dispatch(event("0x1").with_total_votes(10)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_precedence_sequence() {
        let r = reconciler();
        let _updates = seeded(&r, "0x1", VoteStatus::Pending);
        let id = VoteId::new("0x1");

        let steps = [
            (VoteStatus::Active, VoteStatus::Pending),
            (VoteStatus::Voted, VoteStatus::Voted),
            (VoteStatus::Active, VoteStatus::Voted),
            (VoteStatus::Closed, VoteStatus::Closed),
            (VoteStatus::Active, VoteStatus::Closed),
            (VoteStatus::Voted, VoteStatus::Closed),
        ];
        for (incoming, expected) in steps {
            r.dispatch(event("0x1").with_status(incoming));
            sleep(Duration::from_secs(1)).await;
            assert_eq!(r.get(&id).unwrap().status, expected, "after {incoming:?}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_continuous_stream_flushes_at_max_wait() {
        let r = reconciler();
        let mut updates = seeded(&r, "0x1", VoteStatus::Active);

        for total in 1..=10 {
            r.dispatch(event("0x1").with_total_votes(total));
            sleep(Duration::from_millis(300)).await;
        }

        // 3s of events 300ms apart never goes quiet, max_wait still forces a flush
        let first = updates.try_recv().unwrap();
        assert!(first.total_votes < 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_votes_are_independent() {
        let r = reconciler();
        let mut updates = seeded(&r, "0x1", VoteStatus::Active);
        r.ingest_snapshot(record("0x2", VoteStatus::Active));
        r.track(VoteId::new("0x2")).unwrap();
        let _ = updates.try_recv();

        r.dispatch(event("0x1").with_total_votes(1));
        r.dispatch(event("0x2").with_total_votes(2));

        let mut seen = vec![updates.recv().await.unwrap(), updates.recv().await.unwrap()];
        seen.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(seen[0].total_votes, 1);
        assert_eq!(seen[1].total_votes, 2);
    }

    #[tokio::test]
    async fn test_working_set_cap() {
        let r = reconciler();
        assert_eq!(r.track(VoteId::new("0x1")), Ok(true));
        assert_eq!(r.track(VoteId::new("0x1")), Ok(false));
        assert_eq!(r.track(VoteId::new("0x2")), Ok(true));
        assert_eq!(
            r.track(VoteId::new("0x3")),
            Err(SyncError::WorkingSetFull { max: 2 })
        );
    }

    #[tokio::test]
    async fn test_snapshot_cannot_reopen() {
        let r = reconciler();
        let mut updates = r.subscribe_updates();
        r.ingest_snapshot(record("0x1", VoteStatus::Voted));
        assert_eq!(updates.recv().await.unwrap().status, VoteStatus::Voted);

        let mut refreshed = record("0x1", VoteStatus::Active);
        refreshed.total_votes = 4;
        r.ingest_snapshot(refreshed);

        let merged = updates.recv().await.unwrap();
        assert_eq!(merged.status, VoteStatus::Voted);
        assert_eq!(merged.total_votes, 4);
    }

    #[tokio::test]
    async fn test_apply_local() {
        let r = reconciler();
        assert_eq!(
            r.apply_local(event("0x9").with_status(VoteStatus::Voted)),
            Err(SyncError::UnknownVote(VoteId::new("0x9")))
        );

        r.ingest_snapshot(record("0x9", VoteStatus::Active));
        r.apply_local(event("0x9").with_status(VoteStatus::Voted)).unwrap();
        assert_eq!(r.get(&VoteId::new("0x9")).unwrap().status, VoteStatus::Voted);
    }

    #[tokio::test]
    async fn test_sync_working_set() {
        let r = reconciler();
        let mut ending_soon = record("0x1", VoteStatus::Active);
        ending_soon.end_timestamp = 100;
        r.ingest_snapshot(ending_soon);
        r.ingest_snapshot(record("0x2", VoteStatus::Pending));
        r.ingest_snapshot(record("0x3", VoteStatus::Active));
        r.ingest_snapshot(record("0x4", VoteStatus::Closed));
        r.track(VoteId::new("0x4")).unwrap();

        let change = r.sync_working_set();

        assert_eq!(change.untracked, vec![VoteId::new("0x4")]);
        let mut tracked = r.tracked();
        tracked.sort();
        assert_eq!(tracked, vec![VoteId::new("0x1"), VoteId::new("0x2")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_feed_task_dispatches() {
        let r = reconciler();
        let mut updates = seeded(&r, "0x1", VoteStatus::Active);
        let (tx, rx) = mpsc::channel(8);
        let feed = r.spawn_feed(rx);

        tx.send(event("0x1").with_total_votes(3)).await.unwrap();
        tx.send(event("0x7").with_total_votes(1)).await.unwrap();
        drop(tx);

        assert_eq!(updates.recv().await.unwrap().total_votes, 3);
        feed.await.unwrap();
    }
}
