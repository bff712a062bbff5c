//! Facade used by presentation code: vote creation, ballots, reads, and
//! live updates behind one handle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use suivote_ledger::{
    build_cast_vote, AssemblyError, ExecutionStatus, PollSelection, RpcClient, SubmissionError, TransactionAssembler,
    TransactionExecutor, VoteCreated,
};
use suivote_media::{blob_url, referenced_assets, BlobUpload, BlobUploader, MediaUploadOrchestrator};
use suivote_shared::constants::NATIVE_COIN_DECIMALS;
use suivote_shared::units::to_base_units;
use suivote_shared::{MappingFault, PollRecord, VoteCreationParams, VoteId, VoteRecord, VoteStatus, VoteUpdateEvent};
use suivote_sync::{SyncError, VoteStatusReconciler};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::events::{
    emit_event, CreationProgress, EventSender, EVENT_CREATION_PROGRESS, EVENT_MEDIA_PROGRESS, EVENT_VOTE_UPDATED,
};

/// Result of a submitted ballot.
#[derive(Debug, Clone)]
pub struct CastReceipt {
    pub digest: String,
    /// Selections that were dropped because they matched no option.
    pub faults: Vec<(usize, MappingFault)>,
}

/// Background tasks behind live updates. Dropping the handle stops them.
pub struct LiveUpdates {
    tasks: Vec<JoinHandle<()>>,
    live: Arc<AtomicBool>,
}

impl LiveUpdates {
    /// Same as dropping the handle.
    pub fn stop(self) {}
}

impl Drop for LiveUpdates {
    fn drop(&mut self) {
        self.live.store(false, Ordering::SeqCst);
        for task in &self.tasks {
            task.abort();
        }
    }
}

pub struct VotingClient<U, E> {
    config: ClientConfig,
    assembler: TransactionAssembler<U, E>,
    rpc: Arc<RpcClient>,
    reconciler: Arc<VoteStatusReconciler>,
    // Held for the whole build/execute cycle of one creation attempt
    creation: Mutex<()>,
    events: Option<EventSender>,
    // Set while a `LiveUpdates` handle is alive
    live: Arc<AtomicBool>,
}

impl<E: TransactionExecutor> VotingClient<BlobUploader, E> {
    /// Wire the HTTP blob store, JSON-RPC reader and reconciler from
    /// `config`; transactions are signed by `executor`.
    pub fn from_config(config: ClientConfig, executor: E) -> Self {
        let uploader = BlobUploader::new(config.publisher_url.clone(), config.storage_epochs);
        let media = MediaUploadOrchestrator::new(uploader, config.media_policy()).with_attempts(config.upload_attempts);
        let assembler = TransactionAssembler::new(media, executor, config.package_id.clone());

        let mut rpc = RpcClient::new(config.rpc_url.clone(), config.package_id.clone());
        if let Some(ref address) = config.viewer_address {
            rpc = rpc.with_viewer(address.clone());
        }

        Self::new(config, assembler, rpc)
    }
}

impl<U: BlobUpload, E: TransactionExecutor> VotingClient<U, E> {
    pub fn new(config: ClientConfig, assembler: TransactionAssembler<U, E>, rpc: RpcClient) -> Self {
        let reconciler = Arc::new(VoteStatusReconciler::new(config.reconciler_config()));
        Self {
            config,
            assembler,
            rpc: Arc::new(rpc),
            reconciler,
            creation: Mutex::new(()),
            events: None,
            live: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Send progress and vote updates to `tx`.
    pub fn with_events(mut self, tx: EventSender) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn reconciler(&self) -> &Arc<VoteStatusReconciler> {
        &self.reconciler
    }

    pub fn blob_url(&self, blob_reference: &str) -> String {
        blob_url(&self.config.aggregator_url, blob_reference)
    }

    fn emit(&self, progress: CreationProgress) {
        if let Some(ref tx) = self.events {
            emit_event(tx, EVENT_CREATION_PROGRESS, progress);
        }
    }

    /// Run one vote-creation attempt.
    ///
    /// Only one attempt runs per client; a concurrent call fails with
    /// [`ClientError::AttemptInProgress`] instead of queueing.
    pub async fn create_vote(&self, params: &VoteCreationParams) -> Result<VoteCreated, ClientError> {
        let _attempt = self.creation.try_lock().map_err(|_| ClientError::AttemptInProgress)?;

        let result = self.run_creation(params).await;
        match result {
            Ok(ref created) => self.emit(CreationProgress::Created {
                vote_id: created.vote_id.clone(),
                digest: created.digest.clone(),
            }),
            Err(ref e) => {
                warn!(error = %e, retry_safe = e.is_retry_safe(), "Vote creation failed");
                self.emit(CreationProgress::Failed {
                    message: e.to_string(),
                    retry_safe: e.is_retry_safe(),
                });
            }
        }
        result.map_err(ClientError::from)
    }

    async fn run_creation(&self, params: &VoteCreationParams) -> Result<VoteCreated, AssemblyError> {
        self.emit(CreationProgress::UploadingMedia {
            assets: referenced_assets(&params.polls).len(),
        });

        let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();
        let forwarder = self.events.clone().map(|events| {
            tokio::spawn(async move {
                while let Some(progress) = progress_rx.recv().await {
                    emit_event(&events, EVENT_MEDIA_PROGRESS, progress);
                }
            })
        });

        let built = self.assembler.build(params, Some(&progress_tx)).await;
        drop(progress_tx);
        if let Some(forwarder) = forwarder {
            // Drains whatever is left, then ends with the closed channel
            let _ = forwarder.await;
        }
        let assembled = built?;

        if let Some(deviation) = assembled.weight_deviation {
            info!(deviation, "Submitting with whitelist weights that do not total 100%");
        }

        self.emit(CreationProgress::Submitting);
        self.assembler.execute(assembled).await
    }

    /// Cast a ballot on a vote whose polls were loaded as `polls`.
    ///
    /// Selections refer to the stable ids in `polls`. On success the vote
    /// is marked as voted locally right away.
    pub async fn cast_vote(
        &self,
        vote_id: &VoteId,
        polls: &[PollRecord],
        selections: &[PollSelection],
        payment: Option<f64>,
    ) -> Result<CastReceipt, ClientError> {
        let payment_amount = to_base_units(payment.unwrap_or(0.0), NATIVE_COIN_DECIMALS)?;
        let ballot = build_cast_vote(
            self.assembler.package_id(),
            vote_id,
            polls,
            selections,
            payment_amount,
        )?;

        let response = self
            .assembler
            .executor()
            .execute(&ballot.transaction)
            .await
            .map_err(SubmissionError::from_message)?;
        if let ExecutionStatus::Failure { error } = response.status {
            return Err(SubmissionError::from_message(error).into());
        }

        info!(vote_id = %vote_id.short(), digest = %response.digest, "Ballot cast");

        match self
            .reconciler
            .apply_local(VoteUpdateEvent::new(vote_id.clone()).with_status(VoteStatus::Voted))
        {
            Ok(()) | Err(SyncError::UnknownVote(_)) => {}
            Err(e) => warn!(error = %e, "Could not mark vote as voted"),
        }

        Ok(CastReceipt {
            digest: response.digest,
            faults: ballot.faults,
        })
    }

    /// Read a vote and its polls, merging the record into local state.
    /// The returned record is the merged one.
    pub async fn load_vote(&self, id: &VoteId) -> Result<(VoteRecord, Vec<PollRecord>), ClientError> {
        let (record, polls) = self.rpc.get_vote_detail(id).await?;
        self.reconciler.ingest_snapshot(record.clone());
        self.resync_if_live();
        let merged = self.reconciler.get(id).unwrap_or(record);
        Ok((merged, polls))
    }

    /// Re-read several votes concurrently. Failed reads are logged and
    /// skipped; returns how many were refreshed.
    pub async fn refresh_votes(&self, ids: &[VoteId]) -> usize {
        let reads = join_all(ids.iter().map(|id| self.rpc.get_vote(id))).await;

        let mut refreshed = 0;
        for (id, read) in ids.iter().zip(reads) {
            match read {
                Ok(record) => {
                    self.reconciler.ingest_snapshot(record);
                    refreshed += 1;
                }
                Err(e) => warn!(vote_id = %id.short(), error = %e, "Vote refresh failed"),
            }
        }
        if refreshed > 0 {
            self.resync_if_live();
        }
        refreshed
    }

    fn resync_if_live(&self) {
        if self.live.load(Ordering::SeqCst) {
            log_working_set(&self.reconciler);
        }
    }

    /// Start polling ledger events into the reconciler and, when an event
    /// sender is configured, forward every published record.
    ///
    /// While the returned handle lives, votes loaded or refreshed through
    /// this client join the working set, and votes that leave the
    /// pending/active states lose their subscription.
    pub fn start_live_updates(&self) -> LiveUpdates {
        self.live.store(true, Ordering::SeqCst);
        log_working_set(&self.reconciler);

        let (feed, poller) = Arc::clone(&self.rpc).spawn_event_poller(self.config.event_poll_interval());
        let mut tasks = vec![poller, self.reconciler.spawn_feed(feed)];

        let reconciler = Arc::clone(&self.reconciler);
        let mut updates = self.reconciler.subscribe_updates();
        tasks.push(tokio::spawn(async move {
            loop {
                match updates.recv().await {
                    Ok(record) => {
                        let settled = !matches!(record.status, VoteStatus::Pending | VoteStatus::Active);
                        if settled && reconciler.is_tracked(&record.id) {
                            log_working_set(&reconciler);
                        }
                    }
                    Err(RecvError::Lagged(_)) => log_working_set(&reconciler),
                    Err(RecvError::Closed) => break,
                }
            }
        }));

        if let Some(ref events) = self.events {
            let events = events.clone();
            let mut updates = self.reconciler.subscribe_updates();
            tasks.push(tokio::spawn(async move {
                loop {
                    match updates.recv().await {
                        Ok(record) => emit_event(&events, EVENT_VOTE_UPDATED, record),
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "Vote update listener lagged");
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            }));
        }

        info!("Live vote updates started");
        LiveUpdates {
            tasks,
            live: Arc::clone(&self.live),
        }
    }
}

fn log_working_set(reconciler: &VoteStatusReconciler) {
    let change = reconciler.sync_working_set();
    if !change.tracked.is_empty() || !change.untracked.is_empty() {
        debug!(
            tracked = change.tracked.len(),
            untracked = change.untracked.len(),
            "Working set synced"
        );
    }
}
