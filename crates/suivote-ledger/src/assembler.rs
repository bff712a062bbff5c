//! Vote creation: media resolution, argument resolution, and one atomic
//! `create_vote` call.
//!
//! Every step is a precondition for the next. Validation and media
//! failures abort before anything is built, so an aborted attempt never
//! reaches the ledger.

use serde::Serialize;
use tracing::{debug, info, warn};

use suivote_media::{rewrite_polls, BlobUpload, MediaUploadOrchestrator, ProgressSender, ResolvedMedia};
use suivote_shared::constants::{
    CLOCK_OBJECT_ID, CREATE_VOTE_FUNCTION, NATIVE_COIN_DECIMALS, VOTE_STRUCT, VOTING_MODULE,
};
use suivote_shared::types::canonical_object_id;
use suivote_shared::units::{to_base_units, weights_to_fixed};
use suivote_shared::whitelist::{validate_whitelist, weight_total_deviation};
use suivote_shared::{normalize, now_millis, ResolvedPoll, VoteCreationParams, VoteId, WeightWarning};

use crate::error::{AssemblyError, SubmissionError};
use crate::executor::{ExecutionStatus, ObjectChange, TransactionExecutor};
use crate::transaction::{CallArg, ExecutableTransaction, MoveCall};

// Percent points of slack before a whitelist total is reported as off
const WEIGHT_DEVIATION_TOLERANCE: f64 = 0.01;

/// Fully resolved arguments of `create_vote`, before flattening into
/// positional call arguments.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVoteArgs {
    pub title: String,
    pub description: String,
    pub start_timestamp: u64,
    pub end_timestamp: u64,
    /// Empty when the vote is not token gated.
    pub required_token_type: String,
    pub required_amount: u64,
    pub payment_amount: u64,
    /// Option order here is the index contract voters will use.
    pub polls: Vec<ResolvedPoll>,
    pub is_weighted: bool,
    pub weight_per_vote: u64,
    pub whitelist_addresses: Vec<String>,
    /// Parallel to `whitelist_addresses`; empty means uniform weight.
    pub whitelist_weights: Vec<u64>,
}

impl CreateVoteArgs {
    pub fn to_move_call(&self, package_id: &str) -> MoveCall {
        // Per-poll columns, all indexed by poll position
        let polls = &self.polls;
        let option_texts: Vec<Vec<String>> = polls
            .iter()
            .map(|p| p.options.iter().map(|o| o.text.clone()).collect())
            .collect();
        let option_media: Vec<Vec<String>> = polls
            .iter()
            .map(|p| {
                p.options
                    .iter()
                    .map(|o| o.media_reference.clone().unwrap_or_default())
                    .collect()
            })
            .collect();

        MoveCall {
            package: package_id.to_string(),
            module: VOTING_MODULE.to_string(),
            function: CREATE_VOTE_FUNCTION.to_string(),
            type_arguments: Vec::new(),
            arguments: vec![
                CallArg::String(self.title.clone()),
                CallArg::String(self.description.clone()),
                CallArg::U64(self.start_timestamp),
                CallArg::U64(self.end_timestamp),
                CallArg::String(self.required_token_type.clone()),
                CallArg::U64(self.required_amount),
                CallArg::U64(self.payment_amount),
                CallArg::StringVec(polls.iter().map(|p| p.title.clone()).collect()),
                CallArg::StringVec(polls.iter().map(|p| p.description.clone()).collect()),
                CallArg::BoolVec(polls.iter().map(|p| p.is_multi_select).collect()),
                CallArg::U64Vec(polls.iter().map(|p| p.max_selections as u64).collect()),
                CallArg::BoolVec(polls.iter().map(|p| p.is_required).collect()),
                CallArg::StringMatrix(option_texts),
                CallArg::StringMatrix(option_media),
                CallArg::Bool(self.is_weighted),
                CallArg::U64(self.weight_per_vote),
                CallArg::AddressVec(self.whitelist_addresses.clone()),
                CallArg::U64Vec(self.whitelist_weights.clone()),
                CallArg::Object(CLOCK_OBJECT_ID.to_string()),
            ],
        }
    }
}

/// A built, not yet submitted, vote creation.
#[derive(Debug, Clone)]
pub struct AssembledVote {
    pub transaction: ExecutableTransaction,
    pub args: CreateVoteArgs,
    pub resolved_media: ResolvedMedia,
    pub weight_warnings: Vec<WeightWarning>,
    /// Percent points the whitelist weights sum away from 100, when
    /// weighting is on and the total is off.
    pub weight_deviation: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct VoteCreated {
    pub vote_id: VoteId,
    pub digest: String,
    pub resolved_media: ResolvedMedia,
    pub weight_warnings: Vec<WeightWarning>,
}

pub struct TransactionAssembler<U, E> {
    media: MediaUploadOrchestrator<U>,
    executor: E,
    package_id: String,
}

impl<U: BlobUpload, E: TransactionExecutor> TransactionAssembler<U, E> {
    pub fn new(media: MediaUploadOrchestrator<U>, executor: E, package_id: impl Into<String>) -> Self {
        Self {
            media,
            executor,
            package_id: package_id.into(),
        }
    }

    pub fn media(&self) -> &MediaUploadOrchestrator<U> {
        &self.media
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn package_id(&self) -> &str {
        &self.package_id
    }

    /// Validate, upload media, and build the creation transaction.
    pub async fn build(
        &self,
        params: &VoteCreationParams,
        progress: Option<&ProgressSender>,
    ) -> Result<AssembledVote, AssemblyError> {
        params.validate(now_millis())?;

        let resolved_media = self.media.resolve_all(&params.polls, &params.media, progress).await?;
        let polls = rewrite_polls(&params.polls, &resolved_media)?;

        let gating = &params.token_gating;
        let required_amount = to_base_units(gating.required_amount.unwrap_or(0.0), gating.token_decimals)?;
        let weight_per_vote = if gating.is_weighted {
            to_base_units(gating.weight_per_vote.unwrap_or(0.0), gating.token_decimals)?
        } else {
            0
        };
        let payment_amount = to_base_units(params.payment.amount.unwrap_or(0.0), NATIVE_COIN_DECIMALS)?;

        let mut whitelist_addresses = Vec::new();
        let mut whitelist_weights = Vec::new();
        let mut weight_warnings = Vec::new();
        let mut weight_deviation = None;

        let whitelist = &params.whitelist;
        if whitelist.enabled {
            let entries = validate_whitelist(&whitelist.entries)?;
            let normalized = normalize(&entries, whitelist.weighting_enabled);
            whitelist_weights = weights_to_fixed(&normalized.weights)?;
            weight_warnings = normalized.warnings;

            if whitelist.weighting_enabled {
                let deviation = weight_total_deviation(&entries);
                if deviation.abs() > WEIGHT_DEVIATION_TOLERANCE {
                    warn!(deviation, "Whitelist weights do not total 100%");
                    weight_deviation = Some(deviation);
                }
            }
            whitelist_addresses = entries.into_iter().map(|e| e.address).collect();
        }

        let args = CreateVoteArgs {
            title: params.title.trim().to_string(),
            description: params.description.clone(),
            start_timestamp: params.start_timestamp,
            end_timestamp: params.end_timestamp,
            required_token_type: gating.required_token_type.clone().unwrap_or_default(),
            required_amount,
            payment_amount,
            polls,
            is_weighted: gating.is_weighted,
            weight_per_vote,
            whitelist_addresses,
            whitelist_weights,
        };

        let call = args.to_move_call(&self.package_id);
        debug!(
            call = %call.target(),
            polls = args.polls.len(),
            whitelist = args.whitelist_addresses.len(),
            media = resolved_media.len(),
            "Built vote creation transaction"
        );

        Ok(AssembledVote {
            transaction: ExecutableTransaction::single_call(call),
            args,
            resolved_media,
            weight_warnings,
            weight_deviation,
        })
    }

    /// Submit a built transaction and locate the created vote.
    pub async fn execute(&self, assembled: AssembledVote) -> Result<VoteCreated, AssemblyError> {
        let response = self
            .executor
            .execute(&assembled.transaction)
            .await
            .map_err(SubmissionError::from_message)?;

        if let ExecutionStatus::Failure { error } = response.status {
            return Err(SubmissionError::from_message(error).into());
        }

        let Some(vote_id) = find_created_vote(&self.package_id, &response.object_changes) else {
            warn!(digest = %response.digest, "Vote object missing from transaction effects");
            return Err(AssemblyError::AmbiguousSuccess {
                digest: response.digest,
            });
        };

        info!(vote_id = %vote_id, digest = %response.digest, "Vote created");

        Ok(VoteCreated {
            vote_id,
            digest: response.digest,
            resolved_media: assembled.resolved_media,
            weight_warnings: assembled.weight_warnings,
        })
    }

    pub async fn create(
        &self,
        params: &VoteCreationParams,
        progress: Option<&ProgressSender>,
    ) -> Result<VoteCreated, AssemblyError> {
        let assembled = self.build(params, progress).await?;
        self.execute(assembled).await
    }
}

/// Id of the created object whose type is `{package}::voting::Vote`.
/// Position in the change list carries no meaning.
pub fn find_created_vote(package_id: &str, changes: &[ObjectChange]) -> Option<VoteId> {
    changes
        .iter()
        .filter_map(ObjectChange::created)
        .find(|(_, object_type)| is_vote_type(package_id, object_type))
        .map(|(object_id, _)| VoteId::new(object_id))
}

fn is_vote_type(package_id: &str, object_type: &str) -> bool {
    let base = object_type.split('<').next().unwrap_or_default();
    let mut parts = base.split("::");
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(package), Some(module), Some(name), None) => {
            module == VOTING_MODULE
                && name == VOTE_STRUCT
                && canonical_object_id(package) == canonical_object_id(package_id)
        }
        _ => false,
    }
}
