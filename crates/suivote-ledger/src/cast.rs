//! Ballot assembly: stable option ids in, one `cast_vote` call out.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use suivote_shared::constants::{CAST_VOTE_FUNCTION, CLOCK_OBJECT_ID, VOTING_MODULE};
use suivote_shared::{to_indices, MappingFault, PollRecord, VoteId};

use crate::transaction::{CallArg, Command, ExecutableTransaction, MoveCall};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CastError {
    #[error("Poll {index} does not exist (vote has {count} polls)")]
    UnknownPoll { index: usize, count: usize },

    #[error("Poll {0} answered more than once")]
    DuplicatePoll(usize),

    #[error("Poll {poll} is required but has no valid selection")]
    MissingRequired { poll: usize },

    #[error("Poll {poll} allows {max} selections, got {count}")]
    TooManySelections { poll: usize, max: u32, count: usize },

    #[error("No poll has a valid selection")]
    NothingSelected,
}

/// Selected options for one poll, by stable id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSelection {
    /// Position of the poll within the vote, 0-based.
    pub poll_index: usize,
    pub selected: Vec<String>,
}

impl PollSelection {
    pub fn new(poll_index: usize, selected: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            poll_index,
            selected: selected.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CastVoteArgs {
    pub vote_id: VoteId,
    /// 1-based poll positions.
    pub poll_indices: Vec<u64>,
    /// 1-based option positions, one row per entry of `poll_indices`.
    pub option_indices: Vec<Vec<u64>>,
    /// Base units split off the gas coin; may be zero.
    pub payment_amount: u64,
}

#[derive(Debug, Clone)]
pub struct CastBallot {
    pub transaction: ExecutableTransaction,
    pub args: CastVoteArgs,
    /// Dropped selections, tagged with their 0-based poll position.
    pub faults: Vec<(usize, MappingFault)>,
}

pub fn build_cast_vote(
    package_id: &str,
    vote_id: &VoteId,
    polls: &[PollRecord],
    selections: &[PollSelection],
    payment_amount: u64,
) -> Result<CastBallot, CastError> {
    let mut answered = vec![false; polls.len()];
    let mut poll_indices = Vec::new();
    let mut option_indices = Vec::new();
    let mut faults = Vec::new();

    for selection in selections {
        let poll = polls.get(selection.poll_index).ok_or(CastError::UnknownPoll {
            index: selection.poll_index,
            count: polls.len(),
        })?;
        if answered[selection.poll_index] {
            return Err(CastError::DuplicatePoll(selection.poll_index));
        }

        let mapped = to_indices(poll, &selection.selected);
        faults.extend(mapped.faults.into_iter().map(|f| (selection.poll_index, f)));

        let mut indices = mapped.values;
        let mut seen = Vec::with_capacity(indices.len());
        indices.retain(|i| {
            let fresh = !seen.contains(i);
            seen.push(*i);
            fresh
        });

        if indices.is_empty() {
            warn!(poll = selection.poll_index, "Selection maps to no option, skipping poll");
            continue;
        }

        let max = if poll.is_multi_select { poll.max_selections.max(1) } else { 1 };
        if indices.len() > max as usize {
            return Err(CastError::TooManySelections {
                poll: selection.poll_index,
                max,
                count: indices.len(),
            });
        }

        answered[selection.poll_index] = true;
        poll_indices.push(selection.poll_index as u64 + 1);
        option_indices.push(indices);
    }

    if let Some(poll) = polls.iter().zip(&answered).position(|(p, done)| p.is_required && !done) {
        return Err(CastError::MissingRequired { poll });
    }
    if poll_indices.is_empty() {
        return Err(CastError::NothingSelected);
    }

    let args = CastVoteArgs {
        vote_id: vote_id.clone(),
        poll_indices,
        option_indices,
        payment_amount,
    };

    let call = MoveCall {
        package: package_id.to_string(),
        module: VOTING_MODULE.to_string(),
        function: CAST_VOTE_FUNCTION.to_string(),
        type_arguments: Vec::new(),
        arguments: vec![
            CallArg::Object(vote_id.as_str().to_string()),
            CallArg::U64Vec(args.poll_indices.clone()),
            CallArg::U64Matrix(args.option_indices.clone()),
            CallArg::Result(0),
            CallArg::Object(CLOCK_OBJECT_ID.to_string()),
        ],
    };
    let transaction = ExecutableTransaction::new(vec![
        Command::SplitGas {
            amounts: vec![payment_amount],
        },
        Command::MoveCall(call),
    ]);

    debug!(vote_id = %vote_id.short(), polls = args.poll_indices.len(), faults = faults.len(), "Built cast_vote transaction");

    Ok(CastBallot {
        transaction,
        args,
        faults,
    })
}
