//! # suivote-ledger
//!
//! Transaction model and everything that talks to the ledger: vote
//! creation assembly, ballot assembly, submission error classification,
//! and the JSON-RPC read side (object reads and event polling).

pub mod assembler;
pub mod cast;
pub mod error;
pub mod executor;
pub mod rpc;
pub mod transaction;

pub use assembler::{find_created_vote, AssembledVote, CreateVoteArgs, TransactionAssembler, VoteCreated};
pub use cast::{build_cast_vote, CastBallot, CastError, CastVoteArgs, PollSelection};
pub use error::{AssemblyError, RpcError, SubmissionError, SubmissionErrorKind};
pub use executor::{ExecutionResponse, ExecutionStatus, ObjectChange, TransactionExecutor};
pub use rpc::{EventCursor, EventPage, RpcClient};
pub use transaction::{CallArg, Command, ExecutableTransaction, MoveCall};
