//! # suivote-sync
//!
//! Keeps vote records current: merges pushed update events and
//! authoritative re-reads with the status precedence table, one debounced
//! subscription task per tracked vote.

mod actor;
mod book;
pub mod error;
pub mod reconciler;
pub mod working_set;

pub use error::SyncError;
pub use reconciler::{ReconcilerConfig, VoteStatusReconciler, WorkingSetChange};
pub use working_set::select_working_set;
