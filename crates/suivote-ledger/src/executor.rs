use std::future::Future;

use serde::Deserialize;

use crate::transaction::ExecutableTransaction;

/// Signs and submits transactions on behalf of the connected account.
///
/// Errors are the wallet's raw message; classification happens in
/// [`crate::error::SubmissionError::from_message`].
pub trait TransactionExecutor: Send + Sync {
    fn execute(&self, transaction: &ExecutableTransaction)
        -> impl Future<Output = Result<ExecutionResponse, String>> + Send;
}

/// What the ledger reports back for an executed transaction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResponse {
    pub digest: String,
    #[serde(default)]
    pub status: ExecutionStatus,
    #[serde(default)]
    pub object_changes: Vec<ObjectChange>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ExecutionStatus {
    #[default]
    Success,
    Failure {
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ObjectChange {
    #[serde(rename_all = "camelCase")]
    Created { object_id: String, object_type: String },
    #[serde(rename_all = "camelCase")]
    Mutated { object_id: String, object_type: String },
    #[serde(other)]
    Other,
}

impl ObjectChange {
    /// `(object_id, object_type)` for created objects only.
    pub fn created(&self) -> Option<(&str, &str)> {
        match self {
            ObjectChange::Created {
                object_id,
                object_type,
            } => Some((object_id.as_str(), object_type.as_str())),
            _ => None,
        }
    }
}
