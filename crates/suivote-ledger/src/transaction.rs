//! Ledger-agnostic model of a programmable transaction.
//!
//! A wallet adapter turns an [`ExecutableTransaction`] into whatever its
//! signer expects. Commands run in order and either all take effect or
//! none do.

use serde::Serialize;

/// Pure argument passed to a Move call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum CallArg {
    /// Shared or owned object by id.
    Object(String),
    String(String),
    U64(u64),
    Bool(bool),
    Address(String),
    StringVec(Vec<String>),
    U64Vec(Vec<u64>),
    BoolVec(Vec<bool>),
    AddressVec(Vec<String>),
    StringMatrix(Vec<Vec<String>>),
    U64Matrix(Vec<Vec<u64>>),
    /// First output of an earlier command in the same transaction.
    Result(u16),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCall {
    pub package: String,
    pub module: String,
    pub function: String,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<CallArg>,
}

impl MoveCall {
    /// `package::module::function`
    pub fn target(&self) -> String {
        format!("{}::{}::{}", self.package, self.module, self.function)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Command {
    /// Split new coins off the gas coin, one per amount (base units).
    SplitGas { amounts: Vec<u64> },
    MoveCall(MoveCall),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutableTransaction {
    pub commands: Vec<Command>,
}

impl ExecutableTransaction {
    pub fn new(commands: Vec<Command>) -> Self {
        Self { commands }
    }

    pub fn single_call(call: MoveCall) -> Self {
        Self::new(vec![Command::MoveCall(call)])
    }

    pub fn move_calls(&self) -> impl Iterator<Item = &MoveCall> {
        self.commands.iter().filter_map(|c| match c {
            Command::MoveCall(call) => Some(call),
            Command::SplitGas { .. } => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_shape() {
        let call = MoveCall {
            package: "0xabc".into(),
            module: "voting".into(),
            function: "cast_vote".into(),
            type_arguments: vec![],
            arguments: vec![CallArg::U64(3), CallArg::Result(0)],
        };
        let tx = ExecutableTransaction::new(vec![
            Command::SplitGas { amounts: vec![10] },
            Command::MoveCall(call),
        ]);

        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["commands"][0]["command"], "splitGas");
        assert_eq!(json["commands"][1]["command"], "moveCall");
        assert_eq!(json["commands"][1]["arguments"][0]["kind"], "u64");
        assert_eq!(json["commands"][1]["arguments"][1]["value"], 0);
    }

    #[test]
    fn test_move_calls_skips_splits() {
        let tx = ExecutableTransaction::new(vec![Command::SplitGas { amounts: vec![1] }]);
        assert_eq!(tx.move_calls().count(), 0);
    }
}
