//! Conversion between client stable option ids and the 1-based positional
//! indices used by the ledger program.
//!
//! Both directions are total: entries that cannot be mapped are dropped
//! and reported as a [`MappingFault`], never replaced by a guess.

use thiserror::Error;
use tracing::warn;

use crate::poll::{OptionDraft, PollDraft};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingFault {
    #[error("Option id {0} is not part of this poll")]
    UnknownOptionId(String),

    #[error("Option index {index} outside 1..={len}")]
    IndexOutOfRange { index: u64, len: usize },
}

/// Mapping result: the mapped values in input order plus one fault per
/// dropped input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapped<T> {
    pub values: Vec<T>,
    pub faults: Vec<MappingFault>,
}

impl<T> Mapped<T> {
    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }
}

/// Anything with an ordered list of stable option ids.
pub trait OptionList {
    fn option_ids(&self) -> Vec<&str>;
}

impl OptionList for [OptionDraft] {
    fn option_ids(&self) -> Vec<&str> {
        self.iter().map(|o| o.stable_id.as_str()).collect()
    }
}

impl OptionList for PollDraft {
    fn option_ids(&self) -> Vec<&str> {
        self.options.as_slice().option_ids()
    }
}

/// Map selected stable ids to positional indices (array position + 1).
pub fn to_indices<P, S>(poll: &P, selected: &[S]) -> Mapped<u64>
where
    P: OptionList + ?Sized,
    S: AsRef<str>,
{
    let ids = poll.option_ids();
    let mut values = Vec::with_capacity(selected.len());
    let mut faults = Vec::new();

    for stable_id in selected {
        let stable_id = stable_id.as_ref();
        match ids.iter().position(|id| *id == stable_id) {
            Some(pos) => values.push(pos as u64 + 1),
            None => {
                warn!(stable_id, "Selected option not found in poll, dropping");
                faults.push(MappingFault::UnknownOptionId(stable_id.to_string()));
            }
        }
    }

    Mapped { values, faults }
}

/// Map positional indices back to stable ids.
pub fn from_indices<P>(poll: &P, indices: &[u64]) -> Mapped<String>
where
    P: OptionList + ?Sized,
{
    let ids = poll.option_ids();
    let mut values = Vec::with_capacity(indices.len());
    let mut faults = Vec::new();

    for &index in indices {
        let slot = usize::try_from(index)
            .ok()
            .filter(|i| *i >= 1)
            .and_then(|i| ids.get(i - 1));
        match slot {
            Some(id) => values.push((*id).to_string()),
            None => {
                warn!(index, len = ids.len(), "Option index out of range, dropping");
                faults.push(MappingFault::IndexOutOfRange {
                    index,
                    len: ids.len(),
                });
            }
        }
    }

    Mapped { values, faults }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poll() -> PollDraft {
        let mut poll = PollDraft::new("Colour");
        for text in ["red", "green", "blue", "black"] {
            poll.add_option(OptionDraft::new(text));
        }
        poll
    }

    fn ids(poll: &PollDraft) -> Vec<String> {
        poll.options.iter().map(|o| o.stable_id.clone()).collect()
    }

    #[test]
    fn test_to_indices_is_one_based() {
        let poll = poll();
        let all = ids(&poll);
        let mapped = to_indices(&poll, &[all[2].clone(), all[0].clone()]);
        assert_eq!(mapped.values, vec![3, 1]);
        assert!(mapped.is_clean());
    }

    #[test]
    fn test_round_trip_preserves_order() {
        let poll = poll();
        let all = ids(&poll);
        let subsets: Vec<Vec<String>> = vec![
            vec![],
            vec![all[3].clone()],
            vec![all[1].clone(), all[3].clone(), all[0].clone()],
            all.iter().rev().cloned().collect(),
        ];

        for subset in subsets {
            let indices = to_indices(&poll, &subset);
            let back = from_indices(&poll, &indices.values);
            assert_eq!(back.values, subset);
            assert!(back.is_clean());
        }
    }

    #[test]
    fn test_unknown_ids_dropped_and_reported() {
        let poll = poll();
        let all = ids(&poll);
        let selected = vec![all[1].clone(), "ghost".to_string()];

        let mapped = to_indices(&poll, &selected);
        assert_eq!(mapped.values, vec![2]);
        assert_eq!(mapped.faults, vec![MappingFault::UnknownOptionId("ghost".into())]);

        // Inverse only recovers the valid subset
        let back = from_indices(&poll, &mapped.values);
        assert_eq!(back.values, vec![all[1].clone()]);
    }

    #[test]
    fn test_out_of_range_indices_excluded() {
        let poll = poll();
        let all = ids(&poll);

        let mapped = from_indices(&poll, &[0, 2, 5, 4, u64::MAX]);
        assert_eq!(mapped.values, vec![all[1].clone(), all[3].clone()]);
        assert_eq!(mapped.faults.len(), 3);
        assert!(mapped
            .faults
            .iter()
            .all(|f| matches!(f, MappingFault::IndexOutOfRange { len: 4, .. })));
    }

    #[test]
    fn test_indices_follow_reordering() {
        let mut poll = poll();
        let blue = poll.options[2].stable_id.clone();
        poll.move_option(&blue, 0);
        assert_eq!(to_indices(&poll, &[blue]).values, vec![1]);
    }
}
