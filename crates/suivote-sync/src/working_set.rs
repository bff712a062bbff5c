use suivote_shared::{VoteId, VoteRecord, VoteStatus};

/// Votes that deserve a live subscription: pending or active ones, ending
/// soonest first, at most `max`.
pub fn select_working_set<'a>(records: impl IntoIterator<Item = &'a VoteRecord>, max: usize) -> Vec<VoteId> {
    let mut candidates: Vec<&VoteRecord> = records
        .into_iter()
        .filter(|r| matches!(r.status, VoteStatus::Pending | VoteStatus::Active))
        .collect();

    candidates.sort_by(|a, b| {
        a.end_timestamp
            .cmp(&b.end_timestamp)
            .then_with(|| a.id.cmp(&b.id))
    });

    candidates.into_iter().take(max).map(|r| r.id.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, status: VoteStatus, end: u64) -> VoteRecord {
        VoteRecord {
            id: VoteId::new(id),
            title: id.to_string(),
            description: String::new(),
            status,
            total_votes: 0,
            polls_count: 1,
            start_timestamp: 0,
            end_timestamp: end,
            token_requirement: None,
            token_amount: None,
            has_whitelist: false,
            is_whitelisted: None,
        }
    }

    #[test]
    fn test_picks_open_votes_ending_first() {
        let records = vec![
            record("0x1", VoteStatus::Active, 300),
            record("0x2", VoteStatus::Closed, 100),
            record("0x3", VoteStatus::Pending, 200),
            record("0x4", VoteStatus::Voted, 50),
            record("0x5", VoteStatus::Active, 100),
            record("0x6", VoteStatus::Upcoming, 10),
        ];

        let set = select_working_set(&records, 2);
        assert_eq!(set, vec![VoteId::new("0x5"), VoteId::new("0x3")]);
    }

    #[test]
    fn test_zero_capacity() {
        let records = vec![record("0x1", VoteStatus::Active, 1)];
        assert!(select_working_set(&records, 0).is_empty());
    }
}
