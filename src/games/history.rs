use crate::games::types::{DrawOutcome, HistoryRecord, StakeMap};
use std::collections::VecDeque;

/// Number of rounds kept by default
pub const DEFAULT_HISTORY_CAPACITY: usize = 5;

/// Most-recent-first ledger of settled rounds with a fixed capacity
#[derive(Debug, Clone)]
pub struct RoundHistory {
    records: VecDeque<HistoryRecord>,
    capacity: usize,
}

impl RoundHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Prepend a settled round, evicting the oldest past capacity
    pub fn record(&mut self, round: u64, outcome: DrawOutcome, stakes: StakeMap, profit: i64) {
        self.records.push_front(HistoryRecord {
            round,
            outcome,
            stakes,
            profit,
            settled_at: chrono::Utc::now(),
        });
        self.records.truncate(self.capacity);
    }

    /// Recorded rounds, newest first
    pub fn recent(&self) -> impl ExactSizeIterator<Item = &HistoryRecord> {
        self.records.iter()
    }

    pub fn latest(&self) -> Option<&HistoryRecord> {
        self.records.front()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for RoundHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
