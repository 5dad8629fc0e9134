//! Bounded ring buffer of recent retrieval queries, for local debugging of
//! "why didn't my memory come back" questions without a full tracing
//! backend. Not a substitute for the `tracing` spans — this is a cheap,
//! in-process supplement.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use cortex_core::scope::Scope;

const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct QueryLogEntry {
    pub scope: Scope,
    pub query_summary: String,
    pub hit_count: usize,
    pub duration_ms: u64,
    pub at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct QueryLog {
    capacity: usize,
    entries: VecDeque<QueryLogEntry>,
}

impl Default for QueryLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl QueryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn record(&mut self, entry: QueryLogEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn recent(&self, limit: usize) -> Vec<&QueryLogEntry> {
        self.entries.iter().rev().take(limit).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
