//! Trace logging for simulation replay and auditing.
//!
//! The scheduler records every queue happening as a `TraceRecord`. The trace
//! enables:
//! - Deterministic replay verification (two runs with the same schedule
//!   produce identical traces)
//! - Debugging (what fired, what was swept, and when)
//! - Analysis (extract per-label firing patterns)
//!
//! Records carry the queue entry's insertion sequence number, which is also
//! the FIFO tie-break for equal timestamps, so a sorted trace is a total
//! order over everything the scheduler did.

use serde::{Deserialize, Serialize};

use crate::core::time::SimTime;

/// A single queue happening recorded by the scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceRecord {
    /// An event entered the queue
    Scheduled {
        seq: u64,
        time: SimTime,
        label: Option<String>,
    },

    /// An active entry was popped and its action invoked
    Fired {
        seq: u64,
        time: SimTime,
        label: Option<String>,
    },

    /// An inactive entry was swept past by a run loop, unfired
    Skipped {
        seq: u64,
        time: SimTime,
        label: Option<String>,
    },

    /// The earliest entry was cancelled without firing
    Cancelled {
        seq: u64,
        time: SimTime,
        label: Option<String>,
    },

    /// The whole queue was cancelled at once
    Cleared { count: usize },
}

impl TraceRecord {
    /// Get a short description of the record kind
    pub fn kind(&self) -> &'static str {
        match self {
            TraceRecord::Scheduled { .. } => "Scheduled",
            TraceRecord::Fired { .. } => "Fired",
            TraceRecord::Skipped { .. } => "Skipped",
            TraceRecord::Cancelled { .. } => "Cancelled",
            TraceRecord::Cleared { .. } => "Cleared",
        }
    }

    /// Get the entry timestamp, if the record concerns a single entry
    pub fn time(&self) -> Option<SimTime> {
        match self {
            TraceRecord::Scheduled { time, .. }
            | TraceRecord::Fired { time, .. }
            | TraceRecord::Skipped { time, .. }
            | TraceRecord::Cancelled { time, .. } => Some(*time),
            TraceRecord::Cleared { .. } => None,
        }
    }

    /// Get the entry sequence number, if the record concerns a single entry
    pub fn seq(&self) -> Option<u64> {
        match self {
            TraceRecord::Scheduled { seq, .. }
            | TraceRecord::Fired { seq, .. }
            | TraceRecord::Skipped { seq, .. }
            | TraceRecord::Cancelled { seq, .. } => Some(*seq),
            TraceRecord::Cleared { .. } => None,
        }
    }

    /// Get the event label, if one was attached
    pub fn label(&self) -> Option<&str> {
        match self {
            TraceRecord::Scheduled { label, .. }
            | TraceRecord::Fired { label, .. }
            | TraceRecord::Skipped { label, .. }
            | TraceRecord::Cancelled { label, .. } => label.as_deref(),
            TraceRecord::Cleared { .. } => None,
        }
    }
}

/// Trace log for storing and querying scheduler happenings.
///
/// A simple wrapper around `Vec<TraceRecord>` with convenience queries.
#[derive(Debug, Clone, Default)]
pub struct TraceLog {
    records: Vec<TraceRecord>,
}

impl TraceLog {
    /// Create a new empty trace log
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Append a record
    pub fn log(&mut self, record: TraceRecord) {
        self.records.push(record);
    }

    /// Number of records logged
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get all records in logging order
    pub fn records(&self) -> &[TraceRecord] {
        &self.records
    }

    /// Get records of a specific kind
    pub fn records_of_kind(&self, kind: &str) -> Vec<&TraceRecord> {
        self.records.iter().filter(|r| r.kind() == kind).collect()
    }

    /// Get records for a specific timestamp
    pub fn records_at_time(&self, time: SimTime) -> Vec<&TraceRecord> {
        self.records
            .iter()
            .filter(|r| r.time() == Some(time))
            .collect()
    }

    /// Number of `Fired` records
    pub fn fired_count(&self) -> usize {
        self.records_of_kind("Fired").len()
    }

    /// Clear all records
    pub fn clear(&mut self) {
        self.records.clear();
    }
}
