//! Scenario item types
//!
//! # Design Principles
//!
//! 1. **Determinism**: a scenario expands to the same queue entries on every
//!    apply
//! 2. **Self-contained**: items carry all data the resulting events need
//! 3. **Bounded**: repeating schedules carry an explicit count, since the
//!    queue is seeded up front rather than polled per tick

use serde::{Deserialize, Serialize};

use crate::core::time::SimTime;
use crate::models::event::EventContext;

/// When a scenario item fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Schedule {
    /// Fire once at a specific time
    OneTime { time: SimTime },

    /// Fire `count` times starting at `start_time`, `interval` apart
    Repeating {
        start_time: SimTime,
        interval: u64,
        count: u64,
    },
}

impl Schedule {
    /// Number of firing times this schedule expands to
    pub fn firings(&self) -> u64 {
        match *self {
            Schedule::OneTime { .. } => 1,
            Schedule::Repeating { count, .. } => count,
        }
    }

    /// Materialize the firing times, in ascending order
    pub fn firing_times(&self) -> Vec<SimTime> {
        match *self {
            Schedule::OneTime { time } => vec![time],
            Schedule::Repeating {
                start_time,
                interval,
                count,
            } => {
                let mut times = Vec::new();
                let mut at = start_time;
                for i in 0..count {
                    times.push(at);
                    if i + 1 < count {
                        match at.advance(interval) {
                            Some(next) => at = next,
                            None => break,
                        }
                    }
                }
                times
            }
        }
    }

    /// Check the schedule is well-formed
    pub fn validate(&self) -> Result<(), String> {
        match *self {
            Schedule::OneTime { .. } => Ok(()),
            Schedule::Repeating {
                start_time,
                interval,
                count,
            } => {
                if interval == 0 {
                    return Err("repeating schedule interval must be > 0".to_string());
                }
                if count == 0 {
                    return Err("repeating schedule count must be > 0".to_string());
                }
                let last = interval
                    .checked_mul(count - 1)
                    .and_then(|span| start_time.advance(span));
                if last.is_none() {
                    return Err("repeating schedule overflows simulation time".to_string());
                }
                Ok(())
            }
        }
    }
}

/// A labeled scenario item
///
/// The label identifies the item in the trace; it is stamped into the
/// context of every event the item expands to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioItem {
    /// Unique item label
    pub label: String,

    /// When the item fires
    pub schedule: Schedule,

    /// Context payload copied onto each expanded event
    #[serde(default)]
    pub context: EventContext,

    /// Initial status of the expanded events (default: active)
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// A complete scenario: the items to seed the queue with
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub items: Vec<ScenarioItem>,
}
