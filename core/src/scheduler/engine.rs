//! Scheduler Engine
//!
//! Owns the global simulation clock and the set of pending events, and
//! drives execution:
//! - Scheduling (including duplicate membership for re-scheduled events)
//! - Cancellation (earliest entry, or the whole queue)
//! - Bulk condition-based activation/deactivation over a queue snapshot
//! - Time-stepped execution (`step`, `run`, `run_until_max_time`)
//! - Trace logging of every queue happening
//!
//! # Critical Invariants
//!
//! 1. Entries are totally ordered by `(time, insertion sequence)`; equal
//!    timestamps fire in FIFO insertion order.
//! 2. `current_time` is monotonically non-decreasing and advances only when
//!    an entry fires, to that entry's scheduled time.
//! 3. Bulk condition scans evaluate against a snapshot taken at call time:
//!    a condition that mutates the queue mid-scan cannot cause skipped or
//!    duplicated evaluation.
//! 4. Logical no-ops (cancelling from an empty queue, activating an active
//!    event, zero condition matches) never error.
//!
//! # Example
//!
//! ```rust
//! use event_sim_core_rs::{Event, EventScheduler, SimTime};
//!
//! let mut scheduler = EventScheduler::new();
//! scheduler.schedule(Event::new(SimTime::new(15)));
//! scheduler.schedule(Event::new(SimTime::new(5)).deactivated());
//! scheduler.schedule(Event::new(SimTime::new(10)));
//!
//! let report = scheduler.run_until_max_time(SimTime::new(12)).unwrap();
//! assert_eq!(report.events_fired, 1); // the active event at t=10
//! assert_eq!(report.events_skipped, 1); // the inactive event at t=5 was swept
//! assert_eq!(scheduler.current_time(), SimTime::new(10));
//! assert_eq!(scheduler.len(), 1); // t=15 is still pending
//! ```

use std::collections::BTreeMap;

use thiserror::Error;

use crate::core::time::SimTime;
use crate::models::event::{ActionError, Event};
use crate::models::trace::{TraceLog, TraceRecord};

// ============================================================================
// Result and Error Types
// ============================================================================

/// Bookkeeping returned by the run loops
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    /// Number of active entries popped and fired
    pub events_fired: usize,

    /// Number of inactive entries swept past without firing
    pub events_skipped: usize,

    /// Scheduler clock when the loop returned
    pub final_time: SimTime,
}

/// Simulation error types
#[derive(Debug, Error)]
pub enum SimulationError {
    /// An event action returned an error; the run loop aborted at that
    /// event, leaving the clock at its time and the rest of the queue
    /// untouched.
    #[error("action failed at time {time}: {source}")]
    ActionFailed {
        time: SimTime,
        #[source]
        source: ActionError,
    },
}

// ============================================================================
// EventScheduler
// ============================================================================

/// Entry key: scheduled time plus a strictly increasing insertion sequence.
/// The sequence makes equal-time ordering FIFO and deterministic, and gives
/// duplicate entries of one event independent identities in the queue.
type EntryKey = (SimTime, u64);

/// Time-ordered event queue with a simulation clock
///
/// The scheduler executes synchronously on a single thread: every method
/// runs to completion, and "concurrency" in the simulated domain is just
/// interleaved firings at the same or increasing timestamps. Actions and
/// conditions receive the scheduler and may mutate it re-entrantly; the
/// queue is never iterated live while user code runs.
pub struct EventScheduler {
    /// Pending entries, both active and inactive, ordered by `(time, seq)`
    event_queue: BTreeMap<EntryKey, Event>,

    /// Next insertion sequence number
    next_seq: u64,

    /// Simulation clock; advances only when an entry fires
    current_time: SimTime,

    /// Trace of every queue happening
    trace: TraceLog,
}

impl EventScheduler {
    /// Create a scheduler with the clock at time zero
    pub fn new() -> Self {
        Self::with_origin(SimTime::ZERO)
    }

    /// Create a scheduler with the clock at a caller-supplied origin
    pub fn with_origin(origin: SimTime) -> Self {
        Self {
            event_queue: BTreeMap::new(),
            next_seq: 0,
            current_time: origin,
            trace: TraceLog::new(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Current simulation time
    pub fn current_time(&self) -> SimTime {
        self.current_time
    }

    /// Number of pending queue entries (active and inactive)
    pub fn len(&self) -> usize {
        self.event_queue.len()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.event_queue.is_empty()
    }

    /// Iterate over queued events in `(time, seq)` order
    pub fn events(&self) -> impl Iterator<Item = &Event> + '_ {
        self.event_queue.values()
    }

    /// Clone the queued event handles, in `(time, seq)` order
    ///
    /// This is the snapshot the bulk condition operations scan; it is also
    /// useful for test inspection.
    pub fn snapshot(&self) -> Vec<Event> {
        self.event_queue.values().cloned().collect()
    }

    /// Check whether any queue entry refers to this event
    pub fn contains(&self, event: &Event) -> bool {
        self.event_queue.values().any(|queued| queued == event)
    }

    /// Scheduled time of the earliest entry, regardless of status
    pub fn peek_next_time(&self) -> Option<SimTime> {
        self.event_queue.keys().next().map(|&(time, _)| time)
    }

    /// Get reference to the trace log
    pub fn trace(&self) -> &TraceLog {
        &self.trace
    }

    /// Get mutable reference to the trace log
    ///
    /// Primarily for tests and harnesses that want to clear the trace
    /// between phases.
    pub fn trace_mut(&mut self) -> &mut TraceLog {
        &mut self.trace
    }

    // ========================================================================
    // Scheduling and Cancellation
    // ========================================================================

    /// Insert an event into the queue
    ///
    /// The entry is keyed by the event's time *as of this call* plus the
    /// next insertion sequence. Scheduling carries no lower-bound check
    /// against the clock: an event in the past is a caller error, tolerated,
    /// and fires without moving the clock backwards. Scheduling an event
    /// that is already queued adds a second, independent entry — duplicate
    /// membership is the caller's responsibility to avoid.
    pub fn schedule(&mut self, event: Event) {
        let seq = self.next_seq;
        self.next_seq += 1;
        let time = event.time();
        self.trace.log(TraceRecord::Scheduled {
            seq,
            time,
            label: event.label(),
        });
        self.event_queue.insert((time, seq), event);
    }

    /// Remove and return the single earliest entry, without firing it
    ///
    /// Status is ignored: an inactive earliest entry is cancelled all the
    /// same. Returns `None` on an empty queue (a no-op, not an error). The
    /// clock does not move.
    pub fn cancel_next_event(&mut self) -> Option<Event> {
        let ((time, seq), event) = self.event_queue.pop_first()?;
        self.trace.log(TraceRecord::Cancelled {
            seq,
            time,
            label: event.label(),
        });
        Some(event)
    }

    /// Empty the queue entirely, without firing anything
    ///
    /// Removes active and inactive entries alike. Idempotent on an empty
    /// queue.
    pub fn cancel_all_events(&mut self) {
        let count = self.event_queue.len();
        if count == 0 {
            return;
        }
        self.event_queue.clear();
        self.trace.log(TraceRecord::Cleared { count });
    }

    // ========================================================================
    // Bulk Condition Operations
    // ========================================================================

    /// Activate every queued event the condition selects
    ///
    /// Evaluates `condition(scheduler, event)` for each entry of a snapshot
    /// taken at call time, in `(time, seq)` order, and activates the
    /// matches. Already-active matches are harmlessly re-activated; nothing
    /// is added or removed. A condition that itself schedules or cancels
    /// events mid-scan does not change which entries get evaluated.
    ///
    /// Returns the number of matches.
    pub fn activate_all_events_by_condition<F>(&mut self, mut condition: F) -> usize
    where
        F: FnMut(&mut EventScheduler, &Event) -> bool,
    {
        let snapshot = self.snapshot();
        let mut matched = 0;
        for event in &snapshot {
            if condition(self, event) {
                event.activate();
                matched += 1;
            }
        }
        matched
    }

    /// Deactivate the earliest queued event the condition selects
    ///
    /// Scans a call-time snapshot in `(time, seq)` order and deactivates the
    /// *first* match, then stops — at most one status flips per call.
    /// Matching is decided by the condition alone: an already-inactive event
    /// may match (and is idempotently deactivated again), and the scan moves
    /// past non-matching events whatever their status.
    ///
    /// Returns the deactivated event, or `None` if nothing matched.
    pub fn deactivate_next_event_by_condition<F>(&mut self, mut condition: F) -> Option<Event>
    where
        F: FnMut(&mut EventScheduler, &Event) -> bool,
    {
        let snapshot = self.snapshot();
        for event in snapshot {
            if condition(self, &event) {
                event.deactivate();
                return Some(event);
            }
        }
        None
    }

    // ========================================================================
    // Run Loop
    // ========================================================================

    /// Fire active entries in time order while their time is `<= max_time`
    ///
    /// Repeatedly pops the earliest entry not past the bound. An active
    /// entry advances the clock to its scheduled time and fires its action;
    /// an inactive entry is swept — discarded unfired — so the loop looks
    /// past inactive events to find the next active one. Stops when the
    /// earliest remaining entry is past `max_time` or the queue is empty.
    ///
    /// On return no remaining active entry has `time <= max_time`, and the
    /// clock sits at the last fired entry's time (the clock never jumps to
    /// `max_time` on its own, and never moves backwards).
    ///
    /// # Returns
    ///
    /// * `Ok(RunReport)` - counts of fired and swept entries plus the final
    ///   clock
    /// * `Err(SimulationError)` - an action failed; the failing entry is
    ///   consumed and the rest of the queue is left as-is
    pub fn run_until_max_time(&mut self, max_time: SimTime) -> Result<RunReport, SimulationError> {
        let mut report = RunReport::default();
        loop {
            let due = match self.event_queue.first_key_value() {
                Some((&key, _)) if key.0 <= max_time => Some(key),
                _ => None,
            };
            let Some((time, seq)) = due else { break };
            let Some(event) = self.event_queue.remove(&(time, seq)) else {
                break;
            };
            if event.is_active() {
                self.fire(time, seq, &event)?;
                report.events_fired += 1;
            } else {
                self.sweep(time, seq, &event);
                report.events_skipped += 1;
            }
        }
        report.final_time = self.current_time;
        Ok(report)
    }

    /// Fire active entries in time order until none remain
    ///
    /// The unbounded variant: drains every active entry. Inactive entries
    /// encountered on the way to an active one are swept; inactive entries
    /// scheduled after the last active one remain queued, uncollected,
    /// unless separately cancelled.
    pub fn run(&mut self) -> Result<RunReport, SimulationError> {
        let mut report = RunReport::default();
        while let Some(stop) = self.next_active_key() {
            while let Some(((time, seq), event)) = self.event_queue.pop_first() {
                if (time, seq) < stop {
                    self.sweep(time, seq, &event);
                    report.events_skipped += 1;
                    continue;
                }
                self.fire(time, seq, &event)?;
                report.events_fired += 1;
                break;
            }
        }
        report.final_time = self.current_time;
        Ok(report)
    }

    /// Fire the single earliest active entry
    ///
    /// Inactive entries ahead of it are swept. Returns the fired event, or
    /// `None` if the queue holds no active entry (inactive leftovers stay
    /// put in that case).
    pub fn step(&mut self) -> Result<Option<Event>, SimulationError> {
        let Some(stop) = self.next_active_key() else {
            return Ok(None);
        };
        while let Some(((time, seq), event)) = self.event_queue.pop_first() {
            if (time, seq) < stop {
                self.sweep(time, seq, &event);
                continue;
            }
            self.fire(time, seq, &event)?;
            return Ok(Some(event));
        }
        Ok(None)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Key of the earliest active entry
    fn next_active_key(&self) -> Option<EntryKey> {
        self.event_queue
            .iter()
            .find_map(|(&key, event)| event.is_active().then_some(key))
    }

    /// Advance the clock to a popped entry and invoke its action
    ///
    /// The action slot is taken for the duration of the call so the action
    /// can freely touch the scheduler and its own event.
    fn fire(&mut self, time: SimTime, seq: u64, event: &Event) -> Result<(), SimulationError> {
        if time > self.current_time {
            self.current_time = time;
        }
        self.trace.log(TraceRecord::Fired {
            seq,
            time,
            label: event.label(),
        });
        if let Some(mut action) = event.take_action() {
            let outcome = action(self, event);
            event.put_action(action);
            if let Err(source) = outcome {
                return Err(SimulationError::ActionFailed { time, source });
            }
        }
        Ok(())
    }

    /// Record an inactive entry discarded by a run loop
    fn sweep(&mut self, time: SimTime, seq: u64, event: &Event) {
        self.trace.log(TraceRecord::Skipped {
            seq,
            time,
            label: event.label(),
        });
    }
}

impl Default for EventScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_scheduler_is_empty() {
        let scheduler = EventScheduler::new();

        assert!(scheduler.is_empty());
        assert_eq!(scheduler.len(), 0);
        assert_eq!(scheduler.current_time(), SimTime::ZERO);
        assert_eq!(scheduler.peek_next_time(), None);
    }

    #[test]
    fn test_with_origin() {
        let scheduler = EventScheduler::with_origin(SimTime::new(100));
        assert_eq!(scheduler.current_time(), SimTime::new(100));
    }

    #[test]
    fn test_schedule_orders_by_time() {
        let mut scheduler = EventScheduler::new();
        scheduler.schedule(Event::new(SimTime::new(30)));
        scheduler.schedule(Event::new(SimTime::new(10)));
        scheduler.schedule(Event::new(SimTime::new(20)));

        let times: Vec<SimTime> = scheduler.events().map(Event::time).collect();
        assert_eq!(
            times,
            vec![SimTime::new(10), SimTime::new(20), SimTime::new(30)]
        );
        assert_eq!(scheduler.peek_next_time(), Some(SimTime::new(10)));
    }

    #[test]
    fn test_contains_uses_identity() {
        let mut scheduler = EventScheduler::new();
        let queued = Event::new(SimTime::new(5));
        let stranger = Event::new(SimTime::new(5));

        scheduler.schedule(queued.clone());

        assert!(scheduler.contains(&queued));
        assert!(!scheduler.contains(&stranger));
    }

    #[test]
    fn test_cancel_next_on_empty_queue_is_noop() {
        let mut scheduler = EventScheduler::new();
        assert!(scheduler.cancel_next_event().is_none());
    }

    #[test]
    fn test_cancel_all_is_idempotent() {
        let mut scheduler = EventScheduler::new();
        scheduler.schedule(Event::new(SimTime::new(1)));

        scheduler.cancel_all_events();
        assert!(scheduler.is_empty());

        scheduler.cancel_all_events();
        assert!(scheduler.is_empty());
        // Only the non-empty clear left a record.
        assert_eq!(scheduler.trace().records_of_kind("Cleared").len(), 1);
    }

    #[test]
    fn test_run_on_empty_queue() {
        let mut scheduler = EventScheduler::new();
        let report = scheduler.run().unwrap();

        assert_eq!(report.events_fired, 0);
        assert_eq!(report.events_skipped, 0);
        assert_eq!(report.final_time, SimTime::ZERO);
    }
}
