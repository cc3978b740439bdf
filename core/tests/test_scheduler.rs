//! Tests for queue maintenance: scheduling, ordering, cancellation
//!
//! The ordering invariant — nondecreasing time, FIFO for equal times — is
//! pinned both by concrete cases and by a property over arbitrary schedules.

use event_sim_core_rs::{Event, EventScheduler, SimTime};
use proptest::prelude::*;
use serde_json::json;

// ============================================================================
// Scheduling and Ordering
// ============================================================================

#[test]
fn test_events_fire_in_time_order() {
    let mut scheduler = EventScheduler::new();
    scheduler.schedule(labeled(30, "late"));
    scheduler.schedule(labeled(10, "early"));
    scheduler.schedule(labeled(20, "mid"));

    scheduler.run().unwrap();

    assert_eq!(fired_labels(&scheduler), ["early", "mid", "late"]);
    assert_eq!(scheduler.current_time(), SimTime::new(30));
}

#[test]
fn test_equal_times_fire_fifo() {
    let mut scheduler = EventScheduler::new();
    scheduler.schedule(labeled(10, "first"));
    scheduler.schedule(labeled(10, "second"));
    scheduler.schedule(labeled(10, "third"));

    scheduler.run().unwrap();

    assert_eq!(fired_labels(&scheduler), ["first", "second", "third"]);
}

#[test]
fn test_queue_inspection_is_time_ordered() {
    let mut scheduler = EventScheduler::new();
    scheduler.schedule(Event::new(SimTime::new(50)));
    scheduler.schedule(Event::new(SimTime::new(10)));
    scheduler.schedule(Event::new(SimTime::new(30)));

    let times: Vec<u64> = scheduler.events().map(|e| e.time().get()).collect();
    assert_eq!(times, vec![10, 30, 50]);

    let snapshot_times: Vec<u64> = scheduler.snapshot().iter().map(|e| e.time().get()).collect();
    assert_eq!(snapshot_times, vec![10, 30, 50]);
}

#[test]
fn test_scheduling_into_the_past_is_tolerated() {
    let mut scheduler = EventScheduler::new();
    scheduler.schedule(Event::new(SimTime::new(5)));
    scheduler.run().unwrap();
    assert_eq!(scheduler.current_time(), SimTime::new(5));

    // Caller error, but accepted: the event still fires, and the clock
    // never moves backwards.
    scheduler.schedule(labeled(1, "stale"));
    assert_eq!(scheduler.peek_next_time(), Some(SimTime::new(1)));

    let report = scheduler.run().unwrap();
    assert_eq!(report.events_fired, 1);
    assert_eq!(scheduler.current_time(), SimTime::new(5));
}

// ============================================================================
// Duplicate Membership
// ============================================================================

#[test]
fn test_reschedule_after_retime_adds_second_entry() {
    let mut scheduler = EventScheduler::new();
    let event = Event::new(SimTime::new(5)).with_context_value("label", json!("dup"));

    scheduler.schedule(event.clone());
    event.set_time(SimTime::new(9));
    scheduler.schedule(event.clone());

    assert_eq!(scheduler.len(), 2);
    assert!(scheduler.contains(&event));

    let report = scheduler.run().unwrap();
    assert_eq!(report.events_fired, 2);

    // The first entry kept the key captured at its own schedule call.
    assert_eq!(fired_times(&scheduler), vec![5, 9]);
    assert_eq!(scheduler.current_time(), SimTime::new(9));
}

// ============================================================================
// Cancellation
// ============================================================================

#[test]
fn test_cancel_next_removes_earliest_without_firing() {
    let mut scheduler = EventScheduler::new();
    let early = Event::new(SimTime::new(2));
    let late = Event::new(SimTime::new(8));
    scheduler.schedule(late.clone());
    scheduler.schedule(early.clone());

    let cancelled = scheduler.cancel_next_event().unwrap();

    assert_eq!(cancelled, early);
    assert_eq!(scheduler.len(), 1);
    assert!(!scheduler.contains(&early));
    assert!(scheduler.contains(&late));
    assert_eq!(scheduler.current_time(), SimTime::ZERO);
    assert_eq!(scheduler.trace().fired_count(), 0);
}

#[test]
fn test_cancel_next_ignores_status() {
    let mut scheduler = EventScheduler::new();
    let suppressed = Event::new(SimTime::new(1)).deactivated();
    scheduler.schedule(suppressed.clone());
    scheduler.schedule(Event::new(SimTime::new(5)));

    let cancelled = scheduler.cancel_next_event().unwrap();
    assert_eq!(cancelled, suppressed);
}

#[test]
fn test_cancel_next_on_empty_queue_is_noop() {
    let mut scheduler = EventScheduler::new();
    assert!(scheduler.cancel_next_event().is_none());
}

#[test]
fn test_cancel_all_with_duplicate_times() {
    let mut scheduler = EventScheduler::new();
    let events = vec![
        Event::new(SimTime::new(5)),
        Event::new(SimTime::new(5)).deactivated(),
        Event::new(SimTime::new(5)),
        Event::new(SimTime::new(10)),
    ];
    for event in &events {
        scheduler.schedule(event.clone());
    }
    assert_eq!(scheduler.len(), 4);

    scheduler.cancel_all_events();

    assert_eq!(scheduler.len(), 0);
    for event in &events {
        assert!(!scheduler.contains(event));
    }
}

#[test]
fn test_cancel_all_twice_in_a_row() {
    let mut scheduler = EventScheduler::new();
    scheduler.schedule(Event::new(SimTime::new(1)));
    scheduler.schedule(Event::new(SimTime::new(2)));

    scheduler.cancel_all_events();
    assert!(scheduler.is_empty());

    scheduler.cancel_all_events();
    assert!(scheduler.is_empty());
}

// ============================================================================
// Ordering Properties
// ============================================================================

proptest! {
    /// For any sequence of schedule calls, events fire in nondecreasing
    /// time order, FIFO for equal times (insertion sequence ascending).
    #[test]
    fn prop_firing_order_is_time_then_insertion(
        times in proptest::collection::vec(0u64..200, 0..50),
    ) {
        let mut scheduler = EventScheduler::new();
        for &t in &times {
            scheduler.schedule(Event::new(SimTime::new(t)));
        }

        let report = scheduler.run().unwrap();
        prop_assert_eq!(report.events_fired, times.len());

        let fired: Vec<(SimTime, u64)> = scheduler
            .trace()
            .records_of_kind("Fired")
            .iter()
            .map(|r| (r.time().unwrap(), r.seq().unwrap()))
            .collect();
        for pair in fired.windows(2) {
            prop_assert!(pair[0] < pair[1], "out of order: {:?} then {:?}", pair[0], pair[1]);
        }
    }

    /// Scheduling N events then cancelling everything yields an empty queue
    /// regardless of N, their times, or their active/inactive mix.
    #[test]
    fn prop_cancel_all_round_trip(
        entries in proptest::collection::vec((0u64..200, any::<bool>()), 0..50),
    ) {
        let mut scheduler = EventScheduler::new();
        for &(t, active) in &entries {
            let event = Event::new(SimTime::new(t));
            if !active {
                event.deactivate();
            }
            scheduler.schedule(event);
        }
        prop_assert_eq!(scheduler.len(), entries.len());

        scheduler.cancel_all_events();
        prop_assert!(scheduler.is_empty());

        scheduler.cancel_all_events();
        prop_assert!(scheduler.is_empty());
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn labeled(time: u64, label: &str) -> Event {
    Event::new(SimTime::new(time)).with_context_value("label", json!(label))
}

fn fired_labels(scheduler: &EventScheduler) -> Vec<String> {
    scheduler
        .trace()
        .records_of_kind("Fired")
        .iter()
        .filter_map(|r| r.label().map(str::to_owned))
        .collect()
}

fn fired_times(scheduler: &EventScheduler) -> Vec<u64> {
    scheduler
        .trace()
        .records_of_kind("Fired")
        .iter()
        .filter_map(|r| r.time().map(SimTime::get))
        .collect()
}
