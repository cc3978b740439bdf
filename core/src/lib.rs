//! Event Simulator Core - Rust Engine
//!
//! General-purpose discrete-event simulation kernel with deterministic
//! execution: a time-ordered queue of events, a clock that advances as they
//! fire, and dynamic creation, cancellation, activation, and deactivation of
//! events by the simulated processes themselves.
//!
//! # Architecture
//!
//! - **core**: Simulation time primitives
//! - **models**: Domain types (Event, EventContext, trace records)
//! - **scheduler**: The event queue and run loop
//! - **scenario**: Declarative queue seeding from JSON
//!
//! # Critical Invariants
//!
//! 1. Events fire in nondecreasing time order; equal times fire FIFO by
//!    insertion (deterministic replay)
//! 2. The clock advances only when an event fires, never backwards
//! 3. Execution is single-threaded and synchronous; actions and conditions
//!    may re-enter the scheduler, and bulk scans run against a snapshot
//!
//! # Example
//!
//! ```rust
//! use event_sim_core_rs::{Event, EventScheduler, SimTime};
//!
//! let mut scheduler = EventScheduler::new();
//!
//! scheduler.schedule(Event::new(SimTime::new(15)));
//! scheduler.schedule(Event::new(SimTime::new(5)));
//! scheduler.schedule(Event::new(SimTime::new(25)).deactivated());
//!
//! // Activate the far event only if it is still suppressed.
//! scheduler.activate_all_events_by_condition(|_scheduler, event| !event.is_active());
//!
//! let report = scheduler.run().unwrap();
//! assert_eq!(report.events_fired, 3);
//! assert_eq!(scheduler.current_time(), SimTime::new(25));
//! ```

// Module declarations
pub mod core;
pub mod models;
pub mod scenario;
pub mod scheduler;

// Re-exports for convenience
pub use crate::core::time::SimTime;
pub use crate::models::{
    event::{Action, ActionError, Event, EventContext, EventStatus},
    trace::{TraceLog, TraceRecord},
};
pub use crate::scenario::{Schedule, ScenarioError, ScenarioItem, ScenarioSpec};
pub use crate::scheduler::{EventScheduler, RunReport, SimulationError};
