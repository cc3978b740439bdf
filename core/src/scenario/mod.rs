//! Declarative scenario configuration
//!
//! Scenarios pre-seed the event queue from data: a JSON document lists
//! labeled items, each with a one-time or repeating schedule, an optional
//! context payload, and an initial status. Applying a scenario schedules
//! one event per firing time; firing them leaves labeled records in the
//! scheduler trace.

pub mod loader;
pub mod types;

// Re-exports
pub use loader::ScenarioError;
pub use types::{Schedule, ScenarioItem, ScenarioSpec};
