//! Scheduler - time-ordered event queue and run loop
//!
//! See `engine.rs` for the full implementation.

pub mod engine;

// Re-export main types for convenience
pub use engine::{EventScheduler, RunReport, SimulationError};
