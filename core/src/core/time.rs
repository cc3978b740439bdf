//! Simulation time
//!
//! The kernel operates on discrete logical timestamps. Time advances only
//! when the scheduler fires an event — never from wall-clock observation.
//! This module provides the ordered timestamp type used as the queue key.

use serde::{Deserialize, Serialize};

/// A discrete timestamp in simulation time
///
/// `SimTime` is a total order key: the scheduler orders queue entries by
/// `(SimTime, insertion sequence)` and its clock is a `SimTime`.
///
/// # Example
/// ```
/// use event_sim_core_rs::SimTime;
///
/// let t1 = SimTime::new(10);
/// let t2 = SimTime::new(20);
/// assert!(t1 < t2);
/// assert_eq!(t1.advance(10), Some(t2));
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct SimTime(u64);

impl SimTime {
    /// The zero-point of simulation time
    pub const ZERO: SimTime = SimTime(0);

    /// Create a timestamp from a raw value
    pub fn new(raw: u64) -> Self {
        SimTime(raw)
    }

    /// Get the raw value
    pub fn get(self) -> u64 {
        self.0
    }

    /// The timestamp `delta` units after `self`
    ///
    /// Returns `None` on overflow.
    ///
    /// # Example
    /// ```
    /// use event_sim_core_rs::SimTime;
    ///
    /// assert_eq!(SimTime::new(100).advance(50), Some(SimTime::new(150)));
    /// assert_eq!(SimTime::new(u64::MAX).advance(1), None);
    /// ```
    pub fn advance(self, delta: u64) -> Option<SimTime> {
        self.0.checked_add(delta).map(SimTime)
    }
}

impl From<u64> for SimTime {
    fn from(raw: u64) -> Self {
        SimTime(raw)
    }
}

impl std::fmt::Display for SimTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
