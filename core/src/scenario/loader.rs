//! Scenario parsing, validation, and application
//!
//! A `ScenarioSpec` is parsed from JSON, validated, and applied onto a
//! scheduler: one event per firing time, the item label stamped into each
//! event's context, the `active` flag honored. Applied events carry no
//! action; the record of their firing is the scheduler trace.

use std::collections::HashSet;

use serde_json::Value;
use thiserror::Error;

use crate::models::event::Event;
use crate::scenario::types::ScenarioSpec;
use crate::scheduler::EventScheduler;

/// Errors that can occur while loading or applying a scenario
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("invalid scenario: {0}")]
    Invalid(String),

    #[error("scenario parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ScenarioSpec {
    /// Parse and validate a scenario from JSON
    ///
    /// # Example
    /// ```
    /// use event_sim_core_rs::ScenarioSpec;
    ///
    /// let spec = ScenarioSpec::from_json(
    ///     r#"{"items": [
    ///         {"label": "open", "schedule": {"time": 0}},
    ///         {"label": "poll", "schedule": {"start_time": 10, "interval": 5, "count": 3}}
    ///     ]}"#,
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(spec.items.len(), 2);
    /// assert!(spec.items[0].active);
    /// ```
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        let spec: ScenarioSpec = serde_json::from_str(json)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Validate the scenario
    ///
    /// Labels must be non-empty and unique; every schedule must be
    /// well-formed.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let mut labels = HashSet::new();
        for item in &self.items {
            if item.label.is_empty() {
                return Err(ScenarioError::Invalid(
                    "item label must not be empty".to_string(),
                ));
            }
            if !labels.insert(item.label.as_str()) {
                return Err(ScenarioError::Invalid(format!(
                    "duplicate item label: {}",
                    item.label
                )));
            }
            item.schedule.validate().map_err(ScenarioError::Invalid)?;
        }
        Ok(())
    }

    /// Expand the scenario onto a scheduler
    ///
    /// Schedules one event per firing time of every item and returns the
    /// number of queue entries created.
    pub fn apply(&self, scheduler: &mut EventScheduler) -> Result<usize, ScenarioError> {
        self.validate()?;

        let mut scheduled = 0;
        for item in &self.items {
            for time in item.schedule.firing_times() {
                let mut context = item.context.clone();
                context.insert("label", Value::String(item.label.clone()));

                let mut event = Event::new(time).with_context(context);
                if !item.active {
                    event = event.deactivated();
                }

                scheduler.schedule(event);
                scheduled += 1;
            }
        }
        Ok(scheduled)
    }
}
