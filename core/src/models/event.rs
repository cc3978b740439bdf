//! Event model
//!
//! Represents a schedulable unit of work in the simulation.
//! Each event has:
//! - A timestamp (total order key for the queue)
//! - A status (Active fires when reached, Inactive is skipped)
//! - An optional action invoked on firing
//! - An open key-value context payload for conditions and actions
//!
//! An `Event` value is a shared handle: clones refer to the same underlying
//! event, and equality compares identity, not contents. Two events with the
//! same timestamp are distinct and may coexist in the queue. Status and time
//! stay mutable through any handle while the event is queued, which is what
//! lets callers (and running actions) activate, deactivate, or retime events
//! between steps.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::time::SimTime;
use crate::scheduler::EventScheduler;

/// Error type produced by event actions
///
/// Actions surface arbitrary user errors; the run loop wraps them in
/// [`crate::SimulationError::ActionFailed`] without inspecting them.
pub type ActionError = Box<dyn std::error::Error + Send + Sync>;

/// Callable attached to an event, invoked when the event fires
///
/// The action receives the scheduler (so it can schedule follow-up events,
/// cancel pending ones, or toggle statuses mid-run) and the event that is
/// firing.
pub type Action = Box<dyn FnMut(&mut EventScheduler, &Event) -> Result<(), ActionError>>;

/// Event status
///
/// An active event fires when its time is reached; an inactive event remains
/// queued but is skipped by the firing logic until reactivated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStatus {
    /// Event fires when its time is reached
    Active,

    /// Event is suppressed: it stays queued but does not fire
    Inactive,
}

/// Open key-value payload attached to an event
///
/// String keys map to arbitrary JSON values. Conditions and actions read the
/// context to select or parameterize events. Every event gets its own fresh
/// context — contexts are never shared between instances.
///
/// # Example
/// ```
/// use event_sim_core_rs::EventContext;
/// use serde_json::json;
///
/// let mut context = EventContext::new();
/// context.insert("kind", json!("arrival"));
/// context.insert("weight", json!(3));
///
/// assert_eq!(context.len(), 2);
/// assert_eq!(context.get("kind"), Some(&json!("arrival")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventContext {
    entries: BTreeMap<String, Value>,
}

impl EventContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the previous value for the key if any
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.insert(key.into(), value)
    }

    /// Get the value for a key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Check whether a key is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the context is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> + '_ {
        self.entries.iter()
    }
}

struct EventInner {
    time: Cell<SimTime>,
    status: Cell<EventStatus>,
    context: RefCell<EventContext>,
    action: RefCell<Option<Action>>,
}

/// A schedulable unit of work
///
/// Constructed by the caller and handed to
/// [`EventScheduler::schedule`](crate::EventScheduler::schedule). Defaults:
/// active, empty context, no action (firing a no-action event just advances
/// the clock and records a trace entry).
///
/// # Example
/// ```
/// use event_sim_core_rs::{Event, EventStatus, SimTime};
/// use serde_json::json;
///
/// let event = Event::new(SimTime::new(10))
///     .with_context_value("kind", json!("timeout"))
///     .deactivated();
///
/// assert_eq!(event.time(), SimTime::new(10));
/// assert_eq!(event.status(), EventStatus::Inactive);
///
/// event.activate();
/// assert!(event.is_active());
/// ```
#[derive(Clone)]
pub struct Event {
    inner: Rc<EventInner>,
}

impl Event {
    /// Create a new active event with an empty context and no action
    pub fn new(time: SimTime) -> Self {
        Event {
            inner: Rc::new(EventInner {
                time: Cell::new(time),
                status: Cell::new(EventStatus::Active),
                context: RefCell::new(EventContext::new()),
                action: RefCell::new(None),
            }),
        }
    }

    /// Attach an action invoked when this event fires
    ///
    /// The action may re-enter the scheduler: scheduling new events,
    /// cancelling pending ones, and toggling statuses from inside an action
    /// are all supported.
    ///
    /// # Example
    /// ```
    /// use event_sim_core_rs::{Event, EventScheduler, SimTime};
    /// use std::cell::RefCell;
    /// use std::rc::Rc;
    ///
    /// let fired = Rc::new(RefCell::new(Vec::new()));
    /// let sink = Rc::clone(&fired);
    ///
    /// let mut scheduler = EventScheduler::new();
    /// scheduler.schedule(Event::new(SimTime::new(3)).with_action(move |_scheduler, event| {
    ///     sink.borrow_mut().push(event.time());
    ///     Ok(())
    /// }));
    ///
    /// scheduler.run().unwrap();
    /// assert_eq!(*fired.borrow(), vec![SimTime::new(3)]);
    /// ```
    pub fn with_action<F>(self, action: F) -> Self
    where
        F: FnMut(&mut EventScheduler, &Event) -> Result<(), ActionError> + 'static,
    {
        *self.inner.action.borrow_mut() = Some(Box::new(action));
        self
    }

    /// Replace the context wholesale
    pub fn with_context(self, context: EventContext) -> Self {
        *self.inner.context.borrow_mut() = context;
        self
    }

    /// Insert a single context entry
    pub fn with_context_value(self, key: impl Into<String>, value: Value) -> Self {
        self.inner.context.borrow_mut().insert(key, value);
        self
    }

    /// Start the event inactive instead of active
    pub fn deactivated(self) -> Self {
        self.inner.status.set(EventStatus::Inactive);
        self
    }

    /// The event's timestamp
    pub fn time(&self) -> SimTime {
        self.inner.time.get()
    }

    /// Change the event's timestamp
    ///
    /// Retiming an event that is already queued does not move its existing
    /// queue entry; the entry keeps the key captured when it was scheduled.
    /// Re-scheduling after a retime adds a second, independent entry at the
    /// new time.
    pub fn set_time(&self, time: SimTime) {
        self.inner.time.set(time);
    }

    /// Current status
    pub fn status(&self) -> EventStatus {
        self.inner.status.get()
    }

    /// Check whether the event is active
    pub fn is_active(&self) -> bool {
        self.status() == EventStatus::Active
    }

    /// Set status to Active
    ///
    /// Idempotent: activating an already-active event is a no-op.
    pub fn activate(&self) {
        self.inner.status.set(EventStatus::Active);
    }

    /// Set status to Inactive
    ///
    /// Idempotent: deactivating an already-inactive event is a no-op.
    pub fn deactivate(&self) {
        self.inner.status.set(EventStatus::Inactive);
    }

    /// Borrow the context for reading
    pub fn context(&self) -> Ref<'_, EventContext> {
        self.inner.context.borrow()
    }

    /// Borrow the context for writing
    pub fn context_mut(&self) -> RefMut<'_, EventContext> {
        self.inner.context.borrow_mut()
    }

    /// Get a cloned context value by key
    pub fn context_value(&self, key: &str) -> Option<Value> {
        self.inner.context.borrow().get(key).cloned()
    }

    /// The event's label, if its context carries a string under `"label"`
    ///
    /// Labels are purely informational; they flow into trace records.
    pub fn label(&self) -> Option<String> {
        let context = self.inner.context.borrow();
        context.get("label").and_then(|v| v.as_str()).map(str::to_owned)
    }

    /// Check whether an action is attached
    pub fn has_action(&self) -> bool {
        self.inner.action.borrow().is_some()
    }

    /// Take the action out for invocation
    ///
    /// The slot is left empty while the action runs so the action can touch
    /// its own event without aliasing; the caller restores it afterwards.
    pub(crate) fn take_action(&self) -> Option<Action> {
        self.inner.action.borrow_mut().take()
    }

    /// Restore an action after invocation
    pub(crate) fn put_action(&self, action: Action) {
        *self.inner.action.borrow_mut() = Some(action);
    }
}

/// Equality is identity: two handles are equal iff they refer to the same
/// underlying event. Events with identical time and context are still
/// distinct.
impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Event {}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("time", &self.time())
            .field("status", &self.status())
            .field("context", &*self.context())
            .field("has_action", &self.has_action())
            .finish()
    }
}
