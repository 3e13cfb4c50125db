//! Event-recording state machines.

use uuid::Uuid;

use crate::event::DomainEvent;

/// A state machine that changes only by applying events it records, and
/// keeps the recorded events until a dispatcher takes them.
pub trait AggregateRoot: Send + Sync {
    /// The event type this aggregate records.
    type Event: DomainEvent;

    /// The aggregate identifier.
    fn aggregate_id(&self) -> Uuid;

    /// Number of events applied so far.
    fn version(&self) -> u64;

    /// Applies an event to mutate internal state.
    fn apply(&mut self, event: &Self::Event);

    /// Events recorded but not yet taken for dispatch.
    fn pending_events(&self) -> &[Self::Event];

    /// Removes and returns the pending events, oldest first.
    fn take_pending_events(&mut self) -> Vec<Self::Event>;
}
