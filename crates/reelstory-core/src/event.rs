//! Session events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::Clock;

/// Envelope fields shared by every event a session records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// Type name, e.g. `player.segment_entered`.
    pub event_type: String,
    /// Session that recorded the event.
    pub session_id: Uuid,
    /// Position in the session's event stream, starting at 1.
    pub sequence_number: u64,
    /// Correlation ID of the intent (or tick) the event traces back to.
    pub correlation_id: Uuid,
    /// What directly caused the event: the intent's correlation ID, or the
    /// ID of the event whose side effect recorded it.
    pub causation_id: Uuid,
    /// When the event was recorded.
    pub occurred_at: DateTime<Utc>,
}

impl EventMetadata {
    /// Stamps a new event for `session_id`.
    #[must_use]
    pub fn new(
        event_type: &str,
        session_id: Uuid,
        sequence_number: u64,
        correlation_id: Uuid,
        causation_id: Uuid,
        clock: &dyn Clock,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type: event_type.to_owned(),
            session_id,
            sequence_number,
            correlation_id,
            causation_id,
            occurred_at: clock.now(),
        }
    }
}

/// An event recorded by a session.
pub trait DomainEvent: Send + Sync + std::fmt::Debug {
    /// The event type name.
    fn event_type(&self) -> &'static str;

    /// The payload as JSON, for logs and hosts that persist sessions.
    fn to_payload(&self) -> serde_json::Value;

    /// The envelope.
    fn metadata(&self) -> &EventMetadata;

    /// Session that recorded the event.
    fn session_id(&self) -> Uuid {
        self.metadata().session_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;

    #[test]
    fn test_new_stamps_distinct_event_ids() {
        let session_id = Uuid::new_v4();
        let correlation_id = Uuid::new_v4();

        let first = EventMetadata::new(
            "player.tick",
            session_id,
            1,
            correlation_id,
            correlation_id,
            &SystemClock,
        );
        let second = EventMetadata::new(
            "player.tick",
            session_id,
            2,
            correlation_id,
            first.event_id,
            &SystemClock,
        );

        assert_ne!(first.event_id, second.event_id);
        assert_eq!(first.causation_id, correlation_id);
        assert_eq!(second.causation_id, first.event_id);
        assert_eq!(first.session_id, session_id);
        assert_eq!(second.sequence_number, 2);
        assert_eq!(first.event_type, "player.tick");
    }
}
