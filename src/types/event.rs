//! The event record
//!
//! Events are immutable once constructed: fields are private and only
//! exposed through accessors.

use chrono::{DateTime, Utc};

/// One entry of the log: when it happened, what kind it is, and its payload
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Event {
    timestamp: DateTime<Utc>,
    event_type: String,
    payload: String,
}

impl Event {
    /// Create a new event
    pub fn new(
        timestamp: DateTime<Utc>,
        event_type: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            event_type: event_type.into(),
            payload: payload.into(),
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Application-chosen, namespace-like identifier (e.g. `com.example.userCreated`)
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Raw payload text, exactly as appended
    pub fn payload(&self) -> &str {
        &self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_event_accessors() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let event = Event::new(at, "com.example.type", "line one\nline two");

        assert_eq!(event.timestamp(), at);
        assert_eq!(event.event_type(), "com.example.type");
        assert_eq!(event.payload(), "line one\nline two");
    }

    #[test]
    fn test_events_compare_by_all_fields() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();

        assert_eq!(Event::new(at, "A", "x"), Event::new(at, "A", "x"));
        assert_ne!(Event::new(at, "A", "x"), Event::new(at, "B", "x"));
        assert_ne!(Event::new(at, "A", "x"), Event::new(at, "A", "y"));
    }
}
