//! Scheduled events with fixed time windows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Error;

/// A scheduled activity within a facility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub zoo_id: i32,
    pub event_type_id: i32,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

impl Event {
    /// Whether the event window has opened at `now`.
    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        self.start_at < now
    }

    /// Whether the event window has closed at `now`. Ended events are
    /// immutable.
    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        self.end_at < now
    }
}

/// Fields for a new or updated event, prior to persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub name: String,
    pub description: String,
    pub zoo_id: i32,
    pub event_type_id: i32,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

impl EventDraft {
    /// Validate the draft's time window. `end_at` must be after `start_at`.
    pub fn validate(&self) -> Result<(), Error> {
        if self.end_at <= self.start_at {
            return Err(Error::invalid_request(
                "event end time must be after its start time",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn draft(offset_minutes: i64) -> EventDraft {
        let start_at = Utc::now();
        EventDraft {
            name: "Morning feed".to_owned(),
            description: String::new(),
            zoo_id: 1,
            event_type_id: 1,
            start_at,
            end_at: start_at + Duration::minutes(offset_minutes),
        }
    }

    #[test]
    fn forward_window_is_valid() {
        assert!(draft(30).validate().is_ok());
    }

    #[test]
    fn empty_window_is_rejected() {
        assert!(draft(0).validate().is_err());
    }

    #[test]
    fn inverted_window_is_rejected() {
        assert!(draft(-10).validate().is_err());
    }
}
