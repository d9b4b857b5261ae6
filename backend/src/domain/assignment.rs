//! Animal-to-event assignments, the unit of scheduling.
//!
//! An assignment moves through `assigned → checked_out → checked_in`; the
//! final state is terminal for that link. An assignment may be removed while
//! `assigned`, but never while the animal is physically in the field.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle state of an assignment link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentState {
    /// Linked to the event, no physical checkout yet.
    Assigned,
    /// Animal is in the field for this event.
    CheckedOut,
    /// Round trip complete; terminal.
    CheckedIn,
}

/// Stored timestamps violate the lifecycle ordering.
///
/// `checked_in` without `checked_out` cannot be produced by the state
/// machine; seeing it means the stored row is corrupt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("assignment {assignment_id} has a check-in without a checkout")]
pub struct CorruptAssignment {
    pub assignment_id: i32,
}

/// The join row linking an animal to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnimalAssignment {
    pub id: i32,
    pub animal_id: i32,
    pub event_id: i32,
    /// Staff member who performed the checkout.
    pub user_out_id: Option<i32>,
    /// Staff member who performed the check-in.
    pub user_in_id: Option<i32>,
    pub checked_out: Option<DateTime<Utc>>,
    pub checked_in: Option<DateTime<Utc>>,
}

impl AnimalAssignment {
    /// Derive the lifecycle state from the stored timestamps.
    pub fn state(&self) -> Result<AssignmentState, CorruptAssignment> {
        match (self.checked_out, self.checked_in) {
            (None, None) => Ok(AssignmentState::Assigned),
            (Some(_), None) => Ok(AssignmentState::CheckedOut),
            (Some(_), Some(_)) => Ok(AssignmentState::CheckedIn),
            (None, Some(_)) => Err(CorruptAssignment {
                assignment_id: self.id,
            }),
        }
    }

    /// Duration in the field, available once both timestamps are set.
    pub fn duration(&self) -> Option<Duration> {
        match (self.checked_out, self.checked_in) {
            (Some(out), Some(r#in)) => Some(r#in - out),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn link(checked_out: bool, checked_in: bool) -> AnimalAssignment {
        let now = Utc::now();
        AnimalAssignment {
            id: 1,
            animal_id: 2,
            event_id: 3,
            user_out_id: checked_out.then_some(9),
            user_in_id: checked_in.then_some(9),
            checked_out: checked_out.then(|| now - chrono::Duration::hours(1)),
            checked_in: checked_in.then_some(now),
        }
    }

    #[test]
    fn states_follow_timestamps() {
        assert_eq!(link(false, false).state(), Ok(AssignmentState::Assigned));
        assert_eq!(link(true, false).state(), Ok(AssignmentState::CheckedOut));
        assert_eq!(link(true, true).state(), Ok(AssignmentState::CheckedIn));
    }

    #[test]
    fn check_in_without_checkout_is_corrupt() {
        let mut row = link(true, true);
        row.checked_out = None;
        let err = row.state().expect_err("corrupt row");
        assert_eq!(err.assignment_id, 1);
    }

    #[test]
    fn duration_spans_the_round_trip() {
        let row = link(true, true);
        assert_eq!(row.duration(), Some(chrono::Duration::hours(1)));
        assert_eq!(link(true, false).duration(), None);
    }
}
