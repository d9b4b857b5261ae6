//! Port for events, assignments, and the atomic checkout/check-in
//! transitions.
//!
//! The `apply_*` and `create_*` methods are each one all-or-nothing
//! transaction: adapters lock the animal and assignment rows involved,
//! re-verify the lifecycle preconditions under the lock, and persist the
//! supplied audit entries alongside the state mutation. Losing a race to a
//! concurrent transition surfaces as [`SchedulingRepositoryError::Conflict`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::assignment::AnimalAssignment;
use crate::domain::audit::AuditEntry;
use crate::domain::conflict::BusyInterval;
use crate::domain::event::{Event, EventDraft};

/// Errors raised by scheduling repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulingRepositoryError {
    /// Repository connection could not be established.
    #[error("scheduling repository connection failed: {message}")]
    Connection { message: String },

    /// Query or mutation failed during execution.
    #[error("scheduling repository query failed: {message}")]
    Query { message: String },

    /// A lifecycle precondition failed once the rows were locked.
    #[error("{message}")]
    Conflict { message: String },
}

impl SchedulingRepositoryError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Create a conflict error with the given message.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }
}

/// Timestamp and actor recorded on a checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutStamp {
    pub at: DateTime<Utc>,
    pub user_id: i32,
}

/// Timestamp and actor recorded on a check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckInStamp {
    pub at: DateTime<Utc>,
    pub user_id: i32,
}

/// Port for event scheduling state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SchedulingRepository: Send + Sync {
    /// Find an event by id.
    async fn find_event(&self, event_id: i32) -> Result<Option<Event>, SchedulingRepositoryError>;

    /// Candidate busy intervals for the given animals within one facility,
    /// coarsely pre-filtered to windows overlapping `[start_at, end_at]`.
    /// The pure conflict rule makes the final call.
    async fn busy_intervals(
        &self,
        animal_ids: &[i32],
        zoo_id: i32,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
        exclude_event_id: Option<i32>,
    ) -> Result<Vec<BusyInterval>, SchedulingRepositoryError>;

    /// Assignment links for one event.
    async fn assignments_for_event(
        &self,
        event_id: i32,
    ) -> Result<Vec<AnimalAssignment>, SchedulingRepositoryError>;

    /// Create an event with its assignment links, optionally checking the
    /// animals out at creation time.
    async fn create_event(
        &self,
        draft: &EventDraft,
        animal_ids: &[i32],
        checkout: Option<CheckoutStamp>,
        audit: &[AuditEntry],
    ) -> Result<Event, SchedulingRepositoryError>;

    /// Update an event's fields and apply assignment additions and
    /// removals in the same transaction. Removal of a link whose animal is
    /// in the field fails the whole call.
    async fn update_event(
        &self,
        event_id: i32,
        draft: &EventDraft,
        add_animal_ids: &[i32],
        remove_animal_ids: &[i32],
        audit: &[AuditEntry],
    ) -> Result<Event, SchedulingRepositoryError>;

    /// Add and remove assignment links for one event. Removal of a link
    /// whose animal is in the field fails the whole call.
    async fn replace_assignments(
        &self,
        event_id: i32,
        add_animal_ids: &[i32],
        remove_animal_ids: &[i32],
        audit: &[AuditEntry],
    ) -> Result<(), SchedulingRepositoryError>;

    /// Check the given animals out for one event: stamp the links, flip the
    /// animals to `checked_out`.
    async fn apply_checkout(
        &self,
        event_id: i32,
        animal_ids: &[i32],
        stamp: CheckoutStamp,
        audit: &[AuditEntry],
    ) -> Result<(), SchedulingRepositoryError>;

    /// Check the given animals back in: stamp the links, compute durations,
    /// flip the animals to `checked_in`, and start their rest windows.
    async fn apply_check_in(
        &self,
        event_id: i32,
        animal_ids: &[i32],
        stamp: CheckInStamp,
        audit: &[AuditEntry],
    ) -> Result<(), SchedulingRepositoryError>;
}

/// Fixture implementation for wiring paths that never schedule.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSchedulingRepository;

#[async_trait]
impl SchedulingRepository for FixtureSchedulingRepository {
    async fn find_event(
        &self,
        _event_id: i32,
    ) -> Result<Option<Event>, SchedulingRepositoryError> {
        Ok(None)
    }

    async fn busy_intervals(
        &self,
        _animal_ids: &[i32],
        _zoo_id: i32,
        _start_at: DateTime<Utc>,
        _end_at: DateTime<Utc>,
        _exclude_event_id: Option<i32>,
    ) -> Result<Vec<BusyInterval>, SchedulingRepositoryError> {
        Ok(Vec::new())
    }

    async fn assignments_for_event(
        &self,
        _event_id: i32,
    ) -> Result<Vec<AnimalAssignment>, SchedulingRepositoryError> {
        Ok(Vec::new())
    }

    async fn create_event(
        &self,
        draft: &EventDraft,
        _animal_ids: &[i32],
        _checkout: Option<CheckoutStamp>,
        _audit: &[AuditEntry],
    ) -> Result<Event, SchedulingRepositoryError> {
        Ok(Event {
            id: 0,
            name: draft.name.clone(),
            description: draft.description.clone(),
            zoo_id: draft.zoo_id,
            event_type_id: draft.event_type_id,
            start_at: draft.start_at,
            end_at: draft.end_at,
        })
    }

    async fn update_event(
        &self,
        event_id: i32,
        draft: &EventDraft,
        _add_animal_ids: &[i32],
        _remove_animal_ids: &[i32],
        _audit: &[AuditEntry],
    ) -> Result<Event, SchedulingRepositoryError> {
        Ok(Event {
            id: event_id,
            name: draft.name.clone(),
            description: draft.description.clone(),
            zoo_id: draft.zoo_id,
            event_type_id: draft.event_type_id,
            start_at: draft.start_at,
            end_at: draft.end_at,
        })
    }

    async fn replace_assignments(
        &self,
        _event_id: i32,
        _add_animal_ids: &[i32],
        _remove_animal_ids: &[i32],
        _audit: &[AuditEntry],
    ) -> Result<(), SchedulingRepositoryError> {
        Ok(())
    }

    async fn apply_checkout(
        &self,
        _event_id: i32,
        _animal_ids: &[i32],
        _stamp: CheckoutStamp,
        _audit: &[AuditEntry],
    ) -> Result<(), SchedulingRepositoryError> {
        Ok(())
    }

    async fn apply_check_in(
        &self,
        _event_id: i32,
        _animal_ids: &[i32],
        _stamp: CheckInStamp,
        _audit: &[AuditEntry],
    ) -> Result<(), SchedulingRepositoryError> {
        Ok(())
    }
}
