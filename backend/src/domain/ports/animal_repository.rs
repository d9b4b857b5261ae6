//! Port for animal registry reads, daily usage aggregates, and the
//! registry writes owned by administrators.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::animal::{Animal, AnimalStatus};
use crate::domain::audit::AuditEntry;
use crate::domain::availability::DailyUsage;

/// Errors raised by animal repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnimalRepositoryError {
    /// Repository connection could not be established.
    #[error("animal repository connection failed: {message}")]
    Connection { message: String },

    /// Query or mutation failed during execution.
    #[error("animal repository query failed: {message}")]
    Query { message: String },

    /// The requested write clashed with concurrent scheduling state.
    #[error("animal repository conflict: {message}")]
    Conflict { message: String },
}

impl AnimalRepositoryError {
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

/// Filter for listing animals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnimalFilter {
    /// Restrict to these animal ids.
    pub ids: Option<Vec<i32>>,
    /// Restrict to one facility.
    pub zoo_id: Option<i32>,
}

/// Rows removed by a cascading animal delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub assignments_deleted: u64,
    pub audits_deleted: u64,
}

/// Port for reading animals and applying administrator-owned writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnimalRepository: Send + Sync {
    /// Find an animal by id.
    async fn find_by_id(&self, animal_id: i32) -> Result<Option<Animal>, AnimalRepositoryError>;

    /// List animals matching the filter.
    async fn list(&self, filter: AnimalFilter) -> Result<Vec<Animal>, AnimalRepositoryError>;

    /// Aggregate the given animals' completed checkouts for one calendar
    /// day: count and summed duration of assignments checked in that day.
    async fn daily_usage(
        &self,
        animal_ids: &[i32],
        day: NaiveDate,
    ) -> Result<HashMap<i32, DailyUsage>, AnimalRepositoryError>;

    /// Set an animal's stored status, persisting the audit entries in the
    /// same transaction. `last_checkin_time` is untouched; only the
    /// check-in transition starts a rest window.
    async fn set_status(
        &self,
        animal_id: i32,
        status: AnimalStatus,
        audit: &[AuditEntry],
    ) -> Result<(), AnimalRepositoryError>;

    /// Delete an animal together with its dependent assignment and audit
    /// rows in one transaction. Fails with [`AnimalRepositoryError::Conflict`]
    /// if the animal is in the field when the rows are locked.
    async fn delete_cascade(&self, animal_id: i32) -> Result<CascadeReport, AnimalRepositoryError>;
}

/// Fixture implementation for wiring paths that never touch the registry.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAnimalRepository;

#[async_trait]
impl AnimalRepository for FixtureAnimalRepository {
    async fn find_by_id(&self, _animal_id: i32) -> Result<Option<Animal>, AnimalRepositoryError> {
        Ok(None)
    }

    async fn list(&self, _filter: AnimalFilter) -> Result<Vec<Animal>, AnimalRepositoryError> {
        Ok(Vec::new())
    }

    async fn daily_usage(
        &self,
        _animal_ids: &[i32],
        _day: NaiveDate,
    ) -> Result<HashMap<i32, DailyUsage>, AnimalRepositoryError> {
        Ok(HashMap::new())
    }

    async fn set_status(
        &self,
        _animal_id: i32,
        _status: AnimalStatus,
        _audit: &[AuditEntry],
    ) -> Result<(), AnimalRepositoryError> {
        Ok(())
    }

    async fn delete_cascade(
        &self,
        _animal_id: i32,
    ) -> Result<CascadeReport, AnimalRepositoryError> {
        Ok(CascadeReport::default())
    }
}
