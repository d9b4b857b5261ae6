//! Port for reading the append-only audit trail.
//!
//! Every write rides in a repository transaction alongside the mutation it
//! describes, so the trail has no standalone write path; this port covers
//! the chronological read used by reporting views. Records are never
//! mutated after insertion.

use async_trait::async_trait;

use crate::domain::audit::AuditRecord;

/// Errors raised by audit log adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuditLogError {
    /// Repository connection could not be established.
    #[error("audit log connection failed: {message}")]
    Connection { message: String },

    /// Read failed during execution.
    #[error("audit log query failed: {message}")]
    Query { message: String },
}

impl AuditLogError {
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
}

/// Port for reading audit records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Read an animal's history, newest first.
    async fn history(&self, animal_id: i32) -> Result<Vec<AuditRecord>, AuditLogError>;
}

/// Fixture implementation that reports no history.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAuditLog;

#[async_trait]
impl AuditLog for FixtureAuditLog {
    async fn history(&self, _animal_id: i32) -> Result<Vec<AuditRecord>, AuditLogError> {
        Ok(Vec::new())
    }
}
