//! Port onto the external role and permission store.
//!
//! The store itself (roles, capability lists, sessions) is an external
//! collaborator; the core only resolves an acting staff member and asks
//! the returned [`Actor`] about opaque capability names.

use async_trait::async_trait;

use crate::domain::actor::Actor;

/// Errors raised by actor directory adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActorDirectoryError {
    /// Directory connection could not be established.
    #[error("actor directory connection failed: {message}")]
    Connection { message: String },

    /// Lookup failed during execution.
    #[error("actor directory query failed: {message}")]
    Query { message: String },
}

impl ActorDirectoryError {
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

/// Port resolving actor ids to their tier and capability set.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActorDirectory: Send + Sync {
    /// Find an actor by id.
    async fn find_actor(&self, actor_id: i32) -> Result<Option<Actor>, ActorDirectoryError>;
}

/// Fixture implementation that knows no actors.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureActorDirectory;

#[async_trait]
impl ActorDirectory for FixtureActorDirectory {
    async fn find_actor(&self, _actor_id: i32) -> Result<Option<Actor>, ActorDirectoryError> {
        Ok(None)
    }
}
