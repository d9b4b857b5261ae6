//! Shared error translation for the Diesel adapters.

use tracing::debug;

use super::pool::PoolError;

/// Failure raised inside an adapter transaction.
///
/// Carries either a Diesel error or a lifecycle conflict detected under row
/// locks, so the whole transaction rolls back on either.
#[derive(Debug)]
pub(crate) enum TxError {
    Diesel(diesel::result::Error),
    /// A precondition failed once the rows were locked. The message is the
    /// user-facing conflict reason.
    Conflict(String),
}

impl From<diesel::result::Error> for TxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

/// Map a pool failure into a repository-specific connection error.
pub(crate) fn map_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Map Diesel errors into query/connection constructors, logging the
/// underlying failure at debug level.
pub(crate) fn map_diesel_error<E, Q, C>(error: diesel::result::Error, query: Q, connection: C) -> E
where
    Q: FnOnce(String) -> E,
    C: FnOnce(String) -> E,
{
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error".to_owned())
        }
        DieselError::DatabaseError(kind, _) => query(format!("database error: {kind:?}")),
        other => query(other.to_string()),
    }
}

/// Map a transaction failure, routing conflicts to their own constructor.
pub(crate) fn map_tx_error<E, Q, C, K>(error: TxError, query: Q, connection: C, conflict: K) -> E
where
    Q: FnOnce(String) -> E,
    C: FnOnce(String) -> E,
    K: FnOnce(String) -> E,
{
    match error {
        TxError::Diesel(inner) => map_diesel_error(inner, query, connection),
        TxError::Conflict(message) => conflict(message),
    }
}
