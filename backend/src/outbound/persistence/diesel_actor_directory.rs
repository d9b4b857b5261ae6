//! PostgreSQL-backed `ActorDirectory` implementation using Diesel ORM.
//!
//! Staff accounts and role grants are maintained by the staff administration
//! system; this adapter only reads them.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::actor::Actor;
use crate::domain::ports::{ActorDirectory, ActorDirectoryError};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::pool::{DbPool, PoolError};
use super::schema::{role_capabilities, roles, users};

/// Diesel-backed implementation of the actor directory port.
#[derive(Clone)]
pub struct DieselActorDirectory {
    pool: DbPool,
}

impl DieselActorDirectory {
    /// Create a new directory over the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> ActorDirectoryError {
    map_pool_error(error, ActorDirectoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> ActorDirectoryError {
    map_diesel_error(
        error,
        ActorDirectoryError::query,
        ActorDirectoryError::connection,
    )
}

#[async_trait]
impl ActorDirectory for DieselActorDirectory {
    async fn find_actor(&self, actor_id: i32) -> Result<Option<Actor>, ActorDirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let row: Option<(i32, String, i32, String, i16)> = users::table
            .inner_join(roles::table)
            .filter(users::id.eq(actor_id))
            .select((
                users::id,
                users::name,
                users::role_id,
                roles::name,
                users::tier,
            ))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;
        let Some((id, display_name, role_id, role_name, tier)) = row else {
            return Ok(None);
        };

        let capabilities: Vec<String> = role_capabilities::table
            .filter(role_capabilities::role_id.eq(role_id))
            .select(role_capabilities::capability)
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        Ok(Some(Actor::new(
            id,
            display_name,
            role_name,
            tier,
            capabilities,
        )))
    }
}
