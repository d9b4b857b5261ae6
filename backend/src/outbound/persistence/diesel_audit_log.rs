//! PostgreSQL-backed `AuditLog` implementation using Diesel ORM.
//!
//! History reads go through this adapter. All writes happen inside the
//! repository transactions via [`insert_audit_entries`], so the trail
//! commits atomically with the mutation it describes.

use std::str::FromStr;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::domain::audit::{AuditAction, AuditEntry, AuditRecord};
use crate::domain::ports::{AuditLog, AuditLogError};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{AuditRow, NewAuditRow};
use super::pool::{DbPool, PoolError};
use super::schema::animal_audits;

/// Diesel-backed implementation of the audit log port.
#[derive(Clone)]
pub struct DieselAuditLog {
    pool: DbPool,
}

impl DieselAuditLog {
    /// Create a new audit log over the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Insert a batch of audit entries on an existing connection.
///
/// Called from repository transactions so the entries share the
/// transaction's fate.
pub(crate) async fn insert_audit_entries(
    conn: &mut AsyncPgConnection,
    entries: &[AuditEntry],
) -> Result<usize, diesel::result::Error> {
    if entries.is_empty() {
        return Ok(0);
    }
    let rows: Vec<NewAuditRow<'_>> = entries.iter().map(NewAuditRow::from_entry).collect();
    diesel::insert_into(animal_audits::table)
        .values(&rows)
        .execute(conn)
        .await
}

fn map_pool(error: PoolError) -> AuditLogError {
    map_pool_error(error, AuditLogError::connection)
}

fn map_diesel(error: diesel::result::Error) -> AuditLogError {
    map_diesel_error(error, AuditLogError::query, AuditLogError::connection)
}

fn row_to_record(row: AuditRow) -> Result<AuditRecord, AuditLogError> {
    let action = AuditAction::from_str(&row.action)
        .map_err(|err| AuditLogError::query(err.to_string()))?;
    Ok(AuditRecord {
        id: row.id,
        animal_id: row.animal_id,
        changed_by: row.changed_by,
        action,
        changed_field: row.changed_field,
        old_value: row.old_value,
        new_value: row.new_value,
        description: row.description,
        changed_at: row.changed_at,
    })
}

#[async_trait]
impl AuditLog for DieselAuditLog {
    async fn history(&self, animal_id: i32) -> Result<Vec<AuditRecord>, AuditLogError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let rows: Vec<AuditRow> = animal_audits::table
            .filter(animal_audits::animal_id.eq(animal_id))
            .select(AuditRow::as_select())
            .order_by((animal_audits::changed_at.desc(), animal_audits::id.desc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;
        rows.into_iter().map(row_to_record).collect()
    }
}
