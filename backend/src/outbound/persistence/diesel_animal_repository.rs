//! PostgreSQL-backed `AnimalRepository` implementation using Diesel ORM.

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{Days, NaiveDate, NaiveTime};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::animal::{Animal, AnimalStatus};
use crate::domain::audit::AuditEntry;
use crate::domain::availability::DailyUsage;
use crate::domain::ports::{
    AnimalFilter, AnimalRepository, AnimalRepositoryError, CascadeReport,
};

use super::diesel_audit_log::insert_audit_entries;
use super::error_mapping::{TxError, map_diesel_error, map_pool_error, map_tx_error};
use super::models::AnimalRow;
use super::pool::{DbPool, PoolError};
use super::schema::{animal_audits, animal_events, animals};

/// Diesel-backed implementation of the animal repository port.
#[derive(Clone)]
pub struct DieselAnimalRepository {
    pool: DbPool,
}

impl DieselAnimalRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> AnimalRepositoryError {
    map_pool_error(error, AnimalRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> AnimalRepositoryError {
    map_diesel_error(
        error,
        AnimalRepositoryError::query,
        AnimalRepositoryError::connection,
    )
}

fn map_tx(error: TxError) -> AnimalRepositoryError {
    map_tx_error(
        error,
        AnimalRepositoryError::query,
        AnimalRepositoryError::connection,
        AnimalRepositoryError::conflict,
    )
}

pub(crate) fn row_to_animal(row: AnimalRow) -> Result<Animal, String> {
    let status = AnimalStatus::from_str(&row.status).map_err(|err| err.to_string())?;
    Ok(Animal {
        id: row.id,
        name: row.name,
        species: row.species,
        description: row.description,
        image: row.image,
        zoo_id: row.zoo_id,
        tier: row.tier,
        max_daily_checkouts: row.max_daily_checkouts,
        max_daily_checkout_hours: row.max_daily_checkout_hours,
        rest_time: row.rest_time,
        handling_enabled: row.handling_enabled,
        status,
        last_checkin_time: row.last_checkin_time,
    })
}

#[async_trait]
impl AnimalRepository for DieselAnimalRepository {
    async fn find_by_id(&self, animal_id: i32) -> Result<Option<Animal>, AnimalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let row: Option<AnimalRow> = animals::table
            .find(animal_id)
            .select(AnimalRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;
        row.map(|row| row_to_animal(row).map_err(AnimalRepositoryError::query))
            .transpose()
    }

    async fn list(&self, filter: AnimalFilter) -> Result<Vec<Animal>, AnimalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let mut query = animals::table
            .select(AnimalRow::as_select())
            .order_by(animals::id)
            .into_boxed();
        if let Some(ids) = filter.ids {
            query = query.filter(animals::id.eq_any(ids));
        }
        if let Some(zoo_id) = filter.zoo_id {
            query = query.filter(animals::zoo_id.eq(zoo_id));
        }
        let rows: Vec<AnimalRow> = query.load(&mut conn).await.map_err(map_diesel)?;
        rows.into_iter()
            .map(|row| row_to_animal(row).map_err(AnimalRepositoryError::query))
            .collect()
    }

    async fn daily_usage(
        &self,
        animal_ids: &[i32],
        day: NaiveDate,
    ) -> Result<HashMap<i32, DailyUsage>, AnimalRepositoryError> {
        if animal_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let day_start = day.and_time(NaiveTime::MIN).and_utc();
        let day_end = day
            .checked_add_days(Days::new(1))
            .ok_or_else(|| AnimalRepositoryError::query("date out of range"))?
            .and_time(NaiveTime::MIN)
            .and_utc();

        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let rows: Vec<(i32, i64, Option<i64>)> = animal_events::table
            .filter(animal_events::animal_id.eq_any(animal_ids))
            .filter(animal_events::checked_in.ge(day_start))
            .filter(animal_events::checked_in.lt(day_end))
            .group_by(animal_events::animal_id)
            .select((
                animal_events::animal_id,
                diesel::dsl::count_star(),
                diesel::dsl::sum(animal_events::duration_seconds),
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        Ok(rows
            .into_iter()
            .map(|(animal_id, checkout_count, total_seconds)| {
                let seconds = total_seconds.unwrap_or(0);
                (
                    animal_id,
                    DailyUsage {
                        checkout_count,
                        checkout_hours: seconds as f64 / 3600.0,
                    },
                )
            })
            .collect())
    }

    async fn set_status(
        &self,
        animal_id: i32,
        status: AnimalStatus,
        audit: &[AuditEntry],
    ) -> Result<(), AnimalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                let updated = diesel::update(animals::table.find(animal_id))
                    .set(animals::status.eq(status.as_str()))
                    .execute(conn)
                    .await?;
                if updated == 0 {
                    return Err(TxError::Diesel(diesel::result::Error::NotFound));
                }
                insert_audit_entries(conn, audit).await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_tx)
    }

    async fn delete_cascade(
        &self,
        animal_id: i32,
    ) -> Result<CascadeReport, AnimalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                let row: AnimalRow = animals::table
                    .find(animal_id)
                    .for_update()
                    .select(AnimalRow::as_select())
                    .first(conn)
                    .await?;
                if row.status == AnimalStatus::CheckedOut.as_str() {
                    return Err(TxError::Conflict(
                        "Animal is currently checked out".to_owned(),
                    ));
                }

                let assignments_deleted = diesel::delete(
                    animal_events::table.filter(animal_events::animal_id.eq(animal_id)),
                )
                .execute(conn)
                .await?;
                let audits_deleted = diesel::delete(
                    animal_audits::table.filter(animal_audits::animal_id.eq(animal_id)),
                )
                .execute(conn)
                .await?;
                diesel::delete(animals::table.find(animal_id))
                    .execute(conn)
                    .await?;

                Ok(CascadeReport {
                    assignments_deleted: assignments_deleted as u64,
                    audits_deleted: audits_deleted as u64,
                })
            }
            .scope_boxed()
        })
        .await
        .map_err(map_tx)
    }
}
