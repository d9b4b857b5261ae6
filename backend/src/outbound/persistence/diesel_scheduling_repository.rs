//! PostgreSQL-backed `SchedulingRepository` implementation using Diesel ORM.
//!
//! Each transition method is one transaction. Assignment and animal rows are
//! locked with `FOR UPDATE` and the lifecycle preconditions re-verified under
//! the lock, so two staff members racing the same transition cannot both
//! succeed; the loser sees a conflict.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::domain::animal::AnimalStatus;
use crate::domain::assignment::AnimalAssignment;
use crate::domain::audit::AuditEntry;
use crate::domain::conflict::BusyInterval;
use crate::domain::event::{Event, EventDraft};
use crate::domain::ports::{
    CheckInStamp, CheckoutStamp, SchedulingRepository, SchedulingRepositoryError,
};

use super::diesel_audit_log::insert_audit_entries;
use super::error_mapping::{TxError, map_diesel_error, map_pool_error, map_tx_error};
use super::models::{AssignmentRow, EventChangeset, EventRow, NewAssignmentRow, NewEventRow};
use super::pool::{DbPool, PoolError};
use super::schema::{animal_events, animals, events};

/// Diesel-backed implementation of the scheduling repository port.
#[derive(Clone)]
pub struct DieselSchedulingRepository {
    pool: DbPool,
}

impl DieselSchedulingRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> SchedulingRepositoryError {
    map_pool_error(error, SchedulingRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> SchedulingRepositoryError {
    map_diesel_error(
        error,
        SchedulingRepositoryError::query,
        SchedulingRepositoryError::connection,
    )
}

fn map_tx(error: TxError) -> SchedulingRepositoryError {
    map_tx_error(
        error,
        SchedulingRepositoryError::query,
        SchedulingRepositoryError::connection,
        SchedulingRepositoryError::conflict,
    )
}

fn row_to_event(row: EventRow) -> Event {
    Event {
        id: row.id,
        name: row.name,
        description: row.description,
        zoo_id: row.zoo_id,
        event_type_id: row.event_type_id,
        start_at: row.start_at,
        end_at: row.end_at,
    }
}

fn row_to_assignment(row: AssignmentRow) -> AnimalAssignment {
    AnimalAssignment {
        id: row.id,
        animal_id: row.animal_id,
        event_id: row.event_id,
        user_out_id: row.user_out_id,
        user_in_id: row.user_in_id,
        checked_out: row.checked_out,
        checked_in: row.checked_in,
    }
}

fn draft_changeset(draft: &EventDraft) -> EventChangeset<'_> {
    EventChangeset {
        name: &draft.name,
        description: &draft.description,
        zoo_id: draft.zoo_id,
        event_type_id: draft.event_type_id,
        start_at: draft.start_at,
        end_at: draft.end_at,
    }
}

/// Lock the assignment links for the given animals on one event.
async fn lock_links(
    conn: &mut AsyncPgConnection,
    event_id: i32,
    animal_ids: &[i32],
) -> Result<Vec<AssignmentRow>, TxError> {
    let rows: Vec<AssignmentRow> = animal_events::table
        .filter(animal_events::event_id.eq(event_id))
        .filter(animal_events::animal_id.eq_any(animal_ids))
        .for_update()
        .select(AssignmentRow::as_select())
        .load(conn)
        .await?;
    if rows.len() != animal_ids.len() {
        return Err(TxError::Diesel(diesel::result::Error::NotFound));
    }
    Ok(rows)
}

/// Lock the animals, verify they are all in their home state, and flip them
/// to `checked_out`.
async fn flip_animals_out(
    conn: &mut AsyncPgConnection,
    animal_ids: &[i32],
) -> Result<(), TxError> {
    let rows: Vec<(String, String)> = animals::table
        .filter(animals::id.eq_any(animal_ids))
        .for_update()
        .select((animals::name, animals::status))
        .load(conn)
        .await?;
    for (name, status) in &rows {
        if status == AnimalStatus::CheckedOut.as_str() {
            return Err(TxError::Conflict(format!(
                "Animal {name} is already checked out"
            )));
        }
        if status != AnimalStatus::CheckedIn.as_str() {
            return Err(TxError::Conflict(format!("Animal {name} is unavailable")));
        }
    }
    diesel::update(animals::table.filter(animals::id.eq_any(animal_ids)))
        .set(animals::status.eq(AnimalStatus::CheckedOut.as_str()))
        .execute(conn)
        .await?;
    Ok(())
}

/// Remove assignment links, refusing to drop a link whose animal is in the
/// field for the event.
async fn remove_links(
    conn: &mut AsyncPgConnection,
    event_id: i32,
    animal_ids: &[i32],
) -> Result<(), TxError> {
    if animal_ids.is_empty() {
        return Ok(());
    }
    let rows: Vec<AssignmentRow> = animal_events::table
        .filter(animal_events::event_id.eq(event_id))
        .filter(animal_events::animal_id.eq_any(animal_ids))
        .for_update()
        .select(AssignmentRow::as_select())
        .load(conn)
        .await?;
    for row in &rows {
        if row.checked_out.is_some() && row.checked_in.is_none() {
            return Err(TxError::Conflict(format!(
                "animal {} is checked out for this event, can't be removed",
                row.animal_id
            )));
        }
    }
    diesel::delete(
        animal_events::table
            .filter(animal_events::event_id.eq(event_id))
            .filter(animal_events::animal_id.eq_any(animal_ids)),
    )
    .execute(conn)
    .await?;
    Ok(())
}

async fn add_links(
    conn: &mut AsyncPgConnection,
    event_id: i32,
    animal_ids: &[i32],
    checkout: Option<CheckoutStamp>,
) -> Result<(), TxError> {
    if animal_ids.is_empty() {
        return Ok(());
    }
    let links: Vec<NewAssignmentRow> = animal_ids
        .iter()
        .map(|&animal_id| NewAssignmentRow {
            animal_id,
            event_id,
            user_out_id: checkout.map(|stamp| stamp.user_id),
            checked_out: checkout.map(|stamp| stamp.at),
        })
        .collect();
    diesel::insert_into(animal_events::table)
        .values(&links)
        .execute(conn)
        .await?;
    Ok(())
}

#[async_trait]
impl SchedulingRepository for DieselSchedulingRepository {
    async fn find_event(&self, event_id: i32) -> Result<Option<Event>, SchedulingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let row: Option<EventRow> = events::table
            .find(event_id)
            .select(EventRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;
        Ok(row.map(row_to_event))
    }

    async fn busy_intervals(
        &self,
        animal_ids: &[i32],
        zoo_id: i32,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
        exclude_event_id: Option<i32>,
    ) -> Result<Vec<BusyInterval>, SchedulingRepositoryError> {
        if animal_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let mut query = animal_events::table
            .inner_join(events::table)
            .inner_join(animals::table)
            .filter(animal_events::animal_id.eq_any(animal_ids))
            .filter(events::zoo_id.eq(zoo_id))
            .filter(events::start_at.le(end_at))
            .filter(events::end_at.ge(start_at))
            .select((
                animal_events::animal_id,
                animals::name,
                events::start_at,
                events::end_at,
            ))
            .into_boxed();
        if let Some(exclude) = exclude_event_id {
            query = query.filter(animal_events::event_id.ne(exclude));
        }
        let rows: Vec<(i32, String, DateTime<Utc>, DateTime<Utc>)> = query
            .order_by(events::start_at)
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        Ok(rows
            .into_iter()
            .map(|(animal_id, animal_name, start_at, end_at)| BusyInterval {
                animal_id,
                animal_name,
                start_at,
                end_at,
            })
            .collect())
    }

    async fn assignments_for_event(
        &self,
        event_id: i32,
    ) -> Result<Vec<AnimalAssignment>, SchedulingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let rows: Vec<AssignmentRow> = animal_events::table
            .filter(animal_events::event_id.eq(event_id))
            .select(AssignmentRow::as_select())
            .order_by(animal_events::id)
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;
        Ok(rows.into_iter().map(row_to_assignment).collect())
    }

    async fn create_event(
        &self,
        draft: &EventDraft,
        animal_ids: &[i32],
        checkout: Option<CheckoutStamp>,
        audit: &[AuditEntry],
    ) -> Result<Event, SchedulingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let row = conn
            .transaction::<EventRow, TxError, _>(|conn| {
                async move {
                    let row: EventRow = diesel::insert_into(events::table)
                        .values(NewEventRow {
                            name: &draft.name,
                            description: &draft.description,
                            zoo_id: draft.zoo_id,
                            event_type_id: draft.event_type_id,
                            start_at: draft.start_at,
                            end_at: draft.end_at,
                        })
                        .returning(EventRow::as_returning())
                        .get_result(conn)
                        .await?;
                    add_links(conn, row.id, animal_ids, checkout).await?;
                    if checkout.is_some() {
                        flip_animals_out(conn, animal_ids).await?;
                    }
                    insert_audit_entries(conn, audit).await?;
                    Ok(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_tx)?;
        Ok(row_to_event(row))
    }

    async fn update_event(
        &self,
        event_id: i32,
        draft: &EventDraft,
        add_animal_ids: &[i32],
        remove_animal_ids: &[i32],
        audit: &[AuditEntry],
    ) -> Result<Event, SchedulingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let row = conn
            .transaction::<EventRow, TxError, _>(|conn| {
                async move {
                    let row: EventRow = diesel::update(events::table.find(event_id))
                        .set(draft_changeset(draft))
                        .returning(EventRow::as_returning())
                        .get_result(conn)
                        .await?;
                    remove_links(conn, event_id, remove_animal_ids).await?;
                    add_links(conn, event_id, add_animal_ids, None).await?;
                    insert_audit_entries(conn, audit).await?;
                    Ok(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_tx)?;
        Ok(row_to_event(row))
    }

    async fn replace_assignments(
        &self,
        event_id: i32,
        add_animal_ids: &[i32],
        remove_animal_ids: &[i32],
        audit: &[AuditEntry],
    ) -> Result<(), SchedulingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                remove_links(conn, event_id, remove_animal_ids).await?;
                add_links(conn, event_id, add_animal_ids, None).await?;
                insert_audit_entries(conn, audit).await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_tx)
    }

    async fn apply_checkout(
        &self,
        event_id: i32,
        animal_ids: &[i32],
        stamp: CheckoutStamp,
        audit: &[AuditEntry],
    ) -> Result<(), SchedulingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                let links = lock_links(conn, event_id, animal_ids).await?;
                for link in &links {
                    if link.checked_out.is_some() {
                        return Err(TxError::Conflict(format!(
                            "animal {} is already checked out for this event",
                            link.animal_id
                        )));
                    }
                }
                flip_animals_out(conn, animal_ids).await?;
                diesel::update(
                    animal_events::table
                        .filter(animal_events::event_id.eq(event_id))
                        .filter(animal_events::animal_id.eq_any(animal_ids)),
                )
                .set((
                    animal_events::checked_out.eq(stamp.at),
                    animal_events::user_out_id.eq(stamp.user_id),
                ))
                .execute(conn)
                .await?;
                insert_audit_entries(conn, audit).await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_tx)
    }

    async fn apply_check_in(
        &self,
        event_id: i32,
        animal_ids: &[i32],
        stamp: CheckInStamp,
        audit: &[AuditEntry],
    ) -> Result<(), SchedulingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                let links = lock_links(conn, event_id, animal_ids).await?;
                for link in &links {
                    match (link.checked_out, link.checked_in) {
                        (Some(_), None) => {}
                        _ => {
                            return Err(TxError::Conflict(format!(
                                "animal {} is not checked out for this event",
                                link.animal_id
                            )));
                        }
                    }
                }
                for link in &links {
                    let Some(out_at) = link.checked_out else {
                        continue;
                    };
                    let seconds =
                        i32::try_from((stamp.at - out_at).num_seconds().max(0)).unwrap_or(i32::MAX);
                    diesel::update(animal_events::table.find(link.id))
                        .set((
                            animal_events::checked_in.eq(stamp.at),
                            animal_events::user_in_id.eq(stamp.user_id),
                            animal_events::duration_seconds.eq(seconds),
                        ))
                        .execute(conn)
                        .await?;
                }
                diesel::update(animals::table.filter(animals::id.eq_any(animal_ids)))
                    .set((
                        animals::status.eq(AnimalStatus::CheckedIn.as_str()),
                        animals::last_checkin_time.eq(stamp.at),
                    ))
                    .execute(conn)
                    .await?;
                insert_audit_entries(conn, audit).await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_tx)
    }
}
