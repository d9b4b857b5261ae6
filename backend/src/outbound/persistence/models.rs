//! Internal Diesel row structs for database operations.
//!
//! Implementation details of the persistence layer, never exposed to the
//! domain. Timestamp bookkeeping columns are deliberately absent from the
//! read structs; `Selectable` limits the projection to the fields listed.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::audit::AuditEntry;

use super::schema::{animal_audits, animal_events, animals, events};

/// Row struct for reading from the animals table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = animals)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AnimalRow {
    pub id: i32,
    pub name: String,
    pub species: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub zoo_id: i32,
    pub tier: i16,
    pub max_daily_checkouts: i32,
    pub max_daily_checkout_hours: f64,
    pub rest_time: f64,
    pub handling_enabled: bool,
    pub status: String,
    pub last_checkin_time: Option<DateTime<Utc>>,
}

/// Row struct for reading from the events table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EventRow {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub zoo_id: i32,
    pub event_type_id: i32,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

/// Insertable struct for creating events.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = events)]
pub(crate) struct NewEventRow<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub zoo_id: i32,
    pub event_type_id: i32,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

/// Changeset struct for updating events.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = events)]
pub(crate) struct EventChangeset<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub zoo_id: i32,
    pub event_type_id: i32,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

/// Row struct for reading assignment links.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = animal_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AssignmentRow {
    pub id: i32,
    pub animal_id: i32,
    pub event_id: i32,
    pub user_out_id: Option<i32>,
    pub user_in_id: Option<i32>,
    pub checked_out: Option<DateTime<Utc>>,
    pub checked_in: Option<DateTime<Utc>>,
}

/// Insertable struct for creating assignment links.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = animal_events)]
pub(crate) struct NewAssignmentRow {
    pub animal_id: i32,
    pub event_id: i32,
    pub user_out_id: Option<i32>,
    pub checked_out: Option<DateTime<Utc>>,
}

/// Row struct for reading audit records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = animal_audits)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AuditRow {
    pub id: i32,
    pub animal_id: i32,
    pub changed_by: i32,
    pub action: String,
    pub changed_field: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub description: Option<String>,
    pub changed_at: DateTime<Utc>,
}

/// Insertable struct for appending audit entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = animal_audits)]
pub(crate) struct NewAuditRow<'a> {
    pub animal_id: i32,
    pub changed_by: i32,
    pub action: &'a str,
    pub changed_field: Option<&'a str>,
    pub old_value: Option<&'a str>,
    pub new_value: Option<&'a str>,
    pub description: Option<&'a str>,
}

impl<'a> NewAuditRow<'a> {
    pub(crate) fn from_entry(entry: &'a AuditEntry) -> Self {
        Self {
            animal_id: entry.animal_id,
            changed_by: entry.changed_by,
            action: entry.action.as_str(),
            changed_field: entry.changed_field.as_deref(),
            old_value: entry.old_value.as_deref(),
            new_value: entry.new_value.as_deref(),
            description: entry.description.as_deref(),
        }
    }
}
