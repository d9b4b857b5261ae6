//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly; Diesel uses
//! them for compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// Animal registry.
    animals (id) {
        id -> Int4,
        name -> Varchar,
        species -> Varchar,
        description -> Nullable<Text>,
        image -> Nullable<Varchar>,
        zoo_id -> Int4,
        /// Clearance tier required to handle this animal (1-4).
        tier -> Int2,
        max_daily_checkouts -> Int4,
        max_daily_checkout_hours -> Float8,
        /// Mandatory rest after a check-in, in hours.
        rest_time -> Float8,
        handling_enabled -> Bool,
        /// Stored status string: checked_in, checked_out, or unavailable.
        status -> Varchar,
        last_checkin_time -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Scheduled events.
    events (id) {
        id -> Int4,
        name -> Varchar,
        description -> Text,
        zoo_id -> Int4,
        event_type_id -> Int4,
        start_at -> Timestamptz,
        end_at -> Timestamptz,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Animal-to-event assignment links with checkout stamps.
    animal_events (id) {
        id -> Int4,
        animal_id -> Int4,
        event_id -> Int4,
        user_out_id -> Nullable<Int4>,
        user_in_id -> Nullable<Int4>,
        checked_out -> Nullable<Timestamptz>,
        checked_in -> Nullable<Timestamptz>,
        /// Time in the field, set at check-in.
        duration_seconds -> Nullable<Int4>,
    }
}

diesel::table! {
    /// Append-only audit trail for animal state changes.
    animal_audits (id) {
        id -> Int4,
        animal_id -> Int4,
        changed_by -> Int4,
        action -> Varchar,
        changed_field -> Nullable<Varchar>,
        old_value -> Nullable<Text>,
        new_value -> Nullable<Text>,
        description -> Nullable<Text>,
        changed_at -> Timestamptz,
    }
}

diesel::table! {
    /// Staff accounts, maintained by the external role store.
    users (id) {
        id -> Int4,
        name -> Varchar,
        role_id -> Int4,
        /// Clearance tier (1-4).
        tier -> Int2,
    }
}

diesel::table! {
    /// Staff roles.
    roles (id) {
        id -> Int4,
        name -> Varchar,
    }
}

diesel::table! {
    /// Capability names granted to a role.
    role_capabilities (id) {
        id -> Int4,
        role_id -> Int4,
        capability -> Varchar,
    }
}

diesel::joinable!(animal_events -> animals (animal_id));
diesel::joinable!(animal_events -> events (event_id));
diesel::joinable!(animal_audits -> animals (animal_id));
diesel::joinable!(users -> roles (role_id));
diesel::joinable!(role_capabilities -> roles (role_id));

diesel::allow_tables_to_appear_in_same_query!(
    animals,
    events,
    animal_events,
    animal_audits,
    users,
    roles,
    role_capabilities,
);
