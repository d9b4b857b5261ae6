//! Append-only audit trail for animal state changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Actions recorded against an animal's audit history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    AnimalCreated,
    AnimalUpdated,
    AnimalDeleted,
    CheckedIn,
    CheckedOut,
    CommentAdded,
    CommentUpdated,
    HealthLogAdded,
    HealthLogUpdated,
    ActivityLogged,
    GroupAdded,
    GroupRemoved,
    TierChanged,
    MaxDailyCheckoutsChanged,
    MaxCheckoutHoursChanged,
    RestTimeChanged,
    ImageUpdated,
    RoleAssigned,
    RoleUpdated,
    EventParticipationAdded,
    EventParticipationRemoved,
    ZooChanged,
    AnimalStatusChanged,
    RestTimeStarted,
}

impl AuditAction {
    /// Canonical storage string for this action.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AnimalCreated => "animal_created",
            Self::AnimalUpdated => "animal_updated",
            Self::AnimalDeleted => "animal_deleted",
            Self::CheckedIn => "checked_in",
            Self::CheckedOut => "checked_out",
            Self::CommentAdded => "comment_added",
            Self::CommentUpdated => "comment_updated",
            Self::HealthLogAdded => "health_log_added",
            Self::HealthLogUpdated => "health_log_updated",
            Self::ActivityLogged => "activity_logged",
            Self::GroupAdded => "group_added",
            Self::GroupRemoved => "group_removed",
            Self::TierChanged => "tier_changed",
            Self::MaxDailyCheckoutsChanged => "max_daily_checkouts_changed",
            Self::MaxCheckoutHoursChanged => "max_checkout_hours_changed",
            Self::RestTimeChanged => "rest_time_changed",
            Self::ImageUpdated => "image_updated",
            Self::RoleAssigned => "role_assigned",
            Self::RoleUpdated => "role_updated",
            Self::EventParticipationAdded => "event_participation_added",
            Self::EventParticipationRemoved => "event_participation_removed",
            Self::ZooChanged => "zoo_changed",
            Self::AnimalStatusChanged => "animal_status_changed",
            Self::RestTimeStarted => "rest_time_started",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored action string outside the enumeration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid audit action {value:?}")]
pub struct InvalidAuditAction {
    pub value: String,
}

impl std::str::FromStr for AuditAction {
    type Err = InvalidAuditAction;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(value.to_owned())).map_err(|_| {
            InvalidAuditAction {
                value: value.to_owned(),
            }
        })
    }
}

/// An audit entry pending persistence.
///
/// Entries produced during a transition are persisted in the same
/// transaction as the state mutation so a crash cannot leave the trail and
/// the registry disagreeing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub animal_id: i32,
    pub changed_by: i32,
    pub action: AuditAction,
    pub changed_field: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub description: Option<String>,
}

impl AuditEntry {
    /// Start an entry for the given animal, actor, and action.
    pub fn new(animal_id: i32, changed_by: i32, action: AuditAction) -> Self {
        Self {
            animal_id,
            changed_by,
            action,
            changed_field: None,
            old_value: None,
            new_value: None,
            description: None,
        }
    }

    /// Record the field transition captured by this entry.
    pub fn with_field_change(
        mut self,
        field: impl Into<String>,
        old_value: impl Into<String>,
        new_value: impl Into<String>,
    ) -> Self {
        self.changed_field = Some(field.into());
        self.old_value = Some(old_value.into());
        self.new_value = Some(new_value.into());
        self
    }

    /// Attach a human-readable description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A persisted audit record, read chronologically by reporting views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub id: i32,
    pub animal_id: i32,
    pub changed_by: i32,
    pub action: AuditAction,
    pub changed_field: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub description: Option<String>,
    pub changed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn actions_round_trip_through_storage_strings() {
        for action in [
            AuditAction::CheckedOut,
            AuditAction::AnimalStatusChanged,
            AuditAction::RestTimeStarted,
            AuditAction::MaxCheckoutHoursChanged,
        ] {
            assert_eq!(AuditAction::from_str(action.as_str()), Ok(action));
        }
    }

    #[test]
    fn unknown_action_string_is_rejected() {
        assert!(AuditAction::from_str("status_flipped").is_err());
    }

    #[test]
    fn builder_captures_field_transition() {
        let entry = AuditEntry::new(1, 2, AuditAction::AnimalStatusChanged)
            .with_field_change("status", "checked_in", "checked_out")
            .with_description("checked out to event 'Falconry'");

        assert_eq!(entry.changed_field.as_deref(), Some("status"));
        assert_eq!(entry.old_value.as_deref(), Some("checked_in"));
        assert_eq!(entry.new_value.as_deref(), Some("checked_out"));
        assert!(entry.description.is_some());
    }
}
