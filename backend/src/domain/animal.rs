//! Animal registry types.
//!
//! An animal carries its static scheduling configuration (tier, daily
//! quotas, rest time) and its current stored status. Daily counters are
//! never stored on the animal; they are aggregated from today's assignment
//! rows so the registry cannot drift from the canonical event data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stored lifecycle status of an animal.
///
/// `CheckedIn` is the home state; whether the animal may actually be checked
/// out is a derived question answered by [`crate::domain::availability`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AnimalStatus {
    /// At its enclosure and potentially available for checkout.
    CheckedIn,
    /// Committed to an event, currently in the field.
    CheckedOut,
    /// Withdrawn from scheduling by an administrator.
    Unavailable,
}

impl AnimalStatus {
    /// Canonical storage string for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CheckedIn => "checked_in",
            Self::CheckedOut => "checked_out",
            Self::Unavailable => "unavailable",
        }
    }
}

impl std::fmt::Display for AnimalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when a persisted status string falls outside the enumeration.
///
/// Reachable only at the persistence boundary; within the domain the closed
/// enum makes invalid statuses unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid animal status {value:?}")]
pub struct InvalidAnimalStatus {
    /// The offending stored value.
    pub value: String,
}

impl std::str::FromStr for AnimalStatus {
    type Err = InvalidAnimalStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "checked_in" => Ok(Self::CheckedIn),
            "checked_out" => Ok(Self::CheckedOut),
            "unavailable" => Ok(Self::Unavailable),
            other => Err(InvalidAnimalStatus {
                value: other.to_owned(),
            }),
        }
    }
}

/// An animal and its scheduling configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Animal {
    pub id: i32,
    pub name: String,
    pub species: String,
    pub description: Option<String>,
    pub image: Option<String>,
    /// Owning facility.
    pub zoo_id: i32,
    /// Minimum staff tier (1–4) required to handle this animal.
    pub tier: i16,
    /// Maximum checkouts per calendar day.
    pub max_daily_checkouts: i32,
    /// Maximum summed checkout duration per calendar day, in hours.
    pub max_daily_checkout_hours: f64,
    /// Mandatory cooldown after a check-in, in hours.
    pub rest_time: f64,
    /// Restricts checkout to staff holding the handler capability.
    pub handling_enabled: bool,
    pub status: AnimalStatus,
    pub last_checkin_time: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn status_round_trips_through_storage_strings() {
        for status in [
            AnimalStatus::CheckedIn,
            AnimalStatus::CheckedOut,
            AnimalStatus::Unavailable,
        ] {
            assert_eq!(AnimalStatus::from_str(status.as_str()), Ok(status));
        }
    }

    #[test]
    fn unknown_status_string_is_rejected() {
        let err = AnimalStatus::from_str("resting").expect_err("outside the enumeration");
        assert_eq!(err.value, "resting");
    }
}
