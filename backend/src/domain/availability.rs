//! Pure availability evaluation.
//!
//! Computes an animal's derived status from its stored status, scheduling
//! configuration, and today's aggregated usage. No I/O: the persistence
//! layer supplies the aggregates and the caller supplies `now`, which keeps
//! the rule deterministic and independently testable.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::animal::{Animal, AnimalStatus};

/// Aggregated usage for one animal on one calendar day.
///
/// Derived from assignment rows whose check-in falls on that day; never
/// cached on the animal itself.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DailyUsage {
    /// Completed checkouts today.
    pub checkout_count: i64,
    /// Summed checkout duration today, in hours.
    pub checkout_hours: f64,
}

/// Derived scheduling status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DerivedStatus {
    Available,
    CheckedOut,
    Unavailable,
}

/// Why a non-available animal cannot be checked out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailabilityCause {
    /// Already committed to an event.
    InField,
    /// Daily checkout count quota reached.
    DailyCountReached,
    /// Daily summed checkout duration quota reached.
    DailyDurationReached,
    /// Mandatory rest window still open.
    Resting,
    /// Withdrawn by an administrator.
    AdminOverride,
}

/// Result of evaluating an animal's availability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Availability {
    pub status: DerivedStatus,
    /// Set whenever `status` is not [`DerivedStatus::Available`].
    pub cause: Option<UnavailabilityCause>,
    /// User-facing reason for the derived status.
    pub reason: String,
}

impl Availability {
    fn available(reason: impl Into<String>) -> Self {
        Self {
            status: DerivedStatus::Available,
            cause: None,
            reason: reason.into(),
        }
    }

    fn blocked(
        status: DerivedStatus,
        cause: UnavailabilityCause,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            status,
            cause: Some(cause),
            reason: reason.into(),
        }
    }
}

/// Evaluate an animal's derived status at `now`.
///
/// Decision order for an animal in its home state, first match wins:
/// daily checkout count, then summed duration, then mandatory rest. An
/// animal already checked out stays `checked_out`; an admin override stays
/// `unavailable`.
pub fn evaluate(animal: &Animal, usage: DailyUsage, now: DateTime<Utc>) -> Availability {
    match animal.status {
        AnimalStatus::CheckedOut => Availability::blocked(
            DerivedStatus::CheckedOut,
            UnavailabilityCause::InField,
            "Animal is already checked out",
        ),
        AnimalStatus::Unavailable => Availability::blocked(
            DerivedStatus::Unavailable,
            UnavailabilityCause::AdminOverride,
            "By admin",
        ),
        AnimalStatus::CheckedIn => evaluate_home_state(animal, usage, now),
    }
}

fn evaluate_home_state(animal: &Animal, usage: DailyUsage, now: DateTime<Utc>) -> Availability {
    if usage.checkout_count >= i64::from(animal.max_daily_checkouts) {
        return Availability::blocked(
            DerivedStatus::Unavailable,
            UnavailabilityCause::DailyCountReached,
            "Daily check-out limit reached",
        );
    }
    if usage.checkout_hours >= animal.max_daily_checkout_hours {
        return Availability::blocked(
            DerivedStatus::Unavailable,
            UnavailabilityCause::DailyDurationReached,
            "Allowed check-out duration reached",
        );
    }
    if let Some(remaining) = remaining_rest(animal, now) {
        return Availability::blocked(
            DerivedStatus::Unavailable,
            UnavailabilityCause::Resting,
            format!("Resting for {}", humanize(remaining)),
        );
    }
    Availability::available("Animal is available for check-out")
}

/// Remaining mandatory rest at `now`, if the cooldown has not elapsed.
pub fn remaining_rest(animal: &Animal, now: DateTime<Utc>) -> Option<Duration> {
    let last_checkin = animal.last_checkin_time?;
    let rest_over = last_checkin + hours_to_duration(animal.rest_time);
    (rest_over > now).then(|| rest_over - now)
}

fn hours_to_duration(hours: f64) -> Duration {
    Duration::seconds((hours * 3600.0).round() as i64)
}

/// Render a duration using its largest non-zero unit, top-down:
/// days, hours, minutes, then seconds.
pub fn humanize(duration: Duration) -> String {
    if duration.num_days() >= 1 {
        format!("{} days", duration.num_days())
    } else if duration.num_hours() >= 1 {
        format!("{}hrs", duration.num_hours())
    } else if duration.num_minutes() >= 1 {
        format!("{}mins", duration.num_minutes())
    } else {
        format!("{} seconds", duration.num_seconds().max(0))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::rstest;

    use super::*;

    fn animal(status: AnimalStatus) -> Animal {
        Animal {
            id: 1,
            name: "Kaa".to_owned(),
            species: "Python bivittatus".to_owned(),
            description: None,
            image: None,
            zoo_id: 1,
            tier: 2,
            max_daily_checkouts: 3,
            max_daily_checkout_hours: 4.0,
            rest_time: 1.5,
            handling_enabled: false,
            status,
            last_checkin_time: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
    }

    #[test]
    fn checked_out_animal_stays_checked_out_regardless_of_quota() {
        let mut subject = animal(AnimalStatus::CheckedOut);
        subject.last_checkin_time = Some(now());
        let result = evaluate(
            &subject,
            DailyUsage {
                checkout_count: 99,
                checkout_hours: 99.0,
            },
            now(),
        );
        assert_eq!(result.status, DerivedStatus::CheckedOut);
    }

    #[test]
    fn admin_override_wins() {
        let result = evaluate(&animal(AnimalStatus::Unavailable), DailyUsage::default(), now());
        assert_eq!(result.status, DerivedStatus::Unavailable);
        assert_eq!(result.reason, "By admin");
    }

    #[test]
    fn count_quota_is_checked_before_duration_and_rest() {
        let mut subject = animal(AnimalStatus::CheckedIn);
        // Rest window still open and duration also exceeded; count must win.
        subject.last_checkin_time = Some(now() - Duration::minutes(10));
        let result = evaluate(
            &subject,
            DailyUsage {
                checkout_count: 3,
                checkout_hours: 10.0,
            },
            now(),
        );
        assert_eq!(result.status, DerivedStatus::Unavailable);
        assert_eq!(result.cause, Some(UnavailabilityCause::DailyCountReached));
        assert_eq!(result.reason, "Daily check-out limit reached");
    }

    #[test]
    fn duration_quota_is_checked_second() {
        let result = evaluate(
            &animal(AnimalStatus::CheckedIn),
            DailyUsage {
                checkout_count: 1,
                checkout_hours: 4.0,
            },
            now(),
        );
        assert_eq!(result.reason, "Allowed check-out duration reached");
    }

    #[test]
    fn resting_animal_reports_remaining_time() {
        let mut subject = animal(AnimalStatus::CheckedIn);
        subject.last_checkin_time = Some(now() - Duration::minutes(35));
        let result = evaluate(&subject, DailyUsage::default(), now());
        assert_eq!(result.status, DerivedStatus::Unavailable);
        assert_eq!(result.reason, "Resting for 55mins");
    }

    #[test]
    fn full_hour_of_rest_is_reported_in_hours() {
        let mut subject = animal(AnimalStatus::CheckedIn);
        subject.last_checkin_time = Some(now() - Duration::minutes(30));
        let result = evaluate(&subject, DailyUsage::default(), now());
        assert_eq!(result.reason, "Resting for 1hrs");
    }

    #[test]
    fn remaining_rest_shrinks_as_time_advances() {
        let mut subject = animal(AnimalStatus::CheckedIn);
        subject.last_checkin_time = Some(now());
        let early = remaining_rest(&subject, now() + Duration::minutes(10)).unwrap();
        let late = remaining_rest(&subject, now() + Duration::minutes(50)).unwrap();
        assert!(late < early);
    }

    #[test]
    fn rested_animal_is_available() {
        let mut subject = animal(AnimalStatus::CheckedIn);
        subject.last_checkin_time = Some(now() - Duration::hours(2));
        let result = evaluate(&subject, DailyUsage::default(), now());
        assert_eq!(result.status, DerivedStatus::Available);
    }

    #[test]
    fn animal_with_no_prior_checkin_is_available() {
        let result = evaluate(&animal(AnimalStatus::CheckedIn), DailyUsage::default(), now());
        assert_eq!(result.status, DerivedStatus::Available);
    }

    #[rstest]
    #[case(Duration::days(2), "2 days")]
    #[case(Duration::hours(26), "1 days")]
    #[case(Duration::hours(3), "3hrs")]
    #[case(Duration::hours(1), "1hrs")]
    #[case(Duration::minutes(59), "59mins")]
    #[case(Duration::seconds(42), "42 seconds")]
    fn humanize_picks_largest_nonzero_unit(#[case] duration: Duration, #[case] expected: &str) {
        assert_eq!(humanize(duration), expected);
    }
}
