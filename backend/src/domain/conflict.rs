//! Event scheduling conflict detection.
//!
//! The persistence layer supplies candidate busy intervals for the animals
//! under consideration (same facility, optionally excluding the event being
//! edited); the pure rule here decides which of them clash with the
//! proposed window.

use chrono::{DateTime, Utc};

/// An existing assignment window for an animal within a facility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusyInterval {
    pub animal_id: i32,
    pub animal_name: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

/// Whether two event windows overlap.
///
/// Inclusive on both ends: touching endpoints count as a conflict, so an
/// event ending at 11:00 clashes with one starting at 11:00.
pub fn windows_overlap(
    start_a: DateTime<Utc>,
    end_a: DateTime<Utc>,
    start_b: DateTime<Utc>,
    end_b: DateTime<Utc>,
) -> bool {
    start_a <= end_b && end_a >= start_b
}

/// Names of animals whose existing assignments clash with the proposed
/// window, deduplicated in first-seen order.
pub fn conflicting_animals(
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
    existing: &[BusyInterval],
) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    existing
        .iter()
        .filter(|interval| windows_overlap(start_at, end_at, interval.start_at, interval.end_at))
        .filter(|interval| seen.insert(interval.animal_id))
        .map(|interval| interval.animal_name.clone())
        .collect()
}
