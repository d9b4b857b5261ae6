//! Checkout/check-in state machine and scheduling orchestration.
//!
//! All validation happens before any mutation: authorization, lifecycle
//! state, conflicts, and quotas are checked against reads, then the
//! repository applies the whole transition in one transaction together
//! with its audit entries. Failing any precondition aborts with a
//! specific, user-facing reason.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;

use crate::domain::Error;
use crate::domain::actor::{Actor, capability};
use crate::domain::animal::{Animal, AnimalStatus};
use crate::domain::assignment::{AnimalAssignment, AssignmentState};
use crate::domain::audit::{AuditAction, AuditEntry, AuditRecord};
use crate::domain::availability::{self, Availability, DailyUsage, UnavailabilityCause};
use crate::domain::conflict;
use crate::domain::event::{Event, EventDraft};
use crate::domain::ports::{
    ActorDirectory, ActorDirectoryError, AnimalFilter, AnimalRepository, AnimalRepositoryError,
    AuditLog, AuditLogError, CascadeReport, CheckInStamp, CheckoutStamp, SchedulingRepository,
    SchedulingRepositoryError,
};

fn map_animal_repo_error(error: AnimalRepositoryError) -> Error {
    match error {
        AnimalRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("animal repository unavailable: {message}"))
        }
        AnimalRepositoryError::Query { message } => {
            Error::internal(format!("animal repository error: {message}"))
        }
        AnimalRepositoryError::Conflict { message } => Error::conflict(message),
    }
}

fn map_scheduling_error(error: SchedulingRepositoryError) -> Error {
    match error {
        SchedulingRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("scheduling repository unavailable: {message}"))
        }
        SchedulingRepositoryError::Query { message } => {
            Error::internal(format!("scheduling repository error: {message}"))
        }
        SchedulingRepositoryError::Conflict { message } => Error::conflict(message),
    }
}

fn map_audit_error(error: AuditLogError) -> Error {
    match error {
        AuditLogError::Connection { message } => {
            Error::service_unavailable(format!("audit log unavailable: {message}"))
        }
        AuditLogError::Query { message } => Error::internal(format!("audit log error: {message}")),
    }
}

fn map_directory_error(error: ActorDirectoryError) -> Error {
    match error {
        ActorDirectoryError::Connection { message } => {
            Error::service_unavailable(format!("actor directory unavailable: {message}"))
        }
        ActorDirectoryError::Query { message } => {
            Error::internal(format!("actor directory error: {message}"))
        }
    }
}

/// An animal together with its derived status and today's usage.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimalAvailability {
    pub animal: Animal,
    pub availability: Availability,
    pub daily_checkout_count: i64,
    pub daily_checkout_hours: f64,
}

/// Request to create an event with its animal assignments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateEventRequest {
    pub event: EventDraft,
    pub animal_ids: Vec<i32>,
    /// Check the animals out at creation time, after full checkout
    /// validation.
    pub checkout_immediately: bool,
}

/// Request to update an event and its assignment set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateEventRequest {
    pub event: EventDraft,
    pub animal_ids: Vec<i32>,
}

/// Scheduling domain service owning animal status transitions.
///
/// Generic over its ports so unit tests can plug in mocks; the server wires
/// it over trait objects.
pub struct SchedulingService<A: ?Sized, S: ?Sized, L: ?Sized, D: ?Sized> {
    animals: Arc<A>,
    scheduling: Arc<S>,
    audit: Arc<L>,
    actors: Arc<D>,
    clock: Arc<dyn Clock>,
}

impl<A: ?Sized, S: ?Sized, L: ?Sized, D: ?Sized> Clone for SchedulingService<A, S, L, D> {
    fn clone(&self) -> Self {
        Self {
            animals: Arc::clone(&self.animals),
            scheduling: Arc::clone(&self.scheduling),
            audit: Arc::clone(&self.audit),
            actors: Arc::clone(&self.actors),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<A: ?Sized, S: ?Sized, L: ?Sized, D: ?Sized> SchedulingService<A, S, L, D> {
    /// Create a new service over the given ports and clock.
    pub fn new(
        animals: Arc<A>,
        scheduling: Arc<S>,
        audit: Arc<L>,
        actors: Arc<D>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            animals,
            scheduling,
            audit,
            actors,
            clock,
        }
    }
}

impl<A, S, L, D> SchedulingService<A, S, L, D>
where
    A: AnimalRepository + ?Sized,
    S: SchedulingRepository + ?Sized,
    L: AuditLog + ?Sized,
    D: ActorDirectory + ?Sized,
{
    /// Derived statuses for the animals matching the filter.
    pub async fn animal_statuses(
        &self,
        filter: AnimalFilter,
    ) -> Result<Vec<AnimalAvailability>, Error> {
        let animals = self
            .animals
            .list(filter)
            .await
            .map_err(map_animal_repo_error)?;
        let now = self.clock.utc();
        let usage = self.daily_usage_for(&animals, now).await?;

        Ok(animals
            .into_iter()
            .map(|animal| {
                let used = usage.get(&animal.id).copied().unwrap_or_default();
                let availability = availability::evaluate(&animal, used, now);
                AnimalAvailability {
                    availability,
                    daily_checkout_count: used.checkout_count,
                    daily_checkout_hours: used.checkout_hours,
                    animal,
                }
            })
            .collect())
    }

    /// Create an event, assign the animals, and optionally check them out
    /// immediately.
    pub async fn create_event(
        &self,
        actor_id: i32,
        request: CreateEventRequest,
    ) -> Result<Event, Error> {
        let actor = self.load_actor(actor_id).await?;
        require_capability(&actor, capability::CREATE_EVENTS)?;
        request.event.validate()?;

        let animals = self
            .load_animals(&request.animal_ids, Some(request.event.zoo_id))
            .await?;
        self.ensure_no_clashes(
            &request.animal_ids,
            request.event.zoo_id,
            request.event.start_at,
            request.event.end_at,
            None,
        )
        .await?;

        let now = self.clock.utc();
        let mut audit: Vec<AuditEntry> = Vec::new();
        let mut checkout = None;

        if request.checkout_immediately {
            for animal in &animals {
                check_tier(&actor, animal)?;
                check_handling(&actor, animal)?;
            }
            self.ensure_available(&animals, now).await?;
            checkout = Some(CheckoutStamp {
                at: now,
                user_id: actor.id,
            });
        }

        for animal_id in &request.animal_ids {
            audit.push(
                AuditEntry::new(*animal_id, actor.id, AuditAction::EventParticipationAdded)
                    .with_description(format!(
                        "{} added animal to event '{}'",
                        actor.attribution(),
                        request.event.name
                    )),
            );
        }
        if checkout.is_some() {
            audit.extend(checkout_audits(&actor, &request.event.name, &request.animal_ids));
        }

        self.scheduling
            .create_event(&request.event, &request.animal_ids, checkout, &audit)
            .await
            .map_err(map_scheduling_error)
    }

    /// Update an event's fields and reconcile its assignment set.
    pub async fn update_event(
        &self,
        actor_id: i32,
        event_id: i32,
        request: UpdateEventRequest,
    ) -> Result<Event, Error> {
        let actor = self.load_actor(actor_id).await?;
        require_capability(&actor, capability::UPDATE_EVENTS)?;

        let event = self.load_event(event_id).await?;
        let now = self.clock.utc();
        if event.has_ended(now) {
            return Err(Error::conflict("Event is already ended"));
        }
        if event.has_started(now) && request.event.start_at != event.start_at {
            return Err(Error::conflict("Event start time can't be changed"));
        }
        request.event.validate()?;

        self.load_animals(&request.animal_ids, Some(request.event.zoo_id))
            .await?;
        self.ensure_no_clashes(
            &request.animal_ids,
            request.event.zoo_id,
            request.event.start_at,
            request.event.end_at,
            Some(event_id),
        )
        .await?;

        let (to_add, to_remove) = self
            .assignment_diff(event_id, &request.animal_ids)
            .await?;
        let audit = participation_audits(&actor, &request.event.name, &to_add, &to_remove);

        self.scheduling
            .update_event(event_id, &request.event, &to_add, &to_remove, &audit)
            .await
            .map_err(map_scheduling_error)
    }

    /// Replace the set of animals assigned to an event.
    pub async fn reassign_animals(
        &self,
        actor_id: i32,
        event_id: i32,
        animal_ids: Vec<i32>,
    ) -> Result<(), Error> {
        let actor = self.load_actor(actor_id).await?;
        require_capability(&actor, capability::UPDATE_EVENTS)?;

        let event = self.load_event(event_id).await?;
        self.load_animals(&animal_ids, Some(event.zoo_id)).await?;
        self.ensure_no_clashes(
            &animal_ids,
            event.zoo_id,
            event.start_at,
            event.end_at,
            Some(event_id),
        )
        .await?;

        let (to_add, to_remove) = self.assignment_diff(event_id, &animal_ids).await?;
        let audit = participation_audits(&actor, &event.name, &to_add, &to_remove);

        self.scheduling
            .replace_assignments(event_id, &to_add, &to_remove, &audit)
            .await
            .map_err(map_scheduling_error)
    }

    /// Check animals out for an event.
    pub async fn checkout(
        &self,
        actor_id: i32,
        event_id: i32,
        animal_ids: Vec<i32>,
    ) -> Result<(), Error> {
        let actor = self.load_actor(actor_id).await?;
        require_capability(&actor, capability::CHECKOUT_ANIMALS)?;

        let event = self.load_event(event_id).await?;
        let animals = self.load_animals(&animal_ids, None).await?;
        let links = self.load_links(event_id, &animal_ids).await?;

        for animal in &animals {
            let link = &links[&animal.id];
            match link.state().map_err(|err| Error::internal(err.to_string()))? {
                AssignmentState::Assigned => {}
                AssignmentState::CheckedOut | AssignmentState::CheckedIn => {
                    return Err(Error::conflict(format!(
                        "Animal {} is already checked out",
                        animal.name
                    )));
                }
            }
            check_tier(&actor, animal)?;
            check_handling(&actor, animal)?;
        }

        let now = self.clock.utc();
        self.ensure_available(&animals, now).await?;

        let stamp = CheckoutStamp {
            at: now,
            user_id: actor.id,
        };
        let audit = checkout_audits(&actor, &event.name, &animal_ids);

        self.scheduling
            .apply_checkout(event_id, &animal_ids, stamp, &audit)
            .await
            .map_err(map_scheduling_error)
    }

    /// Check animals back in from an event.
    pub async fn check_in(
        &self,
        actor_id: i32,
        event_id: i32,
        animal_ids: Vec<i32>,
    ) -> Result<(), Error> {
        let actor = self.load_actor(actor_id).await?;
        require_capability(&actor, capability::CHECKIN_ANIMALS)?;

        let event = self.load_event(event_id).await?;
        let animals = self.load_animals(&animal_ids, None).await?;
        let links = self.load_links(event_id, &animal_ids).await?;

        for animal in &animals {
            let link = &links[&animal.id];
            match link.state().map_err(|err| Error::internal(err.to_string()))? {
                AssignmentState::CheckedOut => {}
                AssignmentState::CheckedIn => {
                    return Err(Error::conflict(format!(
                        "Animal {} is already checked in",
                        animal.name
                    )));
                }
                AssignmentState::Assigned => {
                    return Err(Error::conflict(format!(
                        "Animal {} is not checked out for this event",
                        animal.name
                    )));
                }
            }
            check_tier(&actor, animal)?;
            check_handling(&actor, animal)?;
        }

        let stamp = CheckInStamp {
            at: self.clock.utc(),
            user_id: actor.id,
        };
        let audit = check_in_audits(&actor, &event.name, &animal_ids);

        self.scheduling
            .apply_check_in(event_id, &animal_ids, stamp, &audit)
            .await
            .map_err(map_scheduling_error)
    }

    /// Administrator override: mark an animal available or unavailable,
    /// bypassing quota checks.
    pub async fn set_availability(
        &self,
        actor_id: i32,
        animal_id: i32,
        available: bool,
    ) -> Result<(), Error> {
        let actor = self.load_actor(actor_id).await?;
        let required = if available {
            capability::MAKE_ANIMAL_AVAILABLE
        } else {
            capability::MAKE_ANIMAL_UNAVAILABLE
        };
        require_capability(&actor, required)?;

        let animal = self.load_animal(animal_id).await?;
        let new_status = if available {
            AnimalStatus::CheckedIn
        } else {
            AnimalStatus::Unavailable
        };
        let label = if available { "available" } else { "unavailable" };
        let audit = [
            AuditEntry::new(animal_id, actor.id, AuditAction::AnimalStatusChanged)
                .with_field_change("status", animal.status.as_str(), new_status.as_str())
                .with_description(format!("Admin marked animal as {label}")),
        ];

        self.animals
            .set_status(animal_id, new_status, &audit)
            .await
            .map_err(map_animal_repo_error)
    }

    /// Delete an animal together with its dependent assignment and audit
    /// rows. Blocked while the animal is in the field.
    pub async fn delete_animal(
        &self,
        actor_id: i32,
        animal_id: i32,
    ) -> Result<CascadeReport, Error> {
        let actor = self.load_actor(actor_id).await?;
        require_capability(&actor, capability::DELETE_ANIMALS)?;
        self.load_animal(animal_id).await?;

        self.animals
            .delete_cascade(animal_id)
            .await
            .map_err(map_animal_repo_error)
    }

    /// An animal's audit history, newest first.
    pub async fn audit_history(&self, animal_id: i32) -> Result<Vec<AuditRecord>, Error> {
        self.load_animal(animal_id).await?;
        self.audit
            .history(animal_id)
            .await
            .map_err(map_audit_error)
    }

    async fn load_actor(&self, actor_id: i32) -> Result<Actor, Error> {
        self.actors
            .find_actor(actor_id)
            .await
            .map_err(map_directory_error)?
            .ok_or_else(|| Error::unauthorized("unknown actor"))
    }

    async fn load_animal(&self, animal_id: i32) -> Result<Animal, Error> {
        self.animals
            .find_by_id(animal_id)
            .await
            .map_err(map_animal_repo_error)?
            .ok_or_else(|| Error::not_found("Animal not found"))
    }

    async fn load_event(&self, event_id: i32) -> Result<Event, Error> {
        self.scheduling
            .find_event(event_id)
            .await
            .map_err(map_scheduling_error)?
            .ok_or_else(|| Error::not_found("Event not found"))
    }

    /// Load the requested animals, failing if any id is missing (or falls
    /// outside the zoo scope when given).
    async fn load_animals(
        &self,
        animal_ids: &[i32],
        zoo_id: Option<i32>,
    ) -> Result<Vec<Animal>, Error> {
        let animals = self
            .animals
            .list(AnimalFilter {
                ids: Some(animal_ids.to_vec()),
                zoo_id,
            })
            .await
            .map_err(map_animal_repo_error)?;
        if animals.len() != animal_ids.len() {
            return Err(Error::not_found("Animal not found"));
        }
        Ok(animals)
    }

    /// Assignment links for the requested animals on one event, keyed by
    /// animal id.
    async fn load_links(
        &self,
        event_id: i32,
        animal_ids: &[i32],
    ) -> Result<HashMap<i32, AnimalAssignment>, Error> {
        let links: HashMap<i32, AnimalAssignment> = self
            .scheduling
            .assignments_for_event(event_id)
            .await
            .map_err(map_scheduling_error)?
            .into_iter()
            .map(|link| (link.animal_id, link))
            .collect();
        if animal_ids.iter().any(|id| !links.contains_key(id)) {
            return Err(Error::not_found(
                "Some animals are not assigned to this event",
            ));
        }
        Ok(links)
    }

    async fn ensure_no_clashes(
        &self,
        animal_ids: &[i32],
        zoo_id: i32,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
        exclude_event_id: Option<i32>,
    ) -> Result<(), Error> {
        let busy = self
            .scheduling
            .busy_intervals(animal_ids, zoo_id, start_at, end_at, exclude_event_id)
            .await
            .map_err(map_scheduling_error)?;
        let clashing = conflict::conflicting_animals(start_at, end_at, &busy);
        if clashing.is_empty() {
            return Ok(());
        }
        let plural = if clashing.len() == 1 { "" } else { "s" };
        Err(Error::conflict(format!(
            "Animal{plural} {} is already assigned to an event during this time",
            clashing.join(", ")
        )))
    }

    /// Fail if any of the animals is not available for checkout right now.
    async fn ensure_available(
        &self,
        animals: &[Animal],
        now: DateTime<Utc>,
    ) -> Result<(), Error> {
        let usage = self.daily_usage_for(animals, now).await?;
        for animal in animals {
            let used = usage.get(&animal.id).copied().unwrap_or_default();
            let evaluated = availability::evaluate(animal, used, now);
            if let Some(error) = availability_error(animal, &evaluated) {
                return Err(error);
            }
        }
        Ok(())
    }

    async fn daily_usage_for(
        &self,
        animals: &[Animal],
        now: DateTime<Utc>,
    ) -> Result<HashMap<i32, DailyUsage>, Error> {
        let ids: Vec<i32> = animals.iter().map(|animal| animal.id).collect();
        self.animals
            .daily_usage(&ids, now.date_naive())
            .await
            .map_err(map_animal_repo_error)
    }

    /// Diff the event's current assignment set against the requested one.
    /// Removal is rejected while the animal is in the field for the event.
    async fn assignment_diff(
        &self,
        event_id: i32,
        requested: &[i32],
    ) -> Result<(Vec<i32>, Vec<i32>), Error> {
        let existing = self
            .scheduling
            .assignments_for_event(event_id)
            .await
            .map_err(map_scheduling_error)?;
        let requested_set: HashSet<i32> = requested.iter().copied().collect();
        let existing_set: HashSet<i32> = existing.iter().map(|link| link.animal_id).collect();

        let mut to_remove = Vec::new();
        for link in &existing {
            if requested_set.contains(&link.animal_id) {
                continue;
            }
            let state = link.state().map_err(|err| Error::internal(err.to_string()))?;
            if state == AssignmentState::CheckedOut {
                let name = self
                    .load_animal(link.animal_id)
                    .await
                    .map(|animal| animal.name)
                    .unwrap_or_else(|_| format!("animal {}", link.animal_id));
                return Err(Error::conflict(format!(
                    "{name} is already checked out, can't be removed"
                )));
            }
            to_remove.push(link.animal_id);
        }

        let to_add = requested
            .iter()
            .copied()
            .filter(|id| !existing_set.contains(id))
            .collect();
        Ok((to_add, to_remove))
    }
}

fn require_capability(actor: &Actor, name: &str) -> Result<(), Error> {
    if actor.has_capability(name) {
        Ok(())
    } else {
        Err(Error::forbidden(
            "You are not authorized to perform this action",
        ))
    }
}

fn check_tier(actor: &Actor, animal: &Animal) -> Result<(), Error> {
    if animal.tier > actor.tier {
        return Err(Error::unauthorized(format!(
            "You need to be on tier {} to checkout this animal",
            animal.tier
        )));
    }
    Ok(())
}

fn check_handling(actor: &Actor, animal: &Animal) -> Result<(), Error> {
    if animal.handling_enabled && !actor.has_capability(capability::HANDLER) {
        return Err(Error::forbidden(format!(
            "{} can only be handled by staff with the handler capability",
            animal.name
        )));
    }
    Ok(())
}

/// Map a blocking availability verdict to the matching error category.
fn availability_error(animal: &Animal, evaluated: &Availability) -> Option<Error> {
    let cause = evaluated.cause?;
    let message = format!(
        "{} is not available to checkout: {}",
        animal.name, evaluated.reason
    );
    Some(match cause {
        UnavailabilityCause::DailyCountReached
        | UnavailabilityCause::DailyDurationReached
        | UnavailabilityCause::Resting => Error::quota_exceeded(message),
        UnavailabilityCause::InField | UnavailabilityCause::AdminOverride => {
            Error::conflict(message)
        }
    })
}

fn participation_audits(
    actor: &Actor,
    event_name: &str,
    added: &[i32],
    removed: &[i32],
) -> Vec<AuditEntry> {
    let mut entries = Vec::with_capacity(added.len() + removed.len());
    for animal_id in removed {
        entries.push(
            AuditEntry::new(*animal_id, actor.id, AuditAction::EventParticipationRemoved)
                .with_description(format!(
                    "{} removed animal from event '{event_name}'",
                    actor.attribution()
                )),
        );
    }
    for animal_id in added {
        entries.push(
            AuditEntry::new(*animal_id, actor.id, AuditAction::EventParticipationAdded)
                .with_description(format!(
                    "{} added animal to event '{event_name}'",
                    actor.attribution()
                )),
        );
    }
    entries
}

fn checkout_audits(actor: &Actor, event_name: &str, animal_ids: &[i32]) -> Vec<AuditEntry> {
    let description = format!(
        "{} checked out animal to event '{event_name}'",
        actor.attribution()
    );
    let mut entries = Vec::with_capacity(animal_ids.len() * 2);
    for animal_id in animal_ids {
        entries.push(
            AuditEntry::new(*animal_id, actor.id, AuditAction::CheckedOut)
                .with_description(description.clone()),
        );
        entries.push(
            AuditEntry::new(*animal_id, actor.id, AuditAction::AnimalStatusChanged)
                .with_field_change("status", "checked_in", "checked_out")
                .with_description(description.clone()),
        );
    }
    entries
}

fn check_in_audits(actor: &Actor, event_name: &str, animal_ids: &[i32]) -> Vec<AuditEntry> {
    let description = format!(
        "{} checked in animal from event '{event_name}'",
        actor.attribution()
    );
    let mut entries = Vec::with_capacity(animal_ids.len() * 3);
    for animal_id in animal_ids {
        entries.push(
            AuditEntry::new(*animal_id, actor.id, AuditAction::CheckedIn)
                .with_description(description.clone()),
        );
        entries.push(
            AuditEntry::new(*animal_id, actor.id, AuditAction::AnimalStatusChanged)
                .with_field_change("status", "checked_out", "checked_in")
                .with_description(description.clone()),
        );
        entries.push(
            AuditEntry::new(*animal_id, actor.id, AuditAction::RestTimeStarted)
                .with_description("Rest time started"),
        );
    }
    entries
}

#[cfg(test)]
#[path = "scheduling_service_tests.rs"]
mod tests;
