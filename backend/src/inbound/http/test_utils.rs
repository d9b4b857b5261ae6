//! Shared fixtures for HTTP handler tests.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::domain::actor::Actor;
use crate::domain::animal::{Animal, AnimalStatus};
use crate::domain::event::Event;
use crate::domain::ports::{
    ActorDirectory, AnimalRepository, AuditLog, MockActorDirectory, MockAnimalRepository,
    MockAuditLog, MockSchedulingRepository, SchedulingRepository,
};
use crate::domain::SchedulingService;
use crate::inbound::http::state::HttpState;
use crate::test_support::MutableClock;

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
}

pub fn animal(id: i32, name: &str) -> Animal {
    Animal {
        id,
        name: name.to_owned(),
        species: "Falco peregrinus".to_owned(),
        description: None,
        image: None,
        zoo_id: 1,
        tier: 1,
        max_daily_checkouts: 3,
        max_daily_checkout_hours: 4.0,
        rest_time: 1.0,
        handling_enabled: false,
        status: AnimalStatus::CheckedIn,
        last_checkin_time: None,
    }
}

pub fn event(id: i32) -> Event {
    Event {
        id,
        name: "Falconry display".to_owned(),
        description: String::new(),
        zoo_id: 1,
        event_type_id: 1,
        start_at: now() + Duration::hours(1),
        end_at: now() + Duration::hours(3),
    }
}

pub fn actor_with(capabilities: &[&str]) -> Actor {
    Actor::new(
        9,
        "Dana Obi",
        "keeper",
        2,
        capabilities.iter().map(|c| (*c).to_owned()),
    )
}

pub fn directory_with(actor: Actor) -> MockActorDirectory {
    let mut actors = MockActorDirectory::new();
    actors
        .expect_find_actor()
        .returning(move |_| Ok(Some(actor.clone())));
    actors
}

pub fn state_with(
    animals: MockAnimalRepository,
    scheduling: MockSchedulingRepository,
    audit: MockAuditLog,
    actors: MockActorDirectory,
) -> HttpState {
    HttpState::new(Arc::new(SchedulingService::new(
        Arc::new(animals) as Arc<dyn AnimalRepository>,
        Arc::new(scheduling) as Arc<dyn SchedulingRepository>,
        Arc::new(audit) as Arc<dyn AuditLog>,
        Arc::new(actors) as Arc<dyn ActorDirectory>,
        Arc::new(MutableClock::new(now())),
    )))
}
