//! Domain ports: the narrow interfaces through which the scheduling core
//! reaches persistence and the external role store.
//!
//! Each port carries a mockall mock for unit tests and a `Fixture*`
//! implementation for wiring paths that do not exercise it.

pub mod animal_repository;
pub mod audit_log;
pub mod authorization;
pub mod scheduling_repository;

pub use self::animal_repository::{
    AnimalFilter, AnimalRepository, AnimalRepositoryError, CascadeReport, FixtureAnimalRepository,
};
pub use self::audit_log::{AuditLog, AuditLogError, FixtureAuditLog};
pub use self::authorization::{ActorDirectory, ActorDirectoryError, FixtureActorDirectory};
pub use self::scheduling_repository::{
    CheckInStamp, CheckoutStamp, FixtureSchedulingRepository, SchedulingRepository,
    SchedulingRepositoryError,
};

#[cfg(test)]
pub use self::animal_repository::MockAnimalRepository;
#[cfg(test)]
pub use self::audit_log::MockAuditLog;
#[cfg(test)]
pub use self::authorization::MockActorDirectory;
#[cfg(test)]
pub use self::scheduling_repository::MockSchedulingRepository;
