//! Domain core: the animal registry, availability rules, event
//! scheduling, and the checkout/check-in state machine.
//!
//! Everything here is transport and storage agnostic. Inbound adapters
//! translate HTTP requests into service calls; outbound adapters implement
//! the [`ports`] traits over Diesel.

pub mod actor;
pub mod animal;
pub mod assignment;
pub mod audit;
pub mod availability;
pub mod conflict;
pub mod error;
pub mod event;
pub mod ports;
pub mod scheduling_service;

pub use self::actor::{Actor, capability};
pub use self::animal::{Animal, AnimalStatus};
pub use self::assignment::{AnimalAssignment, AssignmentState, CorruptAssignment};
pub use self::audit::{AuditAction, AuditEntry, AuditRecord};
pub use self::availability::{Availability, DailyUsage, DerivedStatus, UnavailabilityCause};
pub use self::conflict::BusyInterval;
pub use self::error::{Error, ErrorCode};
pub use self::event::{Event, EventDraft};
pub use self::scheduling_service::{
    AnimalAvailability, CreateEventRequest, SchedulingService, UpdateEventRequest,
};

/// Convenient API result alias.
pub type ApiResult<T> = Result<T, Error>;
