//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on the domain service and remain testable without I/O.

use std::sync::Arc;

use mockable::DefaultClock;

use crate::domain::SchedulingService;
use crate::domain::ports::{
    ActorDirectory, AnimalRepository, AuditLog, FixtureActorDirectory, FixtureAnimalRepository,
    FixtureAuditLog, FixtureSchedulingRepository, SchedulingRepository,
};

/// The scheduling service as wired at the HTTP boundary.
pub type DynSchedulingService = SchedulingService<
    dyn AnimalRepository,
    dyn SchedulingRepository,
    dyn AuditLog,
    dyn ActorDirectory,
>;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub scheduling: Arc<DynSchedulingService>,
}

impl HttpState {
    pub fn new(scheduling: Arc<DynSchedulingService>) -> Self {
        Self { scheduling }
    }
}

impl Default for HttpState {
    /// State over fixture ports, for wiring paths that never reach storage.
    fn default() -> Self {
        Self::new(Arc::new(SchedulingService::new(
            Arc::new(FixtureAnimalRepository) as Arc<dyn AnimalRepository>,
            Arc::new(FixtureSchedulingRepository) as Arc<dyn SchedulingRepository>,
            Arc::new(FixtureAuditLog) as Arc<dyn AuditLog>,
            Arc::new(FixtureActorDirectory) as Arc<dyn ActorDirectory>,
            Arc::new(DefaultClock),
        )))
    }
}
