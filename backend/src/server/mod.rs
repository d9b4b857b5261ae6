//! Server construction and middleware wiring.

mod config;

pub use config::{ServerArgs, ServerConfig};

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::DefaultClock;

use crate::domain::SchedulingService;
use crate::domain::ports::{
    ActorDirectory, AnimalRepository, AuditLog, FixtureActorDirectory, FixtureAnimalRepository,
    FixtureAuditLog, FixtureSchedulingRepository, SchedulingRepository,
};
use crate::inbound::http::animals::{
    delete_animal, list_animal_audits, list_animal_statuses, set_animal_availability,
};
use crate::inbound::http::events::{
    checkin_event_animals, checkout_event_animals, create_event, reassign_event_animals,
    update_event,
};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::state::{DynSchedulingService, HttpState};
use crate::middleware::Trace;
use crate::outbound::persistence::{
    DieselActorDirectory, DieselAnimalRepository, DieselAuditLog, DieselSchedulingRepository,
};

/// Build the scheduling service based on configuration.
///
/// Uses the database-backed adapters when a pool is available, otherwise
/// falls back to the fixtures so wiring paths stay exercisable in tests.
fn build_scheduling_service(config: &ServerConfig) -> Arc<DynSchedulingService> {
    match &config.db_pool {
        Some(pool) => Arc::new(SchedulingService::new(
            Arc::new(DieselAnimalRepository::new(pool.clone())) as Arc<dyn AnimalRepository>,
            Arc::new(DieselSchedulingRepository::new(pool.clone()))
                as Arc<dyn SchedulingRepository>,
            Arc::new(DieselAuditLog::new(pool.clone())) as Arc<dyn AuditLog>,
            Arc::new(DieselActorDirectory::new(pool.clone())) as Arc<dyn ActorDirectory>,
            Arc::new(DefaultClock),
        )),
        None => Arc::new(SchedulingService::new(
            Arc::new(FixtureAnimalRepository) as Arc<dyn AnimalRepository>,
            Arc::new(FixtureSchedulingRepository) as Arc<dyn SchedulingRepository>,
            Arc::new(FixtureAuditLog) as Arc<dyn AuditLog>,
            Arc::new(FixtureActorDirectory) as Arc<dyn ActorDirectory>,
            Arc::new(DefaultClock),
        )),
    }
}

#[cfg(debug_assertions)]
#[actix_web::get("/api-docs/openapi.json")]
async fn openapi_spec() -> web::Json<utoipa::openapi::OpenApi> {
    use utoipa::OpenApi as _;
    web::Json(crate::doc::ApiDoc::openapi())
}

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let api = web::scope("/api/v1")
        .service(list_animal_statuses)
        .service(set_animal_availability)
        .service(list_animal_audits)
        .service(delete_animal)
        .service(create_event)
        .service(update_event)
        .service(reassign_event_animals)
        .service(checkout_event_animals)
        .service(checkin_event_animals);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(openapi_spec);

    app
}

/// Construct an Actix HTTP server using the provided health state and
/// configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = web::Data::new(HttpState::new(build_scheduling_service(&config)));

    let server = HttpServer::new(move || {
        build_app(server_health_state.clone(), http_state.clone())
    })
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;

    #[actix_web::test]
    async fn fixture_wiring_serves_probes_and_api() {
        let health_state = web::Data::new(HealthState::new());
        health_state.mark_ready();
        let config = ServerConfig::new("127.0.0.1:0".parse().expect("addr"));
        let http_state = web::Data::new(HttpState::new(build_scheduling_service(&config)));
        let app = test::init_service(build_app(health_state, http_state)).await;

        let req = test::TestRequest::get().uri("/health/ready").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);

        // The fixture repository holds no animals, so the listing is empty.
        let req = test::TestRequest::get()
            .uri("/api/v1/animals/status")
            .insert_header(("X-Staff-Id", "7"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
    }
}
