//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct generating the OpenAPI specification for
//! the REST API: all animal and event endpoints, the health probes, and the
//! schemas they reference. The generated document is served at
//! `/api-docs/openapi.json` in debug builds.

use utoipa::OpenApi;

use crate::domain::{
    Animal, AnimalStatus, AuditAction, AuditRecord, DerivedStatus, Error, ErrorCode, Event,
};
use crate::inbound::http::animals::{
    AnimalStatusBody, AvailabilityBody, CascadeReportBody,
};
use crate::inbound::http::events::{AnimalIdsBody, CreateEventBody, UpdateEventBody};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Animal scheduling backend API",
        description = "HTTP interface for animal availability, event scheduling, \
            check-out tracking, and the audit trail."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::animals::list_animal_statuses,
        crate::inbound::http::animals::set_animal_availability,
        crate::inbound::http::animals::list_animal_audits,
        crate::inbound::http::animals::delete_animal,
        crate::inbound::http::events::create_event,
        crate::inbound::http::events::update_event,
        crate::inbound::http::events::reassign_event_animals,
        crate::inbound::http::events::checkout_event_animals,
        crate::inbound::http::events::checkin_event_animals,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Animal,
        AnimalStatus,
        AnimalStatusBody,
        AnimalIdsBody,
        AuditAction,
        AuditRecord,
        AvailabilityBody,
        CascadeReportBody,
        CreateEventBody,
        DerivedStatus,
        Error,
        ErrorCode,
        Event,
        UpdateEventBody,
    )),
    tags(
        (name = "animals", description = "Animal registry and availability"),
        (name = "events", description = "Event scheduling and check-out transitions"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get("Error").expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
    }

    #[test]
    fn all_scheduling_endpoints_are_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/animals/status",
            "/api/v1/animals/{id}/availability",
            "/api/v1/animals/{id}/audits",
            "/api/v1/animals/{id}",
            "/api/v1/events",
            "/api/v1/events/{id}",
            "/api/v1/events/{id}/animals",
            "/api/v1/events/{id}/checkout",
            "/api/v1/events/{id}/checkin",
        ] {
            assert!(
                doc.paths.paths.contains_key(path),
                "missing path {path}"
            );
        }
    }
}
