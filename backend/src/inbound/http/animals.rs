//! Animal registry HTTP handlers.
//!
//! ```text
//! GET    /api/v1/animals/status            Derived availability per animal
//! PUT    /api/v1/animals/{id}/availability Admin availability override
//! GET    /api/v1/animals/{id}/audits       Audit history, newest first
//! DELETE /api/v1/animals/{id}              Cascading delete
//! ```

use actix_web::{HttpResponse, delete, get, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::AnimalFilter;
use crate::domain::{Animal, AuditRecord, DerivedStatus, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::StaffContext;
use crate::inbound::http::state::HttpState;

/// Query parameters for the status listing.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct AnimalStatusQuery {
    /// Comma-separated animal ids; omit for all animals.
    pub ids: Option<String>,
    /// Restrict to one facility.
    pub zoo_id: Option<i32>,
}

/// One animal with its derived scheduling status.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnimalStatusBody {
    pub animal: Animal,
    pub status: DerivedStatus,
    /// User-facing reason for the derived status.
    pub reason: String,
    pub daily_checkout_count: i64,
    pub daily_checkout_hours: f64,
}

/// Body for the availability override.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityBody {
    pub available: bool,
}

/// Rows removed by a cascading delete.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CascadeReportBody {
    pub assignments_deleted: u64,
    pub audits_deleted: u64,
}

fn parse_id_list(raw: Option<String>) -> Result<Option<Vec<i32>>, Error> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i32>().map_err(|_| {
                Error::invalid_request("ids must be a comma-separated list of integers")
                    .with_details(json!({ "field": "ids", "value": part }))
            })
        })
        .collect::<Result<Vec<i32>, Error>>()
        .map(Some)
}

/// List animals with their derived availability.
#[utoipa::path(
    get,
    path = "/api/v1/animals/status",
    params(AnimalStatusQuery),
    responses(
        (status = 200, description = "Derived status per animal", body = [AnimalStatusBody]),
        (status = 400, description = "Invalid request", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["animals"],
    operation_id = "listAnimalStatuses"
)]
#[get("/animals/status")]
pub async fn list_animal_statuses(
    state: web::Data<HttpState>,
    query: web::Query<AnimalStatusQuery>,
) -> ApiResult<web::Json<Vec<AnimalStatusBody>>> {
    let query = query.into_inner();
    let filter = AnimalFilter {
        ids: parse_id_list(query.ids)?,
        zoo_id: query.zoo_id,
    };
    let statuses = state.scheduling.animal_statuses(filter).await?;
    Ok(web::Json(
        statuses
            .into_iter()
            .map(|entry| AnimalStatusBody {
                status: entry.availability.status,
                reason: entry.availability.reason,
                daily_checkout_count: entry.daily_checkout_count,
                daily_checkout_hours: entry.daily_checkout_hours,
                animal: entry.animal,
            })
            .collect(),
    ))
}

/// Administrator availability override.
#[utoipa::path(
    put,
    path = "/api/v1/animals/{id}/availability",
    request_body = AvailabilityBody,
    responses(
        (status = 204, description = "Override applied"),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Animal not found", body = Error)
    ),
    params(("id" = i32, Path, description = "Animal id")),
    tags = ["animals"],
    operation_id = "setAnimalAvailability"
)]
#[put("/animals/{id}/availability")]
pub async fn set_animal_availability(
    state: web::Data<HttpState>,
    staff: StaffContext,
    path: web::Path<i32>,
    body: web::Json<AvailabilityBody>,
) -> ApiResult<HttpResponse> {
    state
        .scheduling
        .set_availability(staff.staff_id, path.into_inner(), body.available)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// An animal's audit history, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/animals/{id}/audits",
    responses(
        (status = 200, description = "Audit records, newest first", body = [AuditRecord]),
        (status = 404, description = "Animal not found", body = Error)
    ),
    params(("id" = i32, Path, description = "Animal id")),
    tags = ["animals"],
    operation_id = "listAnimalAudits"
)]
#[get("/animals/{id}/audits")]
pub async fn list_animal_audits(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<Vec<AuditRecord>>> {
    let records = state.scheduling.audit_history(path.into_inner()).await?;
    Ok(web::Json(records))
}

/// Delete an animal and its dependent rows.
#[utoipa::path(
    delete,
    path = "/api/v1/animals/{id}",
    responses(
        (status = 200, description = "Animal deleted", body = CascadeReportBody),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Animal not found", body = Error),
        (status = 409, description = "Animal is in the field", body = Error)
    ),
    params(("id" = i32, Path, description = "Animal id")),
    tags = ["animals"],
    operation_id = "deleteAnimal"
)]
#[delete("/animals/{id}")]
pub async fn delete_animal(
    state: web::Data<HttpState>,
    staff: StaffContext,
    path: web::Path<i32>,
) -> ApiResult<web::Json<CascadeReportBody>> {
    let report = state
        .scheduling
        .delete_animal(staff.staff_id, path.into_inner())
        .await?;
    Ok(web::Json(CascadeReportBody {
        assignments_deleted: report.assignments_deleted,
        audits_deleted: report.audits_deleted,
    }))
}

#[cfg(test)]
#[path = "animals_tests.rs"]
mod tests;
