//! Event scheduling HTTP handlers.
//!
//! ```text
//! POST /api/v1/events               Create an event with assignments
//! PUT  /api/v1/events/{id}          Update an event and its assignments
//! PUT  /api/v1/events/{id}/animals  Replace the assignment set
//! PUT  /api/v1/events/{id}/checkout Check assigned animals out
//! PUT  /api/v1/events/{id}/checkin  Check animals back in
//! ```

use actix_web::{HttpResponse, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CreateEventRequest, Error, Event, EventDraft, UpdateEventRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::StaffContext;
use crate::inbound::http::state::HttpState;

/// Body for creating an event.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventBody {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub zoo_id: i32,
    pub event_type_id: i32,
    #[schema(format = "date-time")]
    pub start_at: DateTime<Utc>,
    #[schema(format = "date-time")]
    pub end_at: DateTime<Utc>,
    pub animal_ids: Vec<i32>,
    /// Check the animals out as part of creation.
    #[serde(default)]
    pub checkout_immediately: bool,
}

/// Body for updating an event.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventBody {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub zoo_id: i32,
    pub event_type_id: i32,
    #[schema(format = "date-time")]
    pub start_at: DateTime<Utc>,
    #[schema(format = "date-time")]
    pub end_at: DateTime<Utc>,
    pub animal_ids: Vec<i32>,
}

/// Body naming the animals a transition applies to.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnimalIdsBody {
    pub animal_ids: Vec<i32>,
}

/// Create an event with its animal assignments.
#[utoipa::path(
    post,
    path = "/api/v1/events",
    request_body = CreateEventBody,
    responses(
        (status = 200, description = "Event created", body = Event),
        (status = 400, description = "Invalid request or quota reached", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 409, description = "Scheduling clash", body = Error)
    ),
    tags = ["events"],
    operation_id = "createEvent"
)]
#[post("/events")]
pub async fn create_event(
    state: web::Data<HttpState>,
    staff: StaffContext,
    body: web::Json<CreateEventBody>,
) -> ApiResult<web::Json<Event>> {
    let body = body.into_inner();
    let request = CreateEventRequest {
        event: EventDraft {
            name: body.name,
            description: body.description,
            zoo_id: body.zoo_id,
            event_type_id: body.event_type_id,
            start_at: body.start_at,
            end_at: body.end_at,
        },
        animal_ids: body.animal_ids,
        checkout_immediately: body.checkout_immediately,
    };
    let event = state.scheduling.create_event(staff.staff_id, request).await?;
    Ok(web::Json(event))
}

/// Update an event's fields and reconcile its assignments.
#[utoipa::path(
    put,
    path = "/api/v1/events/{id}",
    request_body = UpdateEventBody,
    responses(
        (status = 200, description = "Event updated", body = Event),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Event not found", body = Error),
        (status = 409, description = "Lifecycle or scheduling clash", body = Error)
    ),
    params(("id" = i32, Path, description = "Event id")),
    tags = ["events"],
    operation_id = "updateEvent"
)]
#[put("/events/{id}")]
pub async fn update_event(
    state: web::Data<HttpState>,
    staff: StaffContext,
    path: web::Path<i32>,
    body: web::Json<UpdateEventBody>,
) -> ApiResult<web::Json<Event>> {
    let body = body.into_inner();
    let request = UpdateEventRequest {
        event: EventDraft {
            name: body.name,
            description: body.description,
            zoo_id: body.zoo_id,
            event_type_id: body.event_type_id,
            start_at: body.start_at,
            end_at: body.end_at,
        },
        animal_ids: body.animal_ids,
    };
    let event = state
        .scheduling
        .update_event(staff.staff_id, path.into_inner(), request)
        .await?;
    Ok(web::Json(event))
}

/// Replace the set of animals assigned to an event.
#[utoipa::path(
    put,
    path = "/api/v1/events/{id}/animals",
    request_body = AnimalIdsBody,
    responses(
        (status = 204, description = "Assignments replaced"),
        (status = 404, description = "Event or animal not found", body = Error),
        (status = 409, description = "Scheduling clash", body = Error)
    ),
    params(("id" = i32, Path, description = "Event id")),
    tags = ["events"],
    operation_id = "reassignEventAnimals"
)]
#[put("/events/{id}/animals")]
pub async fn reassign_event_animals(
    state: web::Data<HttpState>,
    staff: StaffContext,
    path: web::Path<i32>,
    body: web::Json<AnimalIdsBody>,
) -> ApiResult<HttpResponse> {
    state
        .scheduling
        .reassign_animals(staff.staff_id, path.into_inner(), body.into_inner().animal_ids)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Check assigned animals out for an event.
#[utoipa::path(
    put,
    path = "/api/v1/events/{id}/checkout",
    request_body = AnimalIdsBody,
    responses(
        (status = 204, description = "Animals checked out"),
        (status = 400, description = "Quota or rest period blocks the checkout", body = Error),
        (status = 401, description = "Unauthorized or tier too low", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Event or assignment not found", body = Error),
        (status = 409, description = "Already checked out", body = Error)
    ),
    params(("id" = i32, Path, description = "Event id")),
    tags = ["events"],
    operation_id = "checkoutEventAnimals"
)]
#[put("/events/{id}/checkout")]
pub async fn checkout_event_animals(
    state: web::Data<HttpState>,
    staff: StaffContext,
    path: web::Path<i32>,
    body: web::Json<AnimalIdsBody>,
) -> ApiResult<HttpResponse> {
    state
        .scheduling
        .checkout(staff.staff_id, path.into_inner(), body.into_inner().animal_ids)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Check animals back in from an event.
#[utoipa::path(
    put,
    path = "/api/v1/events/{id}/checkin",
    request_body = AnimalIdsBody,
    responses(
        (status = 204, description = "Animals checked in"),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 404, description = "Event or assignment not found", body = Error),
        (status = 409, description = "Animal was not checked out", body = Error)
    ),
    params(("id" = i32, Path, description = "Event id")),
    tags = ["events"],
    operation_id = "checkinEventAnimals"
)]
#[put("/events/{id}/checkin")]
pub async fn checkin_event_animals(
    state: web::Data<HttpState>,
    staff: StaffContext,
    path: web::Path<i32>,
    body: web::Json<AnimalIdsBody>,
) -> ApiResult<HttpResponse> {
    state
        .scheduling
        .check_in(staff.staff_id, path.into_inner(), body.into_inner().animal_ids)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
