//! Tests for event scheduling HTTP handlers.

use std::collections::HashMap;

use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use chrono::Duration;
use serde_json::Value;

use super::*;
use crate::domain::AnimalAssignment;
use crate::domain::availability::DailyUsage;
use crate::domain::capability;
use crate::domain::ports::{
    MockActorDirectory, MockAnimalRepository, MockAuditLog, MockSchedulingRepository,
};
use crate::inbound::http::auth::STAFF_ID_HEADER;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::test_utils::{actor_with, animal, directory_with, event, now, state_with};

fn test_app(
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new().app_data(web::Data::new(state)).service(
        web::scope("/api/v1")
            .service(create_event)
            .service(update_event)
            .service(reassign_event_animals)
            .service(checkout_event_animals)
            .service(checkin_event_animals),
    )
}

fn create_body() -> CreateEventBody {
    let prototype = event(0);
    CreateEventBody {
        name: prototype.name,
        description: prototype.description,
        zoo_id: prototype.zoo_id,
        event_type_id: prototype.event_type_id,
        start_at: prototype.start_at,
        end_at: prototype.end_at,
        animal_ids: vec![1],
        checkout_immediately: false,
    }
}

fn assigned_link(animal_id: i32, event_id: i32) -> AnimalAssignment {
    AnimalAssignment {
        id: animal_id * 100,
        animal_id,
        event_id,
        user_out_id: None,
        user_in_id: None,
        checked_out: None,
        checked_in: None,
    }
}

#[actix_web::test]
async fn create_event_returns_the_created_event() {
    let mut animals = MockAnimalRepository::new();
    animals
        .expect_list()
        .returning(|_| Ok(vec![animal(1, "Horus")]));

    let mut scheduling = MockSchedulingRepository::new();
    scheduling
        .expect_busy_intervals()
        .returning(|_, _, _, _, _| Ok(Vec::new()));
    scheduling
        .expect_create_event()
        .times(1)
        .returning(|draft, _, _, _| {
            Ok(crate::domain::Event {
                id: 42,
                name: draft.name.clone(),
                description: draft.description.clone(),
                zoo_id: draft.zoo_id,
                event_type_id: draft.event_type_id,
                start_at: draft.start_at,
                end_at: draft.end_at,
            })
        });

    let app = actix_test::init_service(test_app(state_with(
        animals,
        scheduling,
        MockAuditLog::new(),
        directory_with(actor_with(&[capability::CREATE_EVENTS])),
    )))
    .await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/events")
        .insert_header((STAFF_ID_HEADER, "9"))
        .set_json(create_body())
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["id"], 42);
    assert_eq!(body["name"], "Falconry display");
}

#[actix_web::test]
async fn create_event_with_inverted_window_is_a_bad_request() {
    let mut body = create_body();
    body.end_at = body.start_at - Duration::minutes(5);

    let app = actix_test::init_service(test_app(state_with(
        MockAnimalRepository::new(),
        MockSchedulingRepository::new(),
        MockAuditLog::new(),
        directory_with(actor_with(&[capability::CREATE_EVENTS])),
    )))
    .await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/events")
        .insert_header((STAFF_ID_HEADER, "9"))
        .set_json(body)
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let parsed: Value = actix_test::read_body_json(response).await;
    assert_eq!(parsed["code"], "invalid_request");
}

#[actix_web::test]
async fn checkout_blocked_by_quota_reports_quota_exceeded() {
    let mut animals = MockAnimalRepository::new();
    animals
        .expect_list()
        .returning(|_| Ok(vec![animal(1, "Horus")]));
    animals.expect_daily_usage().returning(|_, _| {
        Ok(HashMap::from([(
            1,
            DailyUsage {
                checkout_count: 3,
                checkout_hours: 0.5,
            },
        )]))
    });

    let mut scheduling = MockSchedulingRepository::new();
    scheduling
        .expect_find_event()
        .returning(|id| Ok(Some(event(id))));
    scheduling
        .expect_assignments_for_event()
        .returning(|event_id| Ok(vec![assigned_link(1, event_id)]));
    scheduling.expect_apply_checkout().times(0);

    let app = actix_test::init_service(test_app(state_with(
        animals,
        scheduling,
        MockAuditLog::new(),
        directory_with(actor_with(&[capability::CHECKOUT_ANIMALS])),
    )))
    .await;

    let request = actix_test::TestRequest::put()
        .uri("/api/v1/events/5/checkout")
        .insert_header((STAFF_ID_HEADER, "9"))
        .set_json(AnimalIdsBody { animal_ids: vec![1] })
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "quota_exceeded");
    assert_eq!(
        body["message"],
        "Horus is not available to checkout: Daily check-out limit reached"
    );
}

#[actix_web::test]
async fn double_checkout_is_a_conflict() {
    let mut animals = MockAnimalRepository::new();
    animals
        .expect_list()
        .returning(|_| Ok(vec![animal(1, "Horus")]));

    let mut scheduling = MockSchedulingRepository::new();
    scheduling
        .expect_find_event()
        .returning(|id| Ok(Some(event(id))));
    scheduling.expect_assignments_for_event().returning(|event_id| {
        let mut link = assigned_link(1, event_id);
        link.user_out_id = Some(9);
        link.checked_out = Some(now() - Duration::hours(1));
        Ok(vec![link])
    });

    let app = actix_test::init_service(test_app(state_with(
        animals,
        scheduling,
        MockAuditLog::new(),
        directory_with(actor_with(&[capability::CHECKOUT_ANIMALS])),
    )))
    .await;

    let request = actix_test::TestRequest::put()
        .uri("/api/v1/events/5/checkout")
        .insert_header((STAFF_ID_HEADER, "9"))
        .set_json(AnimalIdsBody { animal_ids: vec![1] })
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn checkin_returns_no_content() {
    let mut animals = MockAnimalRepository::new();
    animals
        .expect_list()
        .returning(|_| Ok(vec![animal(1, "Horus")]));

    let mut scheduling = MockSchedulingRepository::new();
    scheduling
        .expect_find_event()
        .returning(|id| Ok(Some(event(id))));
    scheduling.expect_assignments_for_event().returning(|event_id| {
        let mut link = assigned_link(1, event_id);
        link.user_out_id = Some(9);
        link.checked_out = Some(now() - Duration::hours(1));
        Ok(vec![link])
    });
    scheduling
        .expect_apply_check_in()
        .times(1)
        .returning(|_, _, _, _| Ok(()));

    let app = actix_test::init_service(test_app(state_with(
        animals,
        scheduling,
        MockAuditLog::new(),
        directory_with(actor_with(&[capability::CHECKIN_ANIMALS])),
    )))
    .await;

    let request = actix_test::TestRequest::put()
        .uri("/api/v1/events/5/checkin")
        .insert_header((STAFF_ID_HEADER, "9"))
        .set_json(AnimalIdsBody { animal_ids: vec![1] })
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn updating_an_ended_event_is_a_conflict() {
    let mut scheduling = MockSchedulingRepository::new();
    scheduling.expect_find_event().returning(|id| {
        let mut ended = event(id);
        ended.start_at = now() - Duration::hours(3);
        ended.end_at = now() - Duration::hours(1);
        Ok(Some(ended))
    });

    let app = actix_test::init_service(test_app(state_with(
        MockAnimalRepository::new(),
        scheduling,
        MockAuditLog::new(),
        directory_with(actor_with(&[capability::UPDATE_EVENTS])),
    )))
    .await;

    let body = create_body();
    let request = actix_test::TestRequest::put()
        .uri("/api/v1/events/5")
        .insert_header((STAFF_ID_HEADER, "9"))
        .set_json(UpdateEventBody {
            name: body.name,
            description: body.description,
            zoo_id: body.zoo_id,
            event_type_id: body.event_type_id,
            start_at: body.start_at,
            end_at: body.end_at,
            animal_ids: body.animal_ids,
        })
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let parsed: Value = actix_test::read_body_json(response).await;
    assert_eq!(parsed["message"], "Event is already ended");
}

#[actix_web::test]
async fn reassignment_returns_no_content() {
    let mut animals = MockAnimalRepository::new();
    animals
        .expect_list()
        .returning(|_| Ok(vec![animal(2, "Kaa")]));

    let mut scheduling = MockSchedulingRepository::new();
    scheduling
        .expect_find_event()
        .returning(|id| Ok(Some(event(id))));
    scheduling
        .expect_busy_intervals()
        .returning(|_, _, _, _, _| Ok(Vec::new()));
    scheduling
        .expect_assignments_for_event()
        .returning(|event_id| Ok(vec![assigned_link(1, event_id)]));
    scheduling
        .expect_replace_assignments()
        .times(1)
        .withf(|_, to_add, to_remove, _| to_add == [2] && to_remove == [1])
        .returning(|_, _, _, _| Ok(()));

    let app = actix_test::init_service(test_app(state_with(
        animals,
        scheduling,
        MockAuditLog::new(),
        directory_with(actor_with(&[capability::UPDATE_EVENTS])),
    )))
    .await;

    let request = actix_test::TestRequest::put()
        .uri("/api/v1/events/5/animals")
        .insert_header((STAFF_ID_HEADER, "9"))
        .set_json(AnimalIdsBody { animal_ids: vec![2] })
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
