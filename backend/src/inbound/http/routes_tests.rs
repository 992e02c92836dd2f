//! Tests for route HTTP handlers.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use chrono::Utc;
use mockall::predicate::eq;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::{EquipmentId, RouteId};
use crate::inbound::http::test_utils::MockPorts;

fn locked(route_id: &str, route: NewRoute) -> Route {
    route.into_route(RouteId::new(route_id).expect("id"), Utc::now())
}

fn sample_route(route_id: &str) -> Route {
    let draft = RouteDraft {
        eqp_id: "EQP-00001".to_owned(),
        start_gps: Some("28.7041,77.1025".to_owned()),
        ..RouteDraft::default()
    };
    locked(route_id, NewRoute::try_from(draft).expect("valid draft"))
}

#[actix_web::test]
async fn create_route_echoes_normalised_route() {
    let mut ports = MockPorts::default();
    ports
        .routes
        .expect_create_route()
        .times(1)
        .returning(|route| Ok(locked("ROT-00001", route)));
    let app = actix_test::init_service(ports.into_app()).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/routes")
        .set_json(json!({
            "eqp_id": "EQP-00001",
            "route_name": "NH-48",
            "start_gps": " 28.7041 , 77.1025 ",
            "end_gps": "",
            "start_km": 12.5
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["route_id"], "ROT-00001");
    assert_eq!(body["start_gps"], "28.7041,77.1025");
    assert!(body["end_gps"].is_null());
    assert_eq!(body["start_km"], 12.5);
}

#[rstest]
#[case(json!({ "eqp_id": "" }), "eqp_id")]
#[case(json!({ "eqp_id": "EQP-00001", "start_gps": "north" }), "start_gps")]
#[case(json!({ "eqp_id": "EQP-00001", "end_gps": "95.0,10.0" }), "end_gps")]
#[actix_web::test]
async fn create_route_rejects_invalid_fields(#[case] payload: Value, #[case] field: &str) {
    let mut ports = MockPorts::default();
    ports.routes.expect_create_route().never();
    let app = actix_test::init_service(ports.into_app()).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/routes")
        .set_json(payload)
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["field"], field);
}

#[actix_web::test]
async fn create_route_for_unknown_equipment_is_not_found() {
    let mut ports = MockPorts::default();
    ports.routes.expect_create_route().returning(|_| {
        Err(Error::not_found("equipment EQP-00009 not found")
            .with_details(json!({ "code": "equipment_not_found" })))
    });
    let app = actix_test::init_service(ports.into_app()).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/routes")
        .set_json(json!({ "eqp_id": "EQP-00009" }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["code"], "equipment_not_found");
}

#[actix_web::test]
async fn equipment_routes_filter_by_path_id() {
    let mut ports = MockPorts::default();
    ports
        .routes
        .expect_list_routes_for_equipment()
        .with(eq(EquipmentId::new("EQP-00001").expect("id")))
        .returning(|_| Ok(vec![sample_route("ROT-00002"), sample_route("ROT-00001")]));
    let app = actix_test::init_service(ports.into_app()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/equipment/EQP-00001/routes")
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body.as_array().map(Vec::len), Some(2));
    assert_eq!(body[0]["route_id"], "ROT-00002");
}

#[actix_web::test]
async fn get_route_returns_single_route() {
    let mut ports = MockPorts::default();
    ports
        .routes
        .expect_get_route()
        .with(eq(RouteId::new("ROT-00003").expect("id")))
        .returning(|_| Ok(sample_route("ROT-00003")));
    let app = actix_test::init_service(ports.into_app()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/routes/ROT-00003")
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["eqp_id"], "EQP-00001");
}
