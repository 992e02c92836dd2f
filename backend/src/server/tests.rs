//! Tests for server bootstrap: readiness signalling and the assembled app
//! running over the in-memory store.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{test as actix_test, web};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use equipment_movements::domain::TRACE_ID_HEADER;
use equipment_movements::domain::movement::MovementSettings;
use equipment_movements::domain::ports::NoOpMovementMetrics;

use super::*;

#[fixture]
fn health_state() -> web::Data<HealthState> {
    web::Data::new(HealthState::new())
}

#[fixture]
fn memory_config() -> ServerConfig {
    ServerConfig::new(
        "127.0.0.1:0".parse().expect("loopback address"),
        MovementSettings::default(),
    )
}

#[rstest]
#[actix_rt::test]
async fn create_server_marks_ready(health_state: web::Data<HealthState>, memory_config: ServerConfig) {
    assert!(!health_state.is_ready(), "state should start unready");

    let _server = create_server(health_state.clone(), memory_config)
        .expect("server should bind a loopback port");

    assert!(
        health_state.is_ready(),
        "server creation should mark readiness"
    );
}

#[rstest]
#[actix_rt::test]
async fn assembled_app_records_a_movement(
    health_state: web::Data<HealthState>,
    memory_config: ServerConfig,
) {
    let http_state = build_http_state(&memory_config, Arc::new(NoOpMovementMetrics));
    let app = actix_test::init_service(build_app(health_state, web::Data::new(http_state))).await;

    let equipment: Value = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/equipment")
            .set_json(json!({ "mobile": "9800000000", "eqp_type": "paver" }))
            .to_request(),
    )
    .await;
    let eqp_id = equipment["eqp_id"].as_str().expect("eqp_id").to_owned();
    assert_eq!(eqp_id, "EQP-00001");

    let route: Value = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/routes")
            .set_json(json!({ "eqp_id": eqp_id }))
            .to_request(),
    )
    .await;
    let route_id = route["route_id"].as_str().expect("route_id").to_owned();

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/movements")
            .set_json(json!({
                "route_id": route_id,
                "eqp_id": eqp_id,
                "samples": [{ "sample_id": "a", "type": 0 }],
            }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(response.headers().contains_key(TRACE_ID_HEADER));

    let cycle: Value = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/movements/{route_id}/{eqp_id}/1/1"))
            .to_request(),
    )
    .await;
    assert_eq!(cycle["status"], "live");
    assert_eq!(cycle["samples"][0]["sample_id"], "a");
}

#[rstest]
#[actix_rt::test]
async fn probes_are_mounted_at_the_root(
    health_state: web::Data<HealthState>,
    memory_config: ServerConfig,
) {
    let http_state = build_http_state(&memory_config, Arc::new(NoOpMovementMetrics));
    let app = actix_test::init_service(build_app(health_state, web::Data::new(http_state))).await;

    let live_response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/health/live").to_request(),
    )
    .await;
    assert_eq!(live_response.status(), StatusCode::OK);

    let ready_response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/health/ready").to_request(),
    )
    .await;
    assert_eq!(ready_response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
