//! Tests for movement HTTP handlers.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use chrono::{DateTime, TimeZone, Utc};
use mockall::predicate::eq;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::movement::{
    GroupLabel, MovementCycleDraft, RouteEndpoints, Sample, SlotLayout, pack,
};
use crate::domain::{EquipmentId, RouteId};
use crate::inbound::http::test_utils::MockPorts;
use crate::test_support::tagged_samples;

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, hour, 0, 0)
        .single()
        .expect("timestamp")
}

fn route_id() -> RouteId {
    RouteId::new("ROT-00001").expect("route id")
}

fn eqp_id() -> EquipmentId {
    EquipmentId::new("EQP-00001").expect("equipment id")
}

fn write_result(request: &SubmitMovementRequest, created: bool) -> CycleWriteResult {
    CycleWriteResult {
        route_id: request.route_id.clone(),
        eqp_id: request.eqp_id.clone(),
        group_no: 1,
        cycle_number: 1,
        group_label: match &request.group {
            GroupSelector::Label(label) => Some(label.clone()),
            _ => None,
        },
        status: CycleStatus::Live,
        created,
        existing_samples: 0,
        new_samples: request.samples.len(),
        duplicate_samples: 0,
        total_samples: request.samples.len(),
        dropped_samples: 0,
        active_slot_index: 1,
        capacity_exceeded: false,
        can_create_next_cycle: false,
        start_time: at(9),
        end_time: None,
    }
}

fn stored_cycle() -> MovementCycle {
    let samples: Vec<Sample> = tagged_samples("s", 1, &[0, 2])
        .into_iter()
        .map(|value| Sample::try_from(value).expect("sample"))
        .collect();
    let packed = pack(Vec::new(), samples, SlotLayout::default());
    MovementCycle::new(MovementCycleDraft {
        route_id: route_id(),
        eqp_id: eqp_id(),
        key: CycleKey::new(2, 3),
        group_label: Some(GroupLabel::new("north").expect("label")),
        slots: packed.slots,
        active_slot_index: packed.active_slot_index,
        total_sample_count: packed.total_stored,
        status: CycleStatus::Completed,
        start_time: at(9),
        end_time: Some(at(10)),
        endpoints: RouteEndpoints::default(),
        revision: 1,
        inserted_on: at(10),
    })
    .expect("valid cycle")
}

#[rstest]
#[case(true, StatusCode::CREATED)]
#[case(false, StatusCode::OK)]
#[actix_web::test]
async fn submit_reports_created_or_appended(#[case] created: bool, #[case] status: StatusCode) {
    let mut ports = MockPorts::default();
    ports
        .movements
        .expect_submit()
        .times(1)
        .returning(move |request| Ok(write_result(&request, created)));
    let app = actix_test::init_service(ports.into_app()).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/movements")
        .set_json(json!({
            "route_id": "ROT-00001",
            "eqp_id": "EQP-00001",
            "samples": tagged_samples("s", 1, &[0, 1, 1]),
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), status);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["created"], created);
    assert_eq!(body["total_samples"], 3);
    assert_eq!(body["status"], "live");
    assert!(body["end_time"].is_null());
}

#[actix_web::test]
async fn submit_passes_selectors_through() {
    let mut ports = MockPorts::default();
    ports
        .movements
        .expect_submit()
        .withf(|request| {
            request.group == GroupSelector::Label(GroupLabel::new("north").expect("label"))
                && request.cycle_number == Some(2)
                && request.max_cycles_per_group == Some(4)
                && request.status == Some(CycleStatus::Completed)
        })
        .times(1)
        .returning(|request| Ok(write_result(&request, true)));
    let app = actix_test::init_service(ports.into_app()).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/movements")
        .set_json(json!({
            "route_id": "ROT-00001",
            "eqp_id": "EQP-00001",
            "group_label": " north ",
            "cycle_number": 2,
            "max_cycles_per_group": 4,
            "status": "completed",
            "samples": [{ "type": 2 }],
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["group_label"], "north");
}

#[rstest]
#[case(json!({ "group_no": 1, "group_label": "north" }), "conflicting_group_selector")]
#[case(json!({ "status": "finished" }), "invalid_status")]
#[case(json!({ "group_label": "  " }), "invalid_field")]
#[case(json!({ "route_id": "" }), "invalid_field")]
#[actix_web::test]
async fn submit_rejects_malformed_requests(#[case] overrides: Value, #[case] code: &str) {
    let mut ports = MockPorts::default();
    ports.movements.expect_submit().never();
    let app = actix_test::init_service(ports.into_app()).await;

    let mut payload = json!({
        "route_id": "ROT-00001",
        "eqp_id": "EQP-00001",
        "samples": [{ "type": 0 }],
    });
    if let (Some(target), Some(fields)) = (payload.as_object_mut(), overrides.as_object()) {
        for (key, value) in fields {
            target.insert(key.clone(), value.clone());
        }
    }

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/movements")
        .set_json(payload)
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["code"], code);
}

#[actix_web::test]
async fn submit_surfaces_sample_index_from_writer() {
    let mut ports = MockPorts::default();
    ports.movements.expect_submit().returning(|_| {
        Err(Error::invalid_request("sample 1 must be a JSON object")
            .with_details(json!({ "code": "not_an_object", "index": 1 })))
    });
    let app = actix_test::init_service(ports.into_app()).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/movements")
        .set_json(json!({
            "route_id": "ROT-00001",
            "eqp_id": "EQP-00001",
            "samples": [{ "type": 0 }, 7],
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["index"], 1);
}

#[actix_web::test]
async fn get_cycle_returns_samples_in_order() {
    let mut ports = MockPorts::default();
    ports
        .movements_query
        .expect_get_cycle()
        .with(eq(route_id()), eq(eqp_id()), eq(CycleKey::new(2, 3)))
        .returning(|_, _, _| Ok(stored_cycle()));
    let app = actix_test::init_service(ports.into_app()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/movements/ROT-00001/EQP-00001/2/3")
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["group_no"], 2);
    assert_eq!(body["cycle_number"], 3);
    assert_eq!(body["status"], "completed");
    assert_eq!(body["total_sample_count"], 2);
    assert_eq!(body["samples"][0]["sample_id"], "s-1");
    assert_eq!(body["samples"][1]["sample_id"], "s-2");
}

#[actix_web::test]
async fn get_cycle_rejects_non_numeric_segments() {
    let mut ports = MockPorts::default();
    ports.movements_query.expect_get_cycle().never();
    let app = actix_test::init_service(ports.into_app()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/movements/ROT-00001/EQP-00001/two/3")
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["field"], "group_no");
}

#[actix_web::test]
async fn summaries_omit_samples() {
    let mut ports = MockPorts::default();
    ports
        .movements_query
        .expect_movements_for_group()
        .with(eq(2))
        .returning(|_| Ok(vec![stored_cycle().summary()]));
    let app = actix_test::init_service(ports.into_app()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/movements/group/2")
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body[0]["group_label"], "north");
    assert!(body[0].get("samples").is_none());
    assert_eq!(body[0]["end_time"], "2026-03-02T10:00:00+00:00");
}

#[actix_web::test]
async fn route_without_cycles_is_not_found() {
    let mut ports = MockPorts::default();
    ports
        .movements_query
        .expect_movement_for_route()
        .returning(|route_id| {
            Err(Error::not_found(format!("no movement recorded for route {route_id}"))
                .with_details(json!({ "code": "movement_not_found" })))
        });
    let app = actix_test::init_service(ports.into_app()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/movements/route/ROT-00077")
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["code"], "movement_not_found");
}

#[actix_web::test]
async fn equipment_movements_list_in_port_order() {
    let mut ports = MockPorts::default();
    ports
        .movements_query
        .expect_movements_for_equipment()
        .with(eq(eqp_id()))
        .returning(|_| Ok(vec![stored_cycle().summary(), stored_cycle().summary()]));
    ports
        .movements_query
        .expect_list_movements()
        .returning(|| Ok(Vec::new()));
    let app = actix_test::init_service(ports.into_app()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/movements/equipment/EQP-00001")
            .to_request(),
    )
    .await;
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body.as_array().map(Vec::len), Some(2));

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/movements")
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body, json!([]));
}
