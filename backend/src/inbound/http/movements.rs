//! Movement cycle HTTP handlers.
//!
//! ```text
//! POST /api/v1/movements
//! GET /api/v1/movements
//! GET /api/v1/movements/route/{route_id}
//! GET /api/v1/movements/equipment/{eqp_id}
//! GET /api/v1/movements/group/{group_no}
//! GET /api/v1/movements/{route_id}/{eqp_id}/{group_no}/{cycle_number}
//! ```
//!
//! Samples travel as opaque JSON objects; the cycle writer validates them and
//! reports failures with the offending `index`.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

use crate::domain::movement::{CycleKey, CycleStatus, CycleSummary, MovementCycle};
use crate::domain::ports::{CycleWriteResult, GroupSelector, SubmitMovementRequest};
use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_equipment_id, parse_group_label, parse_number, parse_route_id, parse_status,
};

/// Request payload for submitting a batch of samples.
///
/// At most one of `group_no` and `group_label` may be given. Without either,
/// an explicit `cycle_number` counts cycles across groups.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct SubmitMovementRequestBody {
    #[schema(example = "ROT-00001")]
    pub route_id: String,
    #[schema(example = "EQP-00001")]
    pub eqp_id: String,
    pub group_no: Option<u32>,
    pub group_label: Option<String>,
    pub cycle_number: Option<u32>,
    pub max_cycles_per_group: Option<u32>,
    /// Sample objects; `type` (0, 1, 2), `sample_id`, `start_gps` and
    /// `end_gps` carry meaning, other fields are stored as given.
    #[schema(value_type = Vec<Object>)]
    pub samples: Vec<Value>,
    /// Caller-asserted status, honoured under the type-tag strategy only.
    #[schema(example = "live")]
    pub status: Option<String>,
}

/// Outcome of a movement submission.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CycleWriteResponseBody {
    pub route_id: String,
    pub eqp_id: String,
    pub group_no: u32,
    pub cycle_number: u32,
    pub group_label: Option<String>,
    pub status: CycleStatus,
    pub created: bool,
    pub existing_samples: usize,
    pub new_samples: usize,
    pub duplicate_samples: usize,
    pub total_samples: usize,
    pub dropped_samples: usize,
    pub active_slot_index: usize,
    pub capacity_exceeded: bool,
    pub can_create_next_cycle: bool,
    #[schema(format = "date-time")]
    pub start_time: String,
    #[schema(format = "date-time")]
    pub end_time: Option<String>,
}

impl From<CycleWriteResult> for CycleWriteResponseBody {
    fn from(value: CycleWriteResult) -> Self {
        Self {
            route_id: value.route_id.to_string(),
            eqp_id: value.eqp_id.to_string(),
            group_no: value.group_no,
            cycle_number: value.cycle_number,
            group_label: value.group_label.map(|label| label.to_string()),
            status: value.status,
            created: value.created,
            existing_samples: value.existing_samples,
            new_samples: value.new_samples,
            duplicate_samples: value.duplicate_samples,
            total_samples: value.total_samples,
            dropped_samples: value.dropped_samples,
            active_slot_index: value.active_slot_index,
            capacity_exceeded: value.capacity_exceeded,
            can_create_next_cycle: value.can_create_next_cycle,
            start_time: value.start_time.to_rfc3339(),
            end_time: value.end_time.map(|time| time.to_rfc3339()),
        }
    }
}

/// Cycle projection without the sample payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CycleSummaryBody {
    pub route_id: String,
    pub eqp_id: String,
    pub group_no: u32,
    pub cycle_number: u32,
    pub group_label: Option<String>,
    pub active_slot_index: usize,
    pub total_sample_count: usize,
    pub status: CycleStatus,
    #[schema(format = "date-time")]
    pub start_time: String,
    #[schema(format = "date-time")]
    pub end_time: Option<String>,
    pub start_gps: Option<String>,
    pub end_gps: Option<String>,
    /// Time of the latest write to the cycle.
    #[schema(format = "date-time")]
    pub inserted_on: String,
}

impl From<CycleSummary> for CycleSummaryBody {
    fn from(value: CycleSummary) -> Self {
        Self {
            route_id: value.route_id.to_string(),
            eqp_id: value.eqp_id.to_string(),
            group_no: value.key.group_no,
            cycle_number: value.key.cycle_number,
            group_label: value.group_label.map(|label| label.to_string()),
            active_slot_index: value.active_slot_index,
            total_sample_count: value.total_sample_count,
            status: value.status,
            start_time: value.start_time.to_rfc3339(),
            end_time: value.end_time.map(|time| time.to_rfc3339()),
            start_gps: value.endpoints.start.map(|point| point.to_string()),
            end_gps: value.endpoints.end.map(|point| point.to_string()),
            inserted_on: value.inserted_on.to_rfc3339(),
        }
    }
}

/// A cycle with its samples in arrival order.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CycleDetailBody {
    #[serde(flatten)]
    pub summary: CycleSummaryBody,
    #[schema(value_type = Vec<Object>)]
    pub samples: Vec<Value>,
}

impl From<MovementCycle> for CycleDetailBody {
    fn from(value: MovementCycle) -> Self {
        let summary = CycleSummaryBody::from(value.summary());
        Self {
            summary,
            samples: value.into_samples().into_iter().map(Value::from).collect(),
        }
    }
}

fn parse_group_selector(
    group_no: Option<u32>,
    group_label: Option<String>,
) -> Result<GroupSelector, Error> {
    match (group_no, group_label) {
        (Some(_), Some(_)) => Err(Error::invalid_request(
            "group_no and group_label cannot be combined",
        )
        .with_details(json!({
            "field": "group_label",
            "code": "conflicting_group_selector",
        }))),
        (Some(number), None) => Ok(GroupSelector::Number(number)),
        (None, Some(label)) => Ok(GroupSelector::Label(parse_group_label(
            &label,
            FieldName::new("group_label"),
        )?)),
        (None, None) => Ok(GroupSelector::Auto),
    }
}

fn parse_submission(payload: SubmitMovementRequestBody) -> Result<SubmitMovementRequest, Error> {
    Ok(SubmitMovementRequest {
        route_id: parse_route_id(&payload.route_id)?,
        eqp_id: parse_equipment_id(&payload.eqp_id)?,
        group: parse_group_selector(payload.group_no, payload.group_label)?,
        cycle_number: payload.cycle_number,
        max_cycles_per_group: payload.max_cycles_per_group,
        samples: payload.samples,
        status: payload
            .status
            .as_deref()
            .map(|status| parse_status(status, FieldName::new("status")))
            .transpose()?,
    })
}

fn summary_list(summaries: Vec<CycleSummary>) -> web::Json<Vec<CycleSummaryBody>> {
    web::Json(summaries.into_iter().map(CycleSummaryBody::from).collect())
}

/// Merge a batch of samples into the targeted movement cycle.
///
/// Returns 201 when a new cycle was opened and 200 when samples were
/// appended to an existing one.
#[utoipa::path(
    post,
    path = "/api/v1/movements",
    request_body = SubmitMovementRequestBody,
    responses(
        (status = 200, description = "Samples appended", body = CycleWriteResponseBody),
        (status = 201, description = "Cycle created", body = CycleWriteResponseBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Unknown route or equipment", body = Error),
        (status = 409, description = "Concurrent write conflict", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["movements"],
    operation_id = "submitMovement"
)]
#[post("/movements")]
pub async fn submit_movement(
    state: web::Data<HttpState>,
    payload: web::Json<SubmitMovementRequestBody>,
) -> ApiResult<HttpResponse> {
    let request = parse_submission(payload.into_inner())?;
    let result = state.movements.submit(request).await?;
    let mut response = if result.created {
        HttpResponse::Created()
    } else {
        HttpResponse::Ok()
    };
    Ok(response.json(CycleWriteResponseBody::from(result)))
}

/// Every cycle, newest write first.
#[utoipa::path(
    get,
    path = "/api/v1/movements",
    responses(
        (status = 200, description = "Cycle summaries", body = [CycleSummaryBody]),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["movements"],
    operation_id = "listMovements"
)]
#[get("/movements")]
pub async fn list_movements(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<CycleSummaryBody>>> {
    Ok(summary_list(state.movements_query.list_movements().await?))
}

/// The most recently written cycle of a route.
#[utoipa::path(
    get,
    path = "/api/v1/movements/route/{route_id}",
    params(("route_id" = String, Path, description = "Route identifier")),
    responses(
        (status = 200, description = "Latest cycle summary", body = CycleSummaryBody),
        (status = 404, description = "No cycle recorded for the route", body = Error)
    ),
    tags = ["movements"],
    operation_id = "getMovementForRoute"
)]
#[get("/movements/route/{route_id}")]
pub async fn movement_for_route(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<CycleSummaryBody>> {
    let route_id = parse_route_id(&path.into_inner())?;
    let summary = state.movements_query.movement_for_route(route_id).await?;
    Ok(web::Json(CycleSummaryBody::from(summary)))
}

/// Cycles recorded by one piece of equipment, newest write first.
#[utoipa::path(
    get,
    path = "/api/v1/movements/equipment/{eqp_id}",
    params(("eqp_id" = String, Path, description = "Equipment identifier")),
    responses(
        (status = 200, description = "Cycle summaries", body = [CycleSummaryBody]),
        (status = 400, description = "Invalid identifier", body = Error)
    ),
    tags = ["movements"],
    operation_id = "listMovementsForEquipment"
)]
#[get("/movements/equipment/{eqp_id}")]
pub async fn movements_for_equipment(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<CycleSummaryBody>>> {
    let eqp_id = parse_equipment_id(&path.into_inner())?;
    Ok(summary_list(
        state.movements_query.movements_for_equipment(eqp_id).await?,
    ))
}

/// Cycles sharing a group number across every route and equipment pair.
#[utoipa::path(
    get,
    path = "/api/v1/movements/group/{group_no}",
    params(("group_no" = u32, Path, description = "Group number")),
    responses(
        (status = 200, description = "Cycle summaries", body = [CycleSummaryBody]),
        (status = 400, description = "Invalid group number", body = Error)
    ),
    tags = ["movements"],
    operation_id = "listMovementsForGroup"
)]
#[get("/movements/group/{group_no}")]
pub async fn movements_for_group(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<CycleSummaryBody>>> {
    let group_no = parse_number(&path.into_inner(), FieldName::new("group_no"))?;
    Ok(summary_list(
        state.movements_query.movements_for_group(group_no).await?,
    ))
}

/// One cycle including its unpacked samples.
#[utoipa::path(
    get,
    path = "/api/v1/movements/{route_id}/{eqp_id}/{group_no}/{cycle_number}",
    params(
        ("route_id" = String, Path, description = "Route identifier"),
        ("eqp_id" = String, Path, description = "Equipment identifier"),
        ("group_no" = u32, Path, description = "Group number"),
        ("cycle_number" = u32, Path, description = "Cycle number within the group")
    ),
    responses(
        (status = 200, description = "Cycle with samples", body = CycleDetailBody),
        (status = 400, description = "Invalid path", body = Error),
        (status = 404, description = "Unknown cycle", body = Error)
    ),
    tags = ["movements"],
    operation_id = "getCycle"
)]
#[get("/movements/{route_id}/{eqp_id}/{group_no}/{cycle_number}")]
pub async fn get_cycle(
    state: web::Data<HttpState>,
    path: web::Path<(String, String, String, String)>,
) -> ApiResult<web::Json<CycleDetailBody>> {
    let (route_id, eqp_id, group_no, cycle_number) = path.into_inner();
    let route_id = parse_route_id(&route_id)?;
    let eqp_id = parse_equipment_id(&eqp_id)?;
    let key = CycleKey::new(
        parse_number(&group_no, FieldName::new("group_no"))?,
        parse_number(&cycle_number, FieldName::new("cycle_number"))?,
    );
    let cycle = state
        .movements_query
        .get_cycle(route_id, eqp_id, key)
        .await?;
    Ok(web::Json(CycleDetailBody::from(cycle)))
}

#[cfg(test)]
#[path = "movements_tests.rs"]
mod tests;
