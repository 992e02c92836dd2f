//! Equipment registry HTTP handlers.
//!
//! ```text
//! POST /api/v1/equipment
//! GET /api/v1/equipment
//! GET /api/v1/equipment/{eqp_id}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Equipment, Error, NewEquipment};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{equipment_validation_error, parse_equipment_id};

/// Request payload for registering equipment.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateEquipmentRequestBody {
    /// Operator contact number, at most 20 characters.
    #[schema(example = "9876543210")]
    pub mobile: String,
    #[schema(example = "roller")]
    pub eqp_type: String,
}

/// Registered equipment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EquipmentResponseBody {
    #[schema(example = "EQP-00001")]
    pub eqp_id: String,
    pub mobile: String,
    pub eqp_type: String,
    #[schema(format = "date-time")]
    pub inserted_on: String,
}

impl From<Equipment> for EquipmentResponseBody {
    fn from(value: Equipment) -> Self {
        Self {
            eqp_id: value.eqp_id().to_string(),
            mobile: value.mobile().to_owned(),
            eqp_type: value.eqp_type().to_owned(),
            inserted_on: value.inserted_on().to_rfc3339(),
        }
    }
}

fn parse_new_equipment(payload: CreateEquipmentRequestBody) -> Result<NewEquipment, Error> {
    NewEquipment::new(payload.mobile, payload.eqp_type)
        .map_err(|err| equipment_validation_error(&err))
}

/// Register a piece of equipment under a generated `EQP-NNNNN` identifier.
#[utoipa::path(
    post,
    path = "/api/v1/equipment",
    request_body = CreateEquipmentRequestBody,
    responses(
        (status = 201, description = "Equipment registered", body = EquipmentResponseBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Identifier space exhausted", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["equipment"],
    operation_id = "createEquipment"
)]
#[post("/equipment")]
pub async fn create_equipment(
    state: web::Data<HttpState>,
    payload: web::Json<CreateEquipmentRequestBody>,
) -> ApiResult<HttpResponse> {
    let draft = parse_new_equipment(payload.into_inner())?;
    let equipment = state.equipment.create_equipment(draft).await?;
    Ok(HttpResponse::Created().json(EquipmentResponseBody::from(equipment)))
}

/// List registered equipment, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/equipment",
    responses(
        (status = 200, description = "Registered equipment", body = [EquipmentResponseBody]),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["equipment"],
    operation_id = "listEquipment"
)]
#[get("/equipment")]
pub async fn list_equipment(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<EquipmentResponseBody>>> {
    let equipment = state.equipment.list_equipment().await?;
    Ok(web::Json(
        equipment
            .into_iter()
            .map(EquipmentResponseBody::from)
            .collect(),
    ))
}

/// Fetch one piece of equipment.
#[utoipa::path(
    get,
    path = "/api/v1/equipment/{eqp_id}",
    params(("eqp_id" = String, Path, description = "Equipment identifier")),
    responses(
        (status = 200, description = "Equipment", body = EquipmentResponseBody),
        (status = 400, description = "Invalid identifier", body = Error),
        (status = 404, description = "Unknown equipment", body = Error)
    ),
    tags = ["equipment"],
    operation_id = "getEquipment"
)]
#[get("/equipment/{eqp_id}")]
pub async fn get_equipment(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<EquipmentResponseBody>> {
    let eqp_id = parse_equipment_id(&path.into_inner())?;
    let equipment = state.equipment.get_equipment(eqp_id).await?;
    Ok(web::Json(EquipmentResponseBody::from(equipment)))
}

#[cfg(test)]
#[path = "equipment_tests.rs"]
mod tests;
