//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint of the inbound layer together
//! with the request, response and error schemas. The generated document is
//! served by Swagger UI in debug builds.

use utoipa::OpenApi;

use crate::domain::movement::CycleStatus;
use crate::domain::{Error, ErrorCode};
use crate::inbound::http::equipment::{CreateEquipmentRequestBody, EquipmentResponseBody};
use crate::inbound::http::health::ProbeBody;
use crate::inbound::http::movements::{
    CycleDetailBody, CycleSummaryBody, CycleWriteResponseBody, SubmitMovementRequestBody,
};
use crate::inbound::http::routes::{CreateRouteRequestBody, RouteResponseBody};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Equipment movements API",
        description = "Equipment and route registries plus movement cycle capture."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::equipment::create_equipment,
        crate::inbound::http::equipment::list_equipment,
        crate::inbound::http::equipment::get_equipment,
        crate::inbound::http::routes::create_route,
        crate::inbound::http::routes::list_routes,
        crate::inbound::http::routes::get_route,
        crate::inbound::http::routes::list_routes_for_equipment,
        crate::inbound::http::movements::submit_movement,
        crate::inbound::http::movements::list_movements,
        crate::inbound::http::movements::movement_for_route,
        crate::inbound::http::movements::movements_for_equipment,
        crate::inbound::http::movements::movements_for_group,
        crate::inbound::http::movements::get_cycle,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        CycleStatus,
        ProbeBody,
        CreateEquipmentRequestBody,
        EquipmentResponseBody,
        CreateRouteRequestBody,
        RouteResponseBody,
        SubmitMovementRequestBody,
        CycleWriteResponseBody,
        CycleSummaryBody,
        CycleDetailBody,
    )),
    tags(
        (name = "equipment", description = "Equipment registry"),
        (name = "routes", description = "Route registry"),
        (name = "movements", description = "Movement cycle capture and queries"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
