//! Route registry HTTP handlers.
//!
//! ```text
//! POST /api/v1/routes
//! GET /api/v1/routes
//! GET /api/v1/routes/{route_id}
//! GET /api/v1/equipment/{eqp_id}/routes
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, NewRoute, Route, RouteDraft};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    parse_equipment_id, parse_route_id, route_validation_error,
};

/// Request payload for locking a route.
///
/// GPS endpoints are `"lat,lng"` strings; blank values count as absent.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateRouteRequestBody {
    #[schema(example = "EQP-00001")]
    pub eqp_id: String,
    pub route_name: Option<String>,
    #[schema(example = "28.7041,77.1025")]
    pub start_gps: Option<String>,
    #[schema(example = "28.5355,77.3910")]
    pub end_gps: Option<String>,
    pub start_km: Option<f64>,
    pub end_km: Option<f64>,
    pub start_chainage: Option<f64>,
    pub end_chainage: Option<f64>,
}

impl From<CreateRouteRequestBody> for RouteDraft {
    fn from(value: CreateRouteRequestBody) -> Self {
        Self {
            eqp_id: value.eqp_id,
            route_name: value.route_name,
            start_gps: value.start_gps,
            end_gps: value.end_gps,
            start_km: value.start_km,
            end_km: value.end_km,
            start_chainage: value.start_chainage,
            end_chainage: value.end_chainage,
        }
    }
}

/// A locked route.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RouteResponseBody {
    #[schema(example = "ROT-00001")]
    pub route_id: String,
    #[schema(example = "EQP-00001")]
    pub eqp_id: String,
    pub route_name: Option<String>,
    pub start_gps: Option<String>,
    pub end_gps: Option<String>,
    pub start_km: Option<f64>,
    pub end_km: Option<f64>,
    pub start_chainage: Option<f64>,
    pub end_chainage: Option<f64>,
    #[schema(format = "date-time")]
    pub inserted_on: String,
}

impl From<Route> for RouteResponseBody {
    fn from(value: Route) -> Self {
        let endpoints = value.endpoints();
        let markers = value.markers();
        Self {
            route_id: value.route_id().to_string(),
            eqp_id: value.eqp_id().to_string(),
            route_name: value.route_name().map(str::to_owned),
            start_gps: endpoints.start.map(|point| point.to_string()),
            end_gps: endpoints.end.map(|point| point.to_string()),
            start_km: markers.start_km,
            end_km: markers.end_km,
            start_chainage: markers.start_chainage,
            end_chainage: markers.end_chainage,
            inserted_on: value.inserted_on().to_rfc3339(),
        }
    }
}

fn route_list(routes: Vec<Route>) -> web::Json<Vec<RouteResponseBody>> {
    web::Json(routes.into_iter().map(RouteResponseBody::from).collect())
}

/// Lock a route for a piece of equipment under a generated `ROT-NNNNN`
/// identifier.
#[utoipa::path(
    post,
    path = "/api/v1/routes",
    request_body = CreateRouteRequestBody,
    responses(
        (status = 201, description = "Route locked", body = RouteResponseBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Unknown equipment", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["routes"],
    operation_id = "createRoute"
)]
#[post("/routes")]
pub async fn create_route(
    state: web::Data<HttpState>,
    payload: web::Json<CreateRouteRequestBody>,
) -> ApiResult<HttpResponse> {
    let draft = RouteDraft::from(payload.into_inner());
    let route = NewRoute::try_from(draft).map_err(|err| route_validation_error(&err))?;
    let route = state.routes.create_route(route).await?;
    Ok(HttpResponse::Created().json(RouteResponseBody::from(route)))
}

/// List every route, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/routes",
    responses(
        (status = 200, description = "Routes", body = [RouteResponseBody]),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["routes"],
    operation_id = "listRoutes"
)]
#[get("/routes")]
pub async fn list_routes(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<RouteResponseBody>>> {
    Ok(route_list(state.routes.list_routes().await?))
}

/// Fetch one route.
#[utoipa::path(
    get,
    path = "/api/v1/routes/{route_id}",
    params(("route_id" = String, Path, description = "Route identifier")),
    responses(
        (status = 200, description = "Route", body = RouteResponseBody),
        (status = 404, description = "Unknown route", body = Error)
    ),
    tags = ["routes"],
    operation_id = "getRoute"
)]
#[get("/routes/{route_id}")]
pub async fn get_route(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<RouteResponseBody>> {
    let route_id = parse_route_id(&path.into_inner())?;
    let route = state.routes.get_route(route_id).await?;
    Ok(web::Json(RouteResponseBody::from(route)))
}

/// Routes locked by one piece of equipment, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/equipment/{eqp_id}/routes",
    params(("eqp_id" = String, Path, description = "Equipment identifier")),
    responses(
        (status = 200, description = "Routes of the equipment", body = [RouteResponseBody]),
        (status = 400, description = "Invalid identifier", body = Error)
    ),
    tags = ["routes"],
    operation_id = "listRoutesForEquipment"
)]
#[get("/equipment/{eqp_id}/routes")]
pub async fn list_routes_for_equipment(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<RouteResponseBody>>> {
    let eqp_id = parse_equipment_id(&path.into_inner())?;
    Ok(route_list(
        state.routes.list_routes_for_equipment(eqp_id).await?,
    ))
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
