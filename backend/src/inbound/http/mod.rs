//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;

pub mod equipment;
pub mod error;
pub mod health;
pub mod movements;
pub mod routes;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::{ApiResult, json_error_handler};

/// Register every `/api/v1` handler on a scope.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use equipment_movements::inbound::http::configure_api;
///
/// let _app = App::new().service(web::scope("/api/v1").configure(configure_api));
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .service(equipment::create_equipment)
        .service(equipment::list_equipment)
        .service(equipment::get_equipment)
        .service(routes::list_routes_for_equipment)
        .service(routes::create_route)
        .service(routes::list_routes)
        .service(routes::get_route)
        .service(movements::submit_movement)
        .service(movements::list_movements)
        .service(movements::movement_for_route)
        .service(movements::movements_for_equipment)
        .service(movements::movements_for_group)
        .service(movements::get_cycle);
}
