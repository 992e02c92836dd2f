//! Server construction and middleware wiring.

mod config;
#[cfg(feature = "metrics")]
mod metrics;
mod state_builders;

pub use config::{AppSettings, ServerConfig, SettingsError};

#[cfg(not(feature = "metrics"))]
use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use equipment_movements::ApiDoc;
use equipment_movements::Trace;
#[cfg(not(feature = "metrics"))]
use equipment_movements::domain::ports::NoOpMovementMetrics;
use equipment_movements::inbound::http::configure_api;
use equipment_movements::inbound::http::health::{HealthState, live, ready};
use equipment_movements::inbound::http::state::HttpState;
use state_builders::build_http_state;

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(web::scope("/api/v1").configure(configure_api))
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct the Actix HTTP server and mark the service ready once bound.
///
/// With the `metrics` feature, request metrics and the movement counters are
/// exported on `/metrics`.
///
/// # Errors
/// Propagates [`std::io::Error`] when metric registration or binding the
/// socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    #[cfg(feature = "metrics")]
    let prometheus = metrics::build_prometheus()?;
    #[cfg(feature = "metrics")]
    let movement_metrics = metrics::movement_metrics(&prometheus)?;
    #[cfg(not(feature = "metrics"))]
    let movement_metrics = Arc::new(NoOpMovementMetrics);

    let http_state = web::Data::new(build_http_state(&config, movement_metrics));
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        let app = build_app(server_health_state.clone(), http_state.clone());
        #[cfg(feature = "metrics")]
        let app = app.wrap(prometheus.clone());
        app
    })
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests;
