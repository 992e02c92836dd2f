//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};

use crate::domain::ports::{
    MockEquipmentRegistry, MockMovementCommand, MockMovementQuery, MockRouteRegistry,
};
use crate::inbound::http::configure_api;
use crate::inbound::http::state::HttpState;

/// Mocked driving ports; set expectations, then build the app.
#[derive(Default)]
pub struct MockPorts {
    pub equipment: MockEquipmentRegistry,
    pub routes: MockRouteRegistry,
    pub movements: MockMovementCommand,
    pub movements_query: MockMovementQuery,
}

impl MockPorts {
    pub fn into_state(self) -> HttpState {
        HttpState::new(
            Arc::new(self.equipment),
            Arc::new(self.routes),
            Arc::new(self.movements),
            Arc::new(self.movements_query),
        )
    }

    /// The `/api/v1` surface over these mocks.
    pub fn into_app(
        self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(self.into_state()))
            .service(web::scope("/api/v1").configure(configure_api))
    }
}
