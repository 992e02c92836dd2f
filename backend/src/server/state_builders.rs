//! Builders wiring repositories into the domain services behind the HTTP
//! state.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::warn;

use equipment_movements::domain::movement::MovementSettings;
use equipment_movements::domain::ports::{
    EquipmentRepository, GroupLabelRepository, IdSequenceRepository, MovementMetrics,
    MovementRepository, RouteRepository,
};
use equipment_movements::domain::{
    EquipmentRegistryService, MovementQueryService, MovementService, MovementStores,
    RouteRegistryService,
};
use equipment_movements::inbound::http::state::HttpState;
use equipment_movements::outbound::memory::InMemoryStore;
use equipment_movements::outbound::persistence::{
    DieselEquipmentRepository, DieselGroupLabelRepository, DieselIdSequenceRepository,
    DieselMovementRepository, DieselRouteRepository,
};

use super::ServerConfig;

/// Repositories backing one running server.
struct Stores<M, R, E, L, S> {
    movements: Arc<M>,
    routes: Arc<R>,
    equipment: Arc<E>,
    labels: Arc<L>,
    sequence: Arc<S>,
}

fn wire<M, R, E, L, S>(
    stores: Stores<M, R, E, L, S>,
    settings: MovementSettings,
    metrics: Arc<dyn MovementMetrics>,
    clock: Arc<dyn Clock>,
) -> HttpState
where
    M: MovementRepository + 'static,
    R: RouteRepository + 'static,
    E: EquipmentRepository + 'static,
    L: GroupLabelRepository + 'static,
    S: IdSequenceRepository + 'static,
{
    let Stores {
        movements,
        routes,
        equipment,
        labels,
        sequence,
    } = stores;
    HttpState::new(
        Arc::new(EquipmentRegistryService::new(
            Arc::clone(&equipment),
            Arc::clone(&sequence),
            Arc::clone(&clock),
        )),
        Arc::new(RouteRegistryService::new(
            Arc::clone(&routes),
            Arc::clone(&equipment),
            sequence,
            Arc::clone(&clock),
        )),
        Arc::new(MovementService::new(
            MovementStores {
                movements: Arc::clone(&movements),
                routes,
                equipment,
                labels,
            },
            settings,
            metrics,
            clock,
        )),
        Arc::new(MovementQueryService::new(movements)),
    )
}

/// Build the HTTP state over PostgreSQL when a pool is configured, otherwise
/// over a fresh in-memory store.
pub(crate) fn build_http_state(config: &ServerConfig, metrics: Arc<dyn MovementMetrics>) -> HttpState {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    match &config.db_pool {
        Some(pool) => wire(
            Stores {
                movements: Arc::new(DieselMovementRepository::new(pool.clone())),
                routes: Arc::new(DieselRouteRepository::new(pool.clone())),
                equipment: Arc::new(DieselEquipmentRepository::new(pool.clone())),
                labels: Arc::new(DieselGroupLabelRepository::new(pool.clone())),
                sequence: Arc::new(DieselIdSequenceRepository::new(pool.clone())),
            },
            config.movement_settings,
            metrics,
            clock,
        ),
        None => {
            warn!("no database configured; movement data lives in memory only");
            let store = Arc::new(InMemoryStore::new());
            wire(
                Stores {
                    movements: Arc::clone(&store),
                    routes: Arc::clone(&store),
                    equipment: Arc::clone(&store),
                    labels: Arc::clone(&store),
                    sequence: store,
                },
                config.movement_settings,
                metrics,
                clock,
            )
        }
    }
}
