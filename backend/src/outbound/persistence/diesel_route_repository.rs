//! PostgreSQL-backed `RouteRepository` implementation using Diesel ORM.
//!
//! Routes reference their owning equipment through a foreign key; a
//! violation of that key is reported as
//! [`RouteRepositoryError::MissingEquipment`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{RouteRepository, RouteRepositoryError};
use crate::domain::{EquipmentId, Route, RouteId};

use super::diesel_basic_error_mapping::{StoreFailure, classify_diesel_error, pool_error_message};
use super::diesel_helpers::collect_rows;
use super::models::{NewRouteRow, RouteRow};
use super::pool::{DbPool, PoolError};
use super::schema::equipment_routes;

/// Diesel-backed implementation of the `RouteRepository` port.
#[derive(Clone)]
pub struct DieselRouteRepository {
    pool: DbPool,
}

impl DieselRouteRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn load_routes(
        &self,
        eqp_id: Option<&EquipmentId>,
    ) -> Result<Vec<Route>, RouteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = equipment_routes::table
            .select(RouteRow::as_select())
            .order_by((
                equipment_routes::inserted_on.desc(),
                equipment_routes::route_id.desc(),
            ))
            .into_boxed();
        if let Some(owner) = eqp_id {
            query = query.filter(equipment_routes::eqp_id.eq(owner.as_str()));
        }
        let rows: Vec<RouteRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;

        collect_rows(
            rows.into_iter().map(RouteRow::into_domain),
            RouteRepositoryError::query,
        )
    }
}

fn map_pool_error(error: PoolError) -> RouteRepositoryError {
    RouteRepositoryError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> RouteRepositoryError {
    match classify_diesel_error(error) {
        StoreFailure::Connection(message) => RouteRepositoryError::connection(message),
        StoreFailure::UniqueViolation(message) => RouteRepositoryError::duplicate_key(message),
        failure @ StoreFailure::ForeignKeyViolation { .. } => {
            warn!(?failure, "route insert hit an unexpected foreign key");
            RouteRepositoryError::query("foreign key violation")
        }
        StoreFailure::Query(message) => RouteRepositoryError::query(message),
    }
}

#[async_trait]
impl RouteRepository for DieselRouteRepository {
    async fn insert(&self, route: &Route) -> Result<(), RouteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(equipment_routes::table)
            .values(NewRouteRow::from(route))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|error| match classify_diesel_error(error) {
                failure @ StoreFailure::ForeignKeyViolation { .. }
                    if failure.references("equipment") =>
                {
                    RouteRepositoryError::missing_equipment(route.eqp_id().as_str())
                }
                StoreFailure::Connection(message) => RouteRepositoryError::connection(message),
                StoreFailure::UniqueViolation(message) => {
                    RouteRepositoryError::duplicate_key(message)
                }
                StoreFailure::ForeignKeyViolation { message, .. }
                | StoreFailure::Query(message) => RouteRepositoryError::query(message),
            })
    }

    async fn find_by_id(&self, route_id: &RouteId) -> Result<Option<Route>, RouteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<RouteRow> = equipment_routes::table
            .filter(equipment_routes::route_id.eq(route_id.as_str()))
            .select(RouteRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(RouteRow::into_domain)
            .transpose()
            .map_err(RouteRepositoryError::query)
    }

    async fn list(&self) -> Result<Vec<Route>, RouteRepositoryError> {
        self.load_routes(None).await
    }

    async fn list_for_equipment(
        &self,
        eqp_id: &EquipmentId,
    ) -> Result<Vec<Route>, RouteRepositoryError> {
        self.load_routes(Some(eqp_id)).await
    }
}
