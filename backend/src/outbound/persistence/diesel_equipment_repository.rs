//! PostgreSQL-backed `EquipmentRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{EquipmentRepository, EquipmentRepositoryError};
use crate::domain::{Equipment, EquipmentId};

use super::diesel_basic_error_mapping::{StoreFailure, classify_diesel_error, pool_error_message};
use super::diesel_helpers::collect_rows;
use super::models::{EquipmentRow, NewEquipmentRow};
use super::pool::{DbPool, PoolError};
use super::schema::equipment;

/// Diesel-backed implementation of the `EquipmentRepository` port.
#[derive(Clone)]
pub struct DieselEquipmentRepository {
    pool: DbPool,
}

impl DieselEquipmentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> EquipmentRepositoryError {
    EquipmentRepositoryError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> EquipmentRepositoryError {
    match classify_diesel_error(error) {
        StoreFailure::Connection(message) => EquipmentRepositoryError::connection(message),
        StoreFailure::UniqueViolation(message) => EquipmentRepositoryError::duplicate_key(message),
        StoreFailure::ForeignKeyViolation { message, .. } | StoreFailure::Query(message) => {
            EquipmentRepositoryError::query(message)
        }
    }
}

#[async_trait]
impl EquipmentRepository for DieselEquipmentRepository {
    async fn insert(&self, value: &Equipment) -> Result<(), EquipmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(equipment::table)
            .values(NewEquipmentRow::from(value))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(
        &self,
        eqp_id: &EquipmentId,
    ) -> Result<Option<Equipment>, EquipmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<EquipmentRow> = equipment::table
            .filter(equipment::eqp_id.eq(eqp_id.as_str()))
            .select(EquipmentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(EquipmentRow::into_domain)
            .transpose()
            .map_err(EquipmentRepositoryError::query)
    }

    async fn list(&self) -> Result<Vec<Equipment>, EquipmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<EquipmentRow> = equipment::table
            .select(EquipmentRow::as_select())
            .order_by((equipment::inserted_on.desc(), equipment::eqp_id.desc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        collect_rows(
            rows.into_iter().map(EquipmentRow::into_domain),
            EquipmentRepositoryError::query,
        )
    }
}
