//! PostgreSQL-backed `GroupLabelRepository` implementation using Diesel ORM.
//!
//! `movement_group_labels` carries two unique constraints per route and
//! equipment pair, one on the label and one on the group number. Binding
//! inserts with `ON CONFLICT DO NOTHING`, so a lost race on either side shows
//! up as zero affected rows instead of an error. Moving a label is a
//! conditional update on the group it was last seen in; a unique violation on
//! the target group counts as a lost race as well.

use async_trait::async_trait;
use diesel::dsl::max;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::movement::GroupLabel;
use crate::domain::ports::{GroupLabelRepository, GroupLabelRepositoryError};
use crate::domain::{EquipmentId, RouteId};

use super::diesel_basic_error_mapping::{StoreFailure, classify_diesel_error, pool_error_message};
use super::diesel_helpers::{int_for_db, int_from_db};
use super::models::NewGroupLabelRow;
use super::pool::{DbPool, PoolError};
use super::schema::movement_group_labels;

/// Diesel-backed implementation of the `GroupLabelRepository` port.
#[derive(Clone)]
pub struct DieselGroupLabelRepository {
    pool: DbPool,
}

impl DieselGroupLabelRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> GroupLabelRepositoryError {
    GroupLabelRepositoryError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> GroupLabelRepositoryError {
    match classify_diesel_error(error) {
        StoreFailure::Connection(message) => GroupLabelRepositoryError::connection(message),
        StoreFailure::UniqueViolation(message)
        | StoreFailure::ForeignKeyViolation { message, .. }
        | StoreFailure::Query(message) => GroupLabelRepositoryError::query(message),
    }
}

fn group_from_db(value: Option<i32>) -> Result<Option<u32>, GroupLabelRepositoryError> {
    value
        .map(|group_no| int_from_db(group_no, "group_no"))
        .transpose()
        .map_err(GroupLabelRepositoryError::query)
}

#[async_trait]
impl GroupLabelRepository for DieselGroupLabelRepository {
    async fn find_group(
        &self,
        route_id: &RouteId,
        eqp_id: &EquipmentId,
        label: &GroupLabel,
    ) -> Result<Option<u32>, GroupLabelRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let bound: Option<i32> = movement_group_labels::table
            .filter(movement_group_labels::route_id.eq(route_id.as_str()))
            .filter(movement_group_labels::eqp_id.eq(eqp_id.as_str()))
            .filter(movement_group_labels::group_label.eq(label.as_str()))
            .select(movement_group_labels::group_no)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        group_from_db(bound)
    }

    async fn max_group_no(
        &self,
        route_id: &RouteId,
        eqp_id: &EquipmentId,
    ) -> Result<Option<u32>, GroupLabelRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let highest: Option<i32> = movement_group_labels::table
            .filter(movement_group_labels::route_id.eq(route_id.as_str()))
            .filter(movement_group_labels::eqp_id.eq(eqp_id.as_str()))
            .select(max(movement_group_labels::group_no))
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        group_from_db(highest)
    }

    async fn try_bind(
        &self,
        route_id: &RouteId,
        eqp_id: &EquipmentId,
        label: &GroupLabel,
        group_no: u32,
    ) -> Result<bool, GroupLabelRepositoryError> {
        let row = NewGroupLabelRow {
            route_id: route_id.as_str(),
            eqp_id: eqp_id.as_str(),
            group_label: label.as_str(),
            group_no: int_for_db(group_no, "group_no").map_err(GroupLabelRepositoryError::query)?,
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let inserted = diesel::insert_into(movement_group_labels::table)
            .values(&row)
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(inserted == 1)
    }

    async fn rebind(
        &self,
        route_id: &RouteId,
        eqp_id: &EquipmentId,
        label: &GroupLabel,
        from_group: u32,
        to_group: u32,
    ) -> Result<bool, GroupLabelRepositoryError> {
        let from_group =
            int_for_db(from_group, "group_no").map_err(GroupLabelRepositoryError::query)?;
        let to_group = int_for_db(to_group, "group_no").map_err(GroupLabelRepositoryError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let outcome = diesel::update(
            movement_group_labels::table
                .filter(movement_group_labels::route_id.eq(route_id.as_str()))
                .filter(movement_group_labels::eqp_id.eq(eqp_id.as_str()))
                .filter(movement_group_labels::group_label.eq(label.as_str()))
                .filter(movement_group_labels::group_no.eq(from_group)),
        )
        .set(movement_group_labels::group_no.eq(to_group))
        .execute(&mut conn)
        .await;

        match outcome {
            Ok(updated) => Ok(updated == 1),
            Err(error) => match classify_diesel_error(error) {
                StoreFailure::UniqueViolation(_) => Ok(false),
                StoreFailure::Connection(message) => {
                    Err(GroupLabelRepositoryError::connection(message))
                }
                StoreFailure::ForeignKeyViolation { message, .. } | StoreFailure::Query(message) => {
                    Err(GroupLabelRepositoryError::query(message))
                }
            },
        }
    }
}
