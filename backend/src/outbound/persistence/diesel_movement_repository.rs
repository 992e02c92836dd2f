//! PostgreSQL-backed `MovementRepository` implementation using Diesel ORM.
//!
//! Cycles are keyed by `(route_id, eqp_id, group_no, cycle_number)`. Inserts
//! rely on that primary key to reject a concurrent duplicate, and updates
//! filter on the stored `revision` so a lost race affects zero rows.

use async_trait::async_trait;
use diesel::dsl::max;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::movement::{CycleKey, CycleSummary, MovementCycle};
use crate::domain::ports::{MovementRepository, MovementRepositoryError};
use crate::domain::{EquipmentId, RouteId};

use super::diesel_basic_error_mapping::{StoreFailure, classify_diesel_error, pool_error_message};
use super::diesel_helpers::{
    UpdateResult, cast_revision, cast_revision_for_db, collect_rows, execute_optimistic_update,
    int_for_db, int_from_db,
};
use super::models::{CycleSummaryRow, MovementCycleRow, MovementCycleUpdate, NewMovementCycleRow};
use super::pool::{DbPool, PoolError};
use super::schema::movement_cycles;

/// Diesel-backed implementation of the `MovementRepository` port.
#[derive(Clone)]
pub struct DieselMovementRepository {
    pool: DbPool,
}

impl DieselMovementRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> MovementRepositoryError {
    MovementRepositoryError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> MovementRepositoryError {
    match classify_diesel_error(error) {
        StoreFailure::Connection(message) => MovementRepositoryError::connection(message),
        StoreFailure::UniqueViolation(message) => MovementRepositoryError::duplicate_key(message),
        failure @ StoreFailure::ForeignKeyViolation { .. } => {
            let target = if failure.references("equipment_routes") {
                "route"
            } else {
                "equipment"
            };
            MovementRepositoryError::missing_reference(target)
        }
        StoreFailure::Query(message) => MovementRepositoryError::query(message),
    }
}

fn key_for_db(key: CycleKey) -> Result<(i32, i32), MovementRepositoryError> {
    Ok((
        int_for_db(key.group_no, "group_no").map_err(MovementRepositoryError::query)?,
        int_for_db(key.cycle_number, "cycle_number").map_err(MovementRepositoryError::query)?,
    ))
}

fn slots_for_db(cycle: &MovementCycle) -> Result<serde_json::Value, MovementRepositoryError> {
    serde_json::to_value(cycle.slots())
        .map_err(|err| MovementRepositoryError::query(format!("encode sample_slots: {err}")))
}

fn counters_for_db(cycle: &MovementCycle) -> Result<(i32, i32), MovementRepositoryError> {
    Ok((
        int_for_db(cycle.active_slot_index(), "active_slot_index")
            .map_err(MovementRepositoryError::query)?,
        int_for_db(cycle.total_sample_count(), "total_sample_count")
            .map_err(MovementRepositoryError::query)?,
    ))
}

fn cycle_from_row(row: MovementCycleRow) -> Result<MovementCycle, MovementRepositoryError> {
    row.into_domain().map_err(MovementRepositoryError::query)
}

fn summaries_from_rows(
    rows: Vec<CycleSummaryRow>,
) -> Result<Vec<CycleSummary>, MovementRepositoryError> {
    collect_rows(
        rows.into_iter().map(CycleSummaryRow::into_domain),
        MovementRepositoryError::query,
    )
}

/// Newest write first; ties fall back to the composite key, descending.
macro_rules! newest_first {
    () => {
        (
            movement_cycles::inserted_on.desc(),
            movement_cycles::route_id.desc(),
            movement_cycles::eqp_id.desc(),
            movement_cycles::group_no.desc(),
            movement_cycles::cycle_number.desc(),
        )
    };
}

#[async_trait]
impl MovementRepository for DieselMovementRepository {
    async fn find_cycle(
        &self,
        route_id: &RouteId,
        eqp_id: &EquipmentId,
        key: CycleKey,
    ) -> Result<Option<MovementCycle>, MovementRepositoryError> {
        let (group_no, cycle_number) = key_for_db(key)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<MovementCycleRow> = movement_cycles::table
            .filter(movement_cycles::route_id.eq(route_id.as_str()))
            .filter(movement_cycles::eqp_id.eq(eqp_id.as_str()))
            .filter(movement_cycles::group_no.eq(group_no))
            .filter(movement_cycles::cycle_number.eq(cycle_number))
            .select(MovementCycleRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(cycle_from_row).transpose()
    }

    async fn find_latest(
        &self,
        route_id: &RouteId,
        eqp_id: &EquipmentId,
    ) -> Result<Option<MovementCycle>, MovementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<MovementCycleRow> = movement_cycles::table
            .filter(movement_cycles::route_id.eq(route_id.as_str()))
            .filter(movement_cycles::eqp_id.eq(eqp_id.as_str()))
            .order_by((
                movement_cycles::group_no.desc(),
                movement_cycles::cycle_number.desc(),
            ))
            .select(MovementCycleRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(cycle_from_row).transpose()
    }

    async fn find_latest_in_group(
        &self,
        route_id: &RouteId,
        eqp_id: &EquipmentId,
        group_no: u32,
    ) -> Result<Option<MovementCycle>, MovementRepositoryError> {
        let group_no = int_for_db(group_no, "group_no").map_err(MovementRepositoryError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<MovementCycleRow> = movement_cycles::table
            .filter(movement_cycles::route_id.eq(route_id.as_str()))
            .filter(movement_cycles::eqp_id.eq(eqp_id.as_str()))
            .filter(movement_cycles::group_no.eq(group_no))
            .order_by(movement_cycles::cycle_number.desc())
            .select(MovementCycleRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(cycle_from_row).transpose()
    }

    async fn max_group_no(
        &self,
        route_id: &RouteId,
        eqp_id: &EquipmentId,
    ) -> Result<Option<u32>, MovementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let highest: Option<i32> = movement_cycles::table
            .filter(movement_cycles::route_id.eq(route_id.as_str()))
            .filter(movement_cycles::eqp_id.eq(eqp_id.as_str()))
            .select(max(movement_cycles::group_no))
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        highest
            .map(|value| int_from_db(value, "group_no"))
            .transpose()
            .map_err(MovementRepositoryError::query)
    }

    async fn insert(&self, cycle: &MovementCycle) -> Result<(), MovementRepositoryError> {
        let (group_no, cycle_number) = key_for_db(cycle.key())?;
        let (active_slot_index, total_sample_count) = counters_for_db(cycle)?;
        let endpoints = cycle.endpoints();
        let row = NewMovementCycleRow {
            route_id: cycle.route_id().as_str(),
            eqp_id: cycle.eqp_id().as_str(),
            group_no,
            cycle_number,
            group_label: cycle.group_label().map(|label| label.as_str()),
            sample_slots: slots_for_db(cycle)?,
            active_slot_index,
            total_sample_count,
            status: cycle.status().as_str(),
            start_time: cycle.start_time(),
            end_time: cycle.end_time(),
            start_gps: endpoints.start.map(|point| point.to_string()),
            end_gps: endpoints.end.map(|point| point.to_string()),
            revision: cast_revision_for_db(cycle.revision()),
            inserted_on: cycle.inserted_on(),
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(movement_cycles::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(
        &self,
        cycle: &MovementCycle,
        expected_revision: u32,
    ) -> Result<(), MovementRepositoryError> {
        let (group_no, cycle_number) = key_for_db(cycle.key())?;
        let (active_slot_index, total_sample_count) = counters_for_db(cycle)?;
        let changeset = MovementCycleUpdate {
            group_label: cycle.group_label().map(|label| label.as_str()),
            sample_slots: slots_for_db(cycle)?,
            active_slot_index,
            total_sample_count,
            status: cycle.status().as_str(),
            end_time: cycle.end_time(),
            revision: cast_revision_for_db(cycle.revision()),
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let target = movement_cycles::table
            .filter(movement_cycles::route_id.eq(cycle.route_id().as_str()))
            .filter(movement_cycles::eqp_id.eq(cycle.eqp_id().as_str()))
            .filter(movement_cycles::group_no.eq(group_no))
            .filter(movement_cycles::cycle_number.eq(cycle_number));

        let updated_rows = diesel::update(
            target
                .clone()
                .filter(movement_cycles::revision.eq(cast_revision_for_db(expected_revision))),
        )
        .set(&changeset)
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        match execute_optimistic_update(updated_rows) {
            UpdateResult::Success => Ok(()),
            UpdateResult::ZeroRows => {
                let current: Option<i32> = target
                    .select(movement_cycles::revision)
                    .first(&mut conn)
                    .await
                    .optional()
                    .map_err(map_diesel_error)?;
                Err(match current {
                    Some(actual) => MovementRepositoryError::revision_mismatch(
                        expected_revision,
                        cast_revision(actual),
                    ),
                    None => MovementRepositoryError::query(format!(
                        "cycle {} no longer exists",
                        cycle.key()
                    )),
                })
            }
        }
    }

    async fn list_summaries(&self) -> Result<Vec<CycleSummary>, MovementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<CycleSummaryRow> = movement_cycles::table
            .select(CycleSummaryRow::as_select())
            .order_by(newest_first!())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        summaries_from_rows(rows)
    }

    async fn latest_summary_for_route(
        &self,
        route_id: &RouteId,
    ) -> Result<Option<CycleSummary>, MovementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<CycleSummaryRow> = movement_cycles::table
            .filter(movement_cycles::route_id.eq(route_id.as_str()))
            .select(CycleSummaryRow::as_select())
            .order_by(newest_first!())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(CycleSummaryRow::into_domain)
            .transpose()
            .map_err(MovementRepositoryError::query)
    }

    async fn list_summaries_for_equipment(
        &self,
        eqp_id: &EquipmentId,
    ) -> Result<Vec<CycleSummary>, MovementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<CycleSummaryRow> = movement_cycles::table
            .filter(movement_cycles::eqp_id.eq(eqp_id.as_str()))
            .select(CycleSummaryRow::as_select())
            .order_by(newest_first!())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        summaries_from_rows(rows)
    }

    async fn list_summaries_for_group(
        &self,
        group_no: u32,
    ) -> Result<Vec<CycleSummary>, MovementRepositoryError> {
        let group_no = int_for_db(group_no, "group_no").map_err(MovementRepositoryError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<CycleSummaryRow> = movement_cycles::table
            .filter(movement_cycles::group_no.eq(group_no))
            .select(CycleSummaryRow::as_select())
            .order_by(newest_first!())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        summaries_from_rows(rows)
    }
}
