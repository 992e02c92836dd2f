//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions back into domain values
//! re-run domain validation, so a corrupted row surfaces as a query error
//! rather than an invalid entity.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::movement::{
    CycleKey, CycleStatus, CycleSummary, GpsPoint, GroupLabel, MovementCycle, MovementCycleDraft,
    RouteEndpoints, SampleSlots,
};
use crate::domain::{
    Equipment, EquipmentId, NewEquipment, NewRoute, Route, RouteDraft, RouteId,
};

use super::diesel_helpers::{cast_revision, int_from_db};
use super::schema::{equipment, equipment_routes, id_sequences, movement_cycles, movement_group_labels};

// ---------------------------------------------------------------------------
// Equipment models
// ---------------------------------------------------------------------------

/// Row struct for reading from the equipment table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = equipment)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EquipmentRow {
    pub eqp_id: String,
    pub mobile: String,
    pub eqp_type: String,
    pub inserted_on: DateTime<Utc>,
}

impl EquipmentRow {
    pub(crate) fn into_domain(self) -> Result<Equipment, String> {
        let eqp_id = EquipmentId::new(&self.eqp_id).map_err(|err| err.to_string())?;
        let fields = NewEquipment::new(&self.mobile, &self.eqp_type)
            .map_err(|err| format!("equipment {eqp_id}: {err}"))?;
        Ok(fields.into_equipment(eqp_id, self.inserted_on))
    }
}

/// Insertable struct for creating equipment records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = equipment)]
pub(crate) struct NewEquipmentRow<'a> {
    pub eqp_id: &'a str,
    pub mobile: &'a str,
    pub eqp_type: &'a str,
    pub inserted_on: DateTime<Utc>,
}

impl<'a> From<&'a Equipment> for NewEquipmentRow<'a> {
    fn from(value: &'a Equipment) -> Self {
        Self {
            eqp_id: value.eqp_id().as_str(),
            mobile: value.mobile(),
            eqp_type: value.eqp_type(),
            inserted_on: value.inserted_on(),
        }
    }
}

// ---------------------------------------------------------------------------
// Route models
// ---------------------------------------------------------------------------

/// Row struct for reading from the equipment_routes table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = equipment_routes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RouteRow {
    pub route_id: String,
    pub eqp_id: String,
    pub route_name: Option<String>,
    pub start_gps: Option<String>,
    pub end_gps: Option<String>,
    pub start_km: Option<f64>,
    pub end_km: Option<f64>,
    pub start_chainage: Option<f64>,
    pub end_chainage: Option<f64>,
    pub inserted_on: DateTime<Utc>,
}

impl RouteRow {
    pub(crate) fn into_domain(self) -> Result<Route, String> {
        let route_id = RouteId::new(&self.route_id).map_err(|err| err.to_string())?;
        let fields = NewRoute::try_from(RouteDraft {
            eqp_id: self.eqp_id,
            route_name: self.route_name,
            start_gps: self.start_gps,
            end_gps: self.end_gps,
            start_km: self.start_km,
            end_km: self.end_km,
            start_chainage: self.start_chainage,
            end_chainage: self.end_chainage,
        })
        .map_err(|err| format!("route {route_id}: {err}"))?;
        Ok(fields.into_route(route_id, self.inserted_on))
    }
}

/// Insertable struct for creating route records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = equipment_routes)]
pub(crate) struct NewRouteRow<'a> {
    pub route_id: &'a str,
    pub eqp_id: &'a str,
    pub route_name: Option<&'a str>,
    pub start_gps: Option<String>,
    pub end_gps: Option<String>,
    pub start_km: Option<f64>,
    pub end_km: Option<f64>,
    pub start_chainage: Option<f64>,
    pub end_chainage: Option<f64>,
    pub inserted_on: DateTime<Utc>,
}

impl<'a> From<&'a Route> for NewRouteRow<'a> {
    fn from(value: &'a Route) -> Self {
        let endpoints = value.endpoints();
        let markers = value.markers();
        Self {
            route_id: value.route_id().as_str(),
            eqp_id: value.eqp_id().as_str(),
            route_name: value.route_name(),
            start_gps: endpoints.start.map(|point| point.to_string()),
            end_gps: endpoints.end.map(|point| point.to_string()),
            start_km: markers.start_km,
            end_km: markers.end_km,
            start_chainage: markers.start_chainage,
            end_chainage: markers.end_chainage,
            inserted_on: value.inserted_on(),
        }
    }
}

// ---------------------------------------------------------------------------
// Movement cycle models
// ---------------------------------------------------------------------------

fn endpoints_from_db(
    start_gps: Option<&str>,
    end_gps: Option<&str>,
) -> Result<RouteEndpoints, String> {
    let parse = |raw: Option<&str>, column: &str| {
        raw.map(|value| {
            value
                .parse::<GpsPoint>()
                .map_err(|err| format!("{column} {value:?}: {err}"))
        })
        .transpose()
    };
    Ok(RouteEndpoints {
        start: parse(start_gps, "start_gps")?,
        end: parse(end_gps, "end_gps")?,
    })
}

fn label_from_db(raw: Option<String>) -> Result<Option<GroupLabel>, String> {
    raw.map(|label| GroupLabel::new(label).map_err(|err| err.to_string()))
        .transpose()
}

fn key_from_db(group_no: i32, cycle_number: i32) -> Result<CycleKey, String> {
    Ok(CycleKey::new(
        int_from_db(group_no, "group_no")?,
        int_from_db(cycle_number, "cycle_number")?,
    ))
}

fn status_from_db(raw: &str) -> Result<CycleStatus, String> {
    raw.parse::<CycleStatus>().map_err(|err| err.to_string())
}

/// Row struct for reading a full cycle, samples included.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = movement_cycles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MovementCycleRow {
    pub route_id: String,
    pub eqp_id: String,
    pub group_no: i32,
    pub cycle_number: i32,
    pub group_label: Option<String>,
    pub sample_slots: serde_json::Value,
    pub active_slot_index: i32,
    pub total_sample_count: i32,
    pub status: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub start_gps: Option<String>,
    pub end_gps: Option<String>,
    pub revision: i32,
    pub inserted_on: DateTime<Utc>,
}

impl MovementCycleRow {
    pub(crate) fn into_domain(self) -> Result<MovementCycle, String> {
        let key = key_from_db(self.group_no, self.cycle_number)?;
        let slots: SampleSlots = serde_json::from_value(self.sample_slots)
            .map_err(|err| format!("sample_slots of cycle {key}: {err}"))?;
        MovementCycle::new(MovementCycleDraft {
            route_id: RouteId::new(&self.route_id).map_err(|err| err.to_string())?,
            eqp_id: EquipmentId::new(&self.eqp_id).map_err(|err| err.to_string())?,
            key,
            group_label: label_from_db(self.group_label)?,
            slots,
            active_slot_index: int_from_db(self.active_slot_index, "active_slot_index")?,
            total_sample_count: int_from_db(self.total_sample_count, "total_sample_count")?,
            status: status_from_db(&self.status)?,
            start_time: self.start_time,
            end_time: self.end_time,
            endpoints: endpoints_from_db(self.start_gps.as_deref(), self.end_gps.as_deref())?,
            revision: cast_revision(self.revision),
            inserted_on: self.inserted_on,
        })
        .map_err(|err| format!("cycle {key}: {err}"))
    }
}

/// Row struct for list queries; leaves the sample payload in the database.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = movement_cycles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CycleSummaryRow {
    pub route_id: String,
    pub eqp_id: String,
    pub group_no: i32,
    pub cycle_number: i32,
    pub group_label: Option<String>,
    pub active_slot_index: i32,
    pub total_sample_count: i32,
    pub status: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub start_gps: Option<String>,
    pub end_gps: Option<String>,
    pub inserted_on: DateTime<Utc>,
}

impl CycleSummaryRow {
    pub(crate) fn into_domain(self) -> Result<CycleSummary, String> {
        Ok(CycleSummary {
            route_id: RouteId::new(&self.route_id).map_err(|err| err.to_string())?,
            eqp_id: EquipmentId::new(&self.eqp_id).map_err(|err| err.to_string())?,
            key: key_from_db(self.group_no, self.cycle_number)?,
            group_label: label_from_db(self.group_label)?,
            active_slot_index: int_from_db(self.active_slot_index, "active_slot_index")?,
            total_sample_count: int_from_db(self.total_sample_count, "total_sample_count")?,
            status: status_from_db(&self.status)?,
            start_time: self.start_time,
            end_time: self.end_time,
            endpoints: endpoints_from_db(self.start_gps.as_deref(), self.end_gps.as_deref())?,
            inserted_on: self.inserted_on,
        })
    }
}

/// Insertable struct for creating cycle records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = movement_cycles)]
pub(crate) struct NewMovementCycleRow<'a> {
    pub route_id: &'a str,
    pub eqp_id: &'a str,
    pub group_no: i32,
    pub cycle_number: i32,
    pub group_label: Option<&'a str>,
    pub sample_slots: serde_json::Value,
    pub active_slot_index: i32,
    pub total_sample_count: i32,
    pub status: &'static str,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub start_gps: Option<String>,
    pub end_gps: Option<String>,
    pub revision: i32,
    pub inserted_on: DateTime<Utc>,
}

/// Changeset struct for rewriting a cycle's mutable columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = movement_cycles)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct MovementCycleUpdate<'a> {
    pub group_label: Option<&'a str>,
    pub sample_slots: serde_json::Value,
    pub active_slot_index: i32,
    pub total_sample_count: i32,
    pub status: &'static str,
    pub end_time: Option<DateTime<Utc>>,
    pub revision: i32,
}

// ---------------------------------------------------------------------------
// Group label and id sequence models
// ---------------------------------------------------------------------------

/// Insertable struct for binding a group label.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = movement_group_labels)]
pub(crate) struct NewGroupLabelRow<'a> {
    pub route_id: &'a str,
    pub eqp_id: &'a str,
    pub group_label: &'a str,
    pub group_no: i32,
}

/// Insertable struct for seeding an id sequence.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = id_sequences)]
pub(crate) struct NewIdSequenceRow<'a> {
    pub scope: &'a str,
    pub prefix: &'a str,
    pub last_value: i64,
}
