//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.
//!
//! # Maintenance
//!
//! When migrations change the schema, this file should be regenerated or
//! manually updated to reflect those changes. The `diesel print-schema`
//! command can generate these definitions from a live database.

diesel::table! {
    /// Registered equipment. Rows are never updated.
    equipment (eqp_id) {
        /// Sequential identifier such as `EQP-00001`.
        eqp_id -> Varchar,
        mobile -> Varchar,
        eqp_type -> Varchar,
        inserted_on -> Timestamptz,
    }
}

diesel::table! {
    /// Locked routes, one per physical lock run.
    equipment_routes (route_id) {
        /// Sequential identifier such as `ROT-00001`.
        route_id -> Varchar,
        eqp_id -> Varchar,
        route_name -> Nullable<Varchar>,
        /// `"lat,lng"` reference point.
        start_gps -> Nullable<Varchar>,
        /// `"lat,lng"` reference point.
        end_gps -> Nullable<Varchar>,
        start_km -> Nullable<Float8>,
        end_km -> Nullable<Float8>,
        start_chainage -> Nullable<Float8>,
        end_chainage -> Nullable<Float8>,
        inserted_on -> Timestamptz,
    }
}

diesel::table! {
    /// Movement cycles keyed by route, equipment, group and cycle number.
    movement_cycles (route_id, eqp_id, group_no, cycle_number) {
        route_id -> Varchar,
        eqp_id -> Varchar,
        group_no -> Int4,
        cycle_number -> Int4,
        group_label -> Nullable<Varchar>,
        /// JSON array of `slot_count` entries, each `null` or a sample array.
        sample_slots -> Jsonb,
        active_slot_index -> Int4,
        total_sample_count -> Int4,
        /// One of `pending`, `live` or `completed`.
        status -> Text,
        start_time -> Timestamptz,
        end_time -> Nullable<Timestamptz>,
        /// Route endpoints copied when the cycle was opened.
        start_gps -> Nullable<Varchar>,
        end_gps -> Nullable<Varchar>,
        /// Optimistic concurrency counter.
        revision -> Int4,
        inserted_on -> Timestamptz,
    }
}

diesel::table! {
    /// Group label bindings, unique per pair in both directions.
    movement_group_labels (route_id, eqp_id, group_label) {
        route_id -> Varchar,
        eqp_id -> Varchar,
        group_label -> Varchar,
        group_no -> Int4,
    }
}

diesel::table! {
    /// Counters behind the sequential identifiers.
    id_sequences (scope) {
        scope -> Varchar,
        prefix -> Varchar,
        last_value -> Int8,
    }
}

diesel::joinable!(equipment_routes -> equipment (eqp_id));
diesel::joinable!(movement_cycles -> equipment_routes (route_id));

diesel::allow_tables_to_appear_in_same_query!(
    equipment,
    equipment_routes,
    movement_cycles,
    movement_group_labels,
    id_sequences,
);
