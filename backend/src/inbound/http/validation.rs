//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every rejection is an `invalid_request` error whose details name the
//! offending field and carry a stable `code`.

use serde_json::json;

use crate::domain::movement::{CycleStatus, GroupLabel};
use crate::domain::{
    EquipmentId, EquipmentValidationError, Error, RouteId, RouteValidationError,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidField,
    InvalidNumber,
    InvalidStatus,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidField => "invalid_field",
            ErrorCode::InvalidNumber => "invalid_number",
            ErrorCode::InvalidStatus => "invalid_status",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

fn field_error(field: &str, code: ErrorCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code.as_str(),
    }))
}

fn value_error(field: &str, code: ErrorCode, message: impl Into<String>, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "value": value,
        "code": code.as_str(),
    }))
}

pub(crate) fn equipment_validation_error(err: &EquipmentValidationError) -> Error {
    field_error(err.field(), ErrorCode::InvalidField, err.to_string())
}

pub(crate) fn route_validation_error(err: &RouteValidationError) -> Error {
    field_error(err.field(), ErrorCode::InvalidField, err.to_string())
}

pub(crate) fn parse_equipment_id(value: &str) -> Result<EquipmentId, Error> {
    EquipmentId::new(value).map_err(|err| equipment_validation_error(&err))
}

pub(crate) fn parse_route_id(value: &str) -> Result<RouteId, Error> {
    RouteId::new(value).map_err(|err| route_validation_error(&err))
}

pub(crate) fn parse_group_label(value: &str, field: FieldName) -> Result<GroupLabel, Error> {
    GroupLabel::new(value)
        .map_err(|err| field_error(field.as_str(), ErrorCode::InvalidField, err.to_string()))
}

/// Parse a non-negative integer path segment.
pub(crate) fn parse_number(value: &str, field: FieldName) -> Result<u32, Error> {
    let field = field.as_str();
    value.trim().parse::<u32>().map_err(|_| {
        value_error(
            field,
            ErrorCode::InvalidNumber,
            format!("{field} must be a non-negative integer"),
            value,
        )
    })
}

pub(crate) fn parse_status(value: &str, field: FieldName) -> Result<CycleStatus, Error> {
    let field = field.as_str();
    value.trim().parse::<CycleStatus>().map_err(|_| {
        value_error(
            field,
            ErrorCode::InvalidStatus,
            format!("{field} must be one of pending, live or completed"),
            value,
        )
    })
}
