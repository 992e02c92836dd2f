//! Route registry entities.
//!
//! A route records one locked run of a piece of equipment: its GPS endpoints
//! (the reference points for GPS status matching) and distance markers.
//! Routes are immutable once created.

use std::fmt;

use chrono::{DateTime, Utc};

use super::equipment::{EquipmentId, EquipmentValidationError, TEXT_COLUMN_MAX};
use super::movement::{GpsPoint, GpsPointError, RouteEndpoints};

/// Validation failures for route input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RouteValidationError {
    #[error("route_id must not be empty")]
    EmptyId,
    #[error("route_id must be at most 255 characters")]
    IdTooLong,
    #[error(transparent)]
    Equipment(#[from] EquipmentValidationError),
    #[error("route_name must be at most 255 characters")]
    NameTooLong,
    #[error("{field} is not a valid coordinate: {source}")]
    InvalidGps {
        field: &'static str,
        #[source]
        source: GpsPointError,
    },
    #[error("{field} must be a finite number")]
    NonFiniteDistance { field: &'static str },
}

impl RouteValidationError {
    /// Name of the offending input field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyId | Self::IdTooLong => "route_id",
            Self::Equipment(_) => "eqp_id",
            Self::NameTooLong => "route_name",
            Self::InvalidGps { field, .. } | Self::NonFiniteDistance { field } => *field,
        }
    }
}

/// Stable route identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteId(String);

impl RouteId {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, RouteValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(RouteValidationError::EmptyId);
        }
        if trimmed.chars().count() > TEXT_COLUMN_MAX {
            return Err(RouteValidationError::IdTooLong);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unvalidated route input as received from adapters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteDraft {
    pub eqp_id: String,
    pub route_name: Option<String>,
    pub start_gps: Option<String>,
    pub end_gps: Option<String>,
    pub start_km: Option<f64>,
    pub end_km: Option<f64>,
    pub start_chainage: Option<f64>,
    pub end_chainage: Option<f64>,
}

/// Distance markers along the road, in kilometres and chainage.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RouteMarkers {
    pub start_km: Option<f64>,
    pub end_km: Option<f64>,
    pub start_chainage: Option<f64>,
    pub end_chainage: Option<f64>,
}

/// Validated input for registering a route.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRoute {
    eqp_id: EquipmentId,
    route_name: Option<String>,
    endpoints: RouteEndpoints,
    markers: RouteMarkers,
}

fn parse_gps(
    raw: Option<String>,
    field: &'static str,
) -> Result<Option<GpsPoint>, RouteValidationError> {
    raw.filter(|value| !value.trim().is_empty())
        .map(|value| {
            value
                .parse::<GpsPoint>()
                .map_err(|source| RouteValidationError::InvalidGps { field, source })
        })
        .transpose()
}

fn finite(value: Option<f64>, field: &'static str) -> Result<Option<f64>, RouteValidationError> {
    match value {
        Some(number) if !number.is_finite() => {
            Err(RouteValidationError::NonFiniteDistance { field })
        }
        other => Ok(other),
    }
}

impl TryFrom<RouteDraft> for NewRoute {
    type Error = RouteValidationError;

    fn try_from(draft: RouteDraft) -> Result<Self, Self::Error> {
        let route_name = draft
            .route_name
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty());
        if route_name
            .as_deref()
            .is_some_and(|name| name.chars().count() > TEXT_COLUMN_MAX)
        {
            return Err(RouteValidationError::NameTooLong);
        }

        Ok(Self {
            eqp_id: EquipmentId::new(&draft.eqp_id)?,
            route_name,
            endpoints: RouteEndpoints {
                start: parse_gps(draft.start_gps, "start_gps")?,
                end: parse_gps(draft.end_gps, "end_gps")?,
            },
            markers: RouteMarkers {
                start_km: finite(draft.start_km, "start_km")?,
                end_km: finite(draft.end_km, "end_km")?,
                start_chainage: finite(draft.start_chainage, "start_chainage")?,
                end_chainage: finite(draft.end_chainage, "end_chainage")?,
            },
        })
    }
}

impl NewRoute {
    pub fn eqp_id(&self) -> &EquipmentId {
        &self.eqp_id
    }

    /// Attach the generated identifier and creation time.
    pub fn into_route(self, route_id: RouteId, inserted_on: DateTime<Utc>) -> Route {
        Route {
            route_id,
            eqp_id: self.eqp_id,
            route_name: self.route_name,
            endpoints: self.endpoints,
            markers: self.markers,
            inserted_on,
        }
    }
}

/// A registered route.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    route_id: RouteId,
    eqp_id: EquipmentId,
    route_name: Option<String>,
    endpoints: RouteEndpoints,
    markers: RouteMarkers,
    inserted_on: DateTime<Utc>,
}

impl Route {
    pub fn route_id(&self) -> &RouteId {
        &self.route_id
    }

    /// Equipment that locked this route.
    pub fn eqp_id(&self) -> &EquipmentId {
        &self.eqp_id
    }

    pub fn route_name(&self) -> Option<&str> {
        self.route_name.as_deref()
    }

    /// Reference GPS endpoints.
    pub fn endpoints(&self) -> &RouteEndpoints {
        &self.endpoints
    }

    pub fn markers(&self) -> &RouteMarkers {
        &self.markers
    }

    pub fn inserted_on(&self) -> DateTime<Utc> {
        self.inserted_on
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn draft() -> RouteDraft {
        RouteDraft {
            eqp_id: "EQP-00001".to_owned(),
            route_name: Some(" NH-48 north ".to_owned()),
            start_gps: Some("28.7041,77.1025".to_owned()),
            end_gps: Some("28.5355, 77.3910".to_owned()),
            start_km: Some(12.5),
            end_km: Some(18.25),
            start_chainage: Some(12.5),
            end_chainage: None,
        }
    }

    #[rstest]
    fn valid_draft_converts(draft: RouteDraft) {
        let route = NewRoute::try_from(draft)
            .expect("valid draft")
            .into_route(RouteId::new("ROT-00001").expect("id"), Utc::now());

        assert_eq!(route.route_name(), Some("NH-48 north"));
        assert_eq!(route.eqp_id().as_str(), "EQP-00001");
        let end = route.endpoints().end.expect("end point");
        assert!((end.longitude() - 77.391).abs() < f64::EPSILON);
        assert_eq!(route.markers().end_chainage, None);
    }

    #[rstest]
    fn blank_gps_is_treated_as_absent(mut draft: RouteDraft) {
        draft.start_gps = Some("  ".to_owned());
        let route = NewRoute::try_from(draft).expect("valid draft");
        assert!(route.endpoints.start.is_none());
    }

    #[rstest]
    fn malformed_gps_names_field(mut draft: RouteDraft) {
        draft.end_gps = Some("north-east".to_owned());
        let err = NewRoute::try_from(draft).expect_err("invalid gps");
        assert_eq!(err.field(), "end_gps");
    }

    #[rstest]
    fn missing_equipment_is_rejected(mut draft: RouteDraft) {
        draft.eqp_id = String::new();
        let err = NewRoute::try_from(draft).expect_err("missing eqp_id");
        assert_eq!(err.field(), "eqp_id");
    }

    #[rstest]
    fn non_finite_distances_are_rejected(mut draft: RouteDraft) {
        draft.start_km = Some(f64::NAN);
        let err = NewRoute::try_from(draft).expect_err("nan distance");
        assert_eq!(
            err,
            RouteValidationError::NonFiniteDistance { field: "start_km" }
        );
    }
}
