//! GPS reference points and tolerant coordinate matching.
//!
//! Coordinates arrive either as a `"lat,lng"` string or as an object keyed by
//! `latitude`/`longitude` (or the short `lat`/`lng`). Component values may be
//! JSON numbers or numeric strings. Anything else is not a point, and
//! matching against a non-point always fails.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

/// Default per-axis matching tolerance in decimal degrees.
pub const DEFAULT_GPS_TOLERANCE: f64 = 0.001;

// Absorbs binary rounding so that an exact 0.001 offset still matches.
const TOLERANCE_EPSILON: f64 = 1e-9;

/// Errors raised when a coordinate cannot be built or parsed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GpsPointError {
    #[error("expected \"latitude,longitude\"")]
    Malformed,
    #[error("latitude must be between -90 and 90 (got {0})")]
    LatitudeOutOfRange(f64),
    #[error("longitude must be between -180 and 180 (got {0})")]
    LongitudeOutOfRange(f64),
}

/// A validated latitude/longitude pair.
///
/// # Examples
/// ```
/// use equipment_movements::domain::movement::GpsPoint;
///
/// let route_start: GpsPoint = "28.7041,77.1025".parse().expect("valid point");
/// let observed = GpsPoint::new(28.7042, 77.1024).expect("valid point");
/// assert!(route_start.matches(&observed, 0.001));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsPoint {
    latitude: f64,
    longitude: f64,
}

impl GpsPoint {
    /// Build a point, rejecting non-finite or out-of-range components.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GpsPointError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(GpsPointError::LatitudeOutOfRange(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(GpsPointError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Interpret a JSON marker as a point, if it has a recognised shape.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(raw) => raw.parse().ok(),
            Value::Object(map) => {
                let latitude = map.get("latitude").or_else(|| map.get("lat"))?;
                let longitude = map.get("longitude").or_else(|| map.get("lng"))?;
                Self::new(component(latitude)?, component(longitude)?).ok()
            }
            _ => None,
        }
    }

    /// True when both axes differ by no more than `tolerance`.
    pub fn matches(&self, other: &GpsPoint, tolerance: f64) -> bool {
        let limit = tolerance + TOLERANCE_EPSILON;
        (self.latitude - other.latitude).abs() <= limit
            && (self.longitude - other.longitude).abs() <= limit
    }

    /// Match a raw JSON marker against this point; malformed markers never match.
    pub fn matches_json(&self, marker: &Value, tolerance: f64) -> bool {
        Self::from_json(marker).is_some_and(|point| self.matches(&point, tolerance))
    }
}

fn component(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().parse().ok(),
        _ => None,
    }
}

impl FromStr for GpsPoint {
    type Err = GpsPointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s.split_once(',').ok_or(GpsPointError::Malformed)?;
        let latitude = lat
            .trim()
            .parse::<f64>()
            .map_err(|_| GpsPointError::Malformed)?;
        let longitude = lng
            .trim()
            .parse::<f64>()
            .map_err(|_| GpsPointError::Malformed)?;
        Self::new(latitude, longitude)
    }
}

impl fmt::Display for GpsPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}
