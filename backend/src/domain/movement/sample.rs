//! Telemetry samples submitted against a movement cycle.
//!
//! A sample is an opaque JSON object. Only a handful of keys carry meaning to
//! the domain: `sample_id` (optional de-duplication key), `type` (marker tag
//! read by the type-tag status strategy) and `start_gps`/`end_gps` (markers
//! read by the GPS-matching strategy). Everything else is stored verbatim.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// JSON key holding the caller-supplied sample identifier.
pub const SAMPLE_ID_KEY: &str = "sample_id";
/// JSON key holding the marker type tag.
pub const SAMPLE_TYPE_KEY: &str = "type";
/// JSON key holding the start-of-route GPS marker.
pub const START_GPS_KEY: &str = "start_gps";
/// JSON key holding the end-of-route GPS marker.
pub const END_GPS_KEY: &str = "end_gps";

/// Marker tag carried by samples under the type-tag status strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleType {
    /// `0`: the equipment left the route start.
    Start,
    /// `1`: the equipment is en route.
    Pending,
    /// `2`: the equipment reached the route end.
    Completed,
}

impl SampleType {
    /// Decode the wire tag.
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(Self::Start),
            1 => Some(Self::Pending),
            2 => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Reasons a raw JSON value is rejected as a sample.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SampleValidationError {
    #[error("sample must be a JSON object")]
    NotAnObject,
    #[error("sample type must be 0, 1 or 2 (got {value})")]
    InvalidType { value: Value },
    #[error("sample_id must be a non-empty string")]
    InvalidSampleId,
}

impl SampleValidationError {
    /// Stable code surfaced in error details.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotAnObject => "not_an_object",
            Self::InvalidType { .. } => "invalid_type",
            Self::InvalidSampleId => "invalid_sample_id",
        }
    }
}

/// A validated sample in a batch, tagged with its position for error reports.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("sample {index} is invalid: {source}")]
pub struct SampleBatchError {
    pub index: usize,
    #[source]
    pub source: SampleValidationError,
}

/// One telemetry data point.
///
/// ## Invariants
/// - The payload is a JSON object.
/// - `type`, when present, is 0, 1 or 2.
/// - `sample_id`, when present, is a non-empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Sample(Map<String, Value>);

impl Sample {
    /// Caller-supplied identifier used for de-duplication.
    pub fn sample_id(&self) -> Option<&str> {
        self.0.get(SAMPLE_ID_KEY).and_then(Value::as_str)
    }

    /// Marker type, if the sample carries one.
    pub fn sample_type(&self) -> Option<SampleType> {
        self.0
            .get(SAMPLE_TYPE_KEY)
            .and_then(Value::as_u64)
            .and_then(SampleType::from_code)
    }

    /// Raw start-of-route marker, if present and not null.
    pub fn start_gps(&self) -> Option<&Value> {
        self.0.get(START_GPS_KEY).filter(|value| !value.is_null())
    }

    /// Raw end-of-route marker, if present and not null.
    pub fn end_gps(&self) -> Option<&Value> {
        self.0.get(END_GPS_KEY).filter(|value| !value.is_null())
    }

    /// Borrow the underlying JSON object.
    pub fn as_object(&self) -> &Map<String, Value> {
        &self.0
    }
}

fn validate_type(value: &Value) -> Result<(), SampleValidationError> {
    match value.as_u64().and_then(SampleType::from_code) {
        Some(_) => Ok(()),
        None => Err(SampleValidationError::InvalidType {
            value: value.clone(),
        }),
    }
}

fn validate_sample_id(value: &Value) -> Result<(), SampleValidationError> {
    match value.as_str() {
        Some(id) if !id.trim().is_empty() => Ok(()),
        _ => Err(SampleValidationError::InvalidSampleId),
    }
}

impl TryFrom<Value> for Sample {
    type Error = SampleValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(map) = value else {
            return Err(SampleValidationError::NotAnObject);
        };
        if let Some(tag) = map.get(SAMPLE_TYPE_KEY).filter(|v| !v.is_null()) {
            validate_type(tag)?;
        }
        if let Some(id) = map.get(SAMPLE_ID_KEY).filter(|v| !v.is_null()) {
            validate_sample_id(id)?;
        }
        Ok(Self(map))
    }
}

impl From<Sample> for Value {
    fn from(sample: Sample) -> Self {
        Value::Object(sample.0)
    }
}

/// Validate a batch of raw values, reporting the first offending index.
///
/// # Examples
/// ```
/// use equipment_movements::domain::movement::validate_samples;
/// use serde_json::json;
///
/// let samples = validate_samples(vec![json!({"type": 0}), json!({"type": 2})])
///     .expect("valid batch");
/// assert_eq!(samples.len(), 2);
///
/// let err = validate_samples(vec![json!({"type": 1}), json!(42)]).unwrap_err();
/// assert_eq!(err.index, 1);
/// ```
pub fn validate_samples(values: Vec<Value>) -> Result<Vec<Sample>, SampleBatchError> {
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            Sample::try_from(value).map_err(|source| SampleBatchError { index, source })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case(json!({"type": 0}), Some(SampleType::Start))]
    #[case(json!({"type": 1}), Some(SampleType::Pending))]
    #[case(json!({"type": 2}), Some(SampleType::Completed))]
    #[case(json!({"speed": 12.5}), None)]
    fn reads_type_tag(#[case] raw: Value, #[case] expected: Option<SampleType>) {
        let sample = Sample::try_from(raw).expect("valid sample");
        assert_eq!(sample.sample_type(), expected);
    }

    #[rstest]
    #[case(json!({"type": 3}))]
    #[case(json!({"type": -1}))]
    #[case(json!({"type": "2"}))]
    #[case(json!({"type": 1.5}))]
    fn rejects_unknown_type_tags(#[case] raw: Value) {
        let err = Sample::try_from(raw).expect_err("type tag rejected");
        assert_eq!(err.code(), "invalid_type");
    }

    #[rstest]
    #[case(json!([1, 2]))]
    #[case(json!("28.7,77.1"))]
    #[case(Value::Null)]
    fn rejects_non_objects(#[case] raw: Value) {
        assert_eq!(
            Sample::try_from(raw),
            Err(SampleValidationError::NotAnObject)
        );
    }

    #[rstest]
    #[case(json!({"sample_id": ""}))]
    #[case(json!({"sample_id": "   "}))]
    #[case(json!({"sample_id": 7}))]
    fn rejects_blank_sample_ids(#[case] raw: Value) {
        assert_eq!(
            Sample::try_from(raw),
            Err(SampleValidationError::InvalidSampleId)
        );
    }

    #[rstest]
    fn null_markers_are_treated_as_absent() {
        let sample =
            Sample::try_from(json!({"type": null, "start_gps": null, "sample_id": null}))
                .expect("nulls accepted");
        assert!(sample.start_gps().is_none());
        assert!(sample.sample_id().is_none());
        assert!(sample.sample_type().is_none());
    }

    #[rstest]
    fn deserialisation_applies_validation() {
        let parsed: Result<Vec<Sample>, _> = serde_json::from_value(json!([{"type": 9}]));
        assert!(parsed.is_err());
    }

    #[rstest]
    fn batch_reports_first_invalid_index() {
        let err = validate_samples(vec![json!({}), json!({"type": 0}), json!([]), json!(1)])
            .expect_err("batch rejected");
        assert_eq!(err.index, 2);
        assert_eq!(err.source, SampleValidationError::NotAnObject);
    }
}
