//! Cycle lifecycle status and the strategies that derive it from samples.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{GpsPoint, Sample, SampleType};

/// Lifecycle state of a movement cycle.
///
/// Ordering follows the lifecycle: `Pending < Live < Completed`. A stored
/// status only ever moves forward, so merging uses [`CycleStatus::advance`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum CycleStatus {
    Pending,
    Live,
    Completed,
}

impl CycleStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Live => "live",
            Self::Completed => "completed",
        }
    }

    /// The later of the current and the newly resolved status.
    #[must_use]
    pub fn advance(self, resolved: CycleStatus) -> CycleStatus {
        self.max(resolved)
    }

    pub fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for CycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a stored or submitted status string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown cycle status: {0}")]
pub struct UnknownCycleStatus(pub String);

impl FromStr for CycleStatus {
    type Err = UnknownCycleStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "live" => Ok(Self::Live),
            "completed" => Ok(Self::Completed),
            other => Err(UnknownCycleStatus(other.to_owned())),
        }
    }
}

/// Route reference points used by GPS matching.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RouteEndpoints {
    pub start: Option<GpsPoint>,
    pub end: Option<GpsPoint>,
}

/// How a cycle's status is derived from its samples.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum StatusStrategy {
    /// Compare sample `start_gps`/`end_gps` markers with the route endpoints.
    GpsMatching { tolerance: f64 },
    /// Read the integer `type` tag carried by each sample. Callers may
    /// override the derived status.
    #[default]
    TypeTag,
}

impl StatusStrategy {
    /// Whether a caller-supplied status may replace the derived one.
    pub fn accepts_explicit_status(&self) -> bool {
        matches!(self, Self::TypeTag)
    }

    /// Derive the status of a cycle holding `samples`.
    pub fn resolve<'a, I>(&self, samples: I, endpoints: &RouteEndpoints) -> CycleStatus
    where
        I: IntoIterator<Item = &'a Sample>,
    {
        match self {
            Self::GpsMatching { tolerance } => resolve_gps(samples, endpoints, *tolerance),
            Self::TypeTag => resolve_type_tag(samples),
        }
    }
}

fn resolve_gps<'a, I>(samples: I, endpoints: &RouteEndpoints, tolerance: f64) -> CycleStatus
where
    I: IntoIterator<Item = &'a Sample>,
{
    let mut reached_start = false;
    for sample in samples {
        let reached_end = endpoints.end.is_some_and(|end| {
            sample
                .end_gps()
                .is_some_and(|marker| end.matches_json(marker, tolerance))
        });
        if reached_end {
            return CycleStatus::Completed;
        }
        reached_start = reached_start
            || endpoints.start.is_some_and(|start| {
                sample
                    .start_gps()
                    .is_some_and(|marker| start.matches_json(marker, tolerance))
            });
    }
    if reached_start {
        CycleStatus::Live
    } else {
        CycleStatus::Pending
    }
}

fn resolve_type_tag<'a, I>(samples: I) -> CycleStatus
where
    I: IntoIterator<Item = &'a Sample>,
{
    samples
        .into_iter()
        .filter_map(Sample::sample_type)
        .map(|tag| match tag {
            SampleType::Completed => CycleStatus::Completed,
            SampleType::Start | SampleType::Pending => CycleStatus::Live,
        })
        .max()
        .unwrap_or(CycleStatus::Pending)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::{fixture, rstest};
    use serde_json::{Value, json};

    use super::*;

    fn batch(values: Vec<Value>) -> Vec<Sample> {
        values
            .into_iter()
            .map(|value| Sample::try_from(value).expect("valid sample"))
            .collect()
    }

    #[fixture]
    fn endpoints() -> RouteEndpoints {
        RouteEndpoints {
            start: Some("28.7041,77.1025".parse().expect("start")),
            end: Some("28.5355,77.3910".parse().expect("end")),
        }
    }

    #[fixture]
    fn gps() -> StatusStrategy {
        StatusStrategy::GpsMatching { tolerance: 0.001 }
    }

    #[rstest]
    #[case(vec![], CycleStatus::Pending)]
    #[case(vec![json!({"speed": 3})], CycleStatus::Pending)]
    #[case(vec![json!({"type": 1}), json!({"type": 1})], CycleStatus::Live)]
    #[case(vec![json!({"type": 0})], CycleStatus::Live)]
    #[case(vec![json!({"type": 0}), json!({"type": 2}), json!({"type": 1})], CycleStatus::Completed)]
    fn type_tag_resolution(#[case] values: Vec<Value>, #[case] expected: CycleStatus) {
        let samples = batch(values);
        assert_eq!(
            StatusStrategy::TypeTag.resolve(&samples, &RouteEndpoints::default()),
            expected
        );
    }

    #[rstest]
    #[case(vec![json!({"start_gps": "28.7042,77.1024"})], CycleStatus::Live)]
    #[case(vec![json!({"start_gps": {"lat": 28.7041, "lng": 77.1025}}), json!({"end_gps": "28.5356,77.3911"})], CycleStatus::Completed)]
    #[case(vec![json!({"end_gps": {"latitude": 28.5355, "longitude": 77.3910}})], CycleStatus::Completed)]
    #[case(vec![json!({"start_gps": "28.71,77.1025"})], CycleStatus::Pending)]
    #[case(vec![json!({"start_gps": "garbage", "end_gps": {"lat": "x"}})], CycleStatus::Pending)]
    fn gps_resolution(
        gps: StatusStrategy,
        endpoints: RouteEndpoints,
        #[case] values: Vec<Value>,
        #[case] expected: CycleStatus,
    ) {
        let samples = batch(values);
        assert_eq!(gps.resolve(&samples, &endpoints), expected);
    }

    #[rstest]
    fn gps_resolution_without_route_endpoints_stays_pending(gps: StatusStrategy) {
        let samples = batch(vec![json!({"start_gps": "28.7041,77.1025"})]);
        assert_eq!(
            gps.resolve(&samples, &RouteEndpoints::default()),
            CycleStatus::Pending
        );
    }

    #[rstest]
    fn completed_survives_superset_resolution(gps: StatusStrategy, endpoints: RouteEndpoints) {
        let mut samples = batch(vec![json!({"end_gps": "28.5355,77.3910"})]);
        let first = gps.resolve(&samples, &endpoints);
        samples.extend(batch(vec![json!({"start_gps": "0,0"}), json!({})]));
        assert_eq!(first, CycleStatus::Completed);
        assert_eq!(gps.resolve(&samples, &endpoints), CycleStatus::Completed);
    }

    #[rstest]
    #[case(CycleStatus::Completed, CycleStatus::Pending, CycleStatus::Completed)]
    #[case(CycleStatus::Live, CycleStatus::Pending, CycleStatus::Live)]
    #[case(CycleStatus::Pending, CycleStatus::Live, CycleStatus::Live)]
    fn advance_never_regresses(
        #[case] current: CycleStatus,
        #[case] resolved: CycleStatus,
        #[case] expected: CycleStatus,
    ) {
        assert_eq!(current.advance(resolved), expected);
    }

    #[rstest]
    fn explicit_status_only_under_type_tag(gps: StatusStrategy) {
        assert!(StatusStrategy::TypeTag.accepts_explicit_status());
        assert!(!gps.accepts_explicit_status());
    }

    #[rstest]
    fn status_strings_round_trip() {
        for status in [CycleStatus::Pending, CycleStatus::Live, CycleStatus::Completed] {
            assert_eq!(status.as_str().parse::<CycleStatus>(), Ok(status));
        }
        assert!("done".parse::<CycleStatus>().is_err());
    }
}
