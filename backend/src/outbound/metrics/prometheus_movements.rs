//! Prometheus adapter for movement write metrics.
//!
//! Counters are registered with the registry that also backs the `/metrics`
//! endpoint, so they appear next to the HTTP request metrics.

use async_trait::async_trait;
use prometheus::{IntCounter, IntCounterVec, Opts, Registry};

use crate::domain::ports::{MovementMetrics, MovementMetricsError, MovementWriteOutcome};

/// Prometheus-backed movement metrics recorder.
///
/// # Metric Specification
///
/// - `movements_writes_total` (counter, label `outcome`: `created`,
///   `appended`, `rejected` or `conflict`)
/// - `movements_dropped_samples_total` (counter): samples discarded because
///   every slot of the target cycle was full
pub struct PrometheusMovementMetrics {
    writes_total: IntCounterVec,
    dropped_samples_total: IntCounter,
}

impl PrometheusMovementMetrics {
    /// Create and register metrics with the given registry.
    ///
    /// # Errors
    ///
    /// Returns an error if a metric with the same name is already registered.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let writes_total = IntCounterVec::new(
            Opts::new(
                "movements_writes_total",
                "Movement submissions by outcome",
            ),
            &["outcome"],
        )?;
        let dropped_samples_total = IntCounter::new(
            "movements_dropped_samples_total",
            "Samples discarded because every slot was full",
        )?;
        registry.register(Box::new(writes_total.clone()))?;
        registry.register(Box::new(dropped_samples_total.clone()))?;
        Ok(Self {
            writes_total,
            dropped_samples_total,
        })
    }
}

#[async_trait]
impl MovementMetrics for PrometheusMovementMetrics {
    async fn record_write(&self, outcome: MovementWriteOutcome) -> Result<(), MovementMetricsError> {
        self.writes_total
            .with_label_values(&[outcome.as_str()])
            .inc();
        Ok(())
    }

    async fn record_dropped_samples(&self, count: u64) -> Result<(), MovementMetricsError> {
        self.dropped_samples_total.inc_by(count);
        Ok(())
    }
}
