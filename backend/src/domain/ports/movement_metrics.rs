//! Domain port surface for recording movement write outcomes.
//!
//! Keeps the cycle writer free of any particular metrics backend. The server
//! plugs in Prometheus when the `metrics` feature is enabled and the no-op
//! recorder otherwise.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors exposed when recording movement metrics.
    pub enum MovementMetricsError {
        /// Metric exporter rejected the write.
        Export { message: String } => "movement metrics exporter failed: {message}",
    }
}

/// Result of one movement submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovementWriteOutcome {
    /// A new cycle row was inserted.
    Created,
    /// Samples were appended to an existing cycle.
    Appended,
    /// The submission failed validation or referenced missing rows.
    Rejected,
    /// Retries were exhausted against concurrent writers.
    Conflict,
}

impl MovementWriteOutcome {
    /// Label value used by metric exporters.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Appended => "appended",
            Self::Rejected => "rejected",
            Self::Conflict => "conflict",
        }
    }
}

/// Metrics recording port for movement writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MovementMetrics: Send + Sync {
    /// Count one submission outcome.
    async fn record_write(&self, outcome: MovementWriteOutcome) -> Result<(), MovementMetricsError>;

    /// Count samples discarded because every slot was full.
    async fn record_dropped_samples(&self, count: u64) -> Result<(), MovementMetricsError>;
}

/// No-op implementation for when metrics are disabled or in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpMovementMetrics;

#[async_trait]
impl MovementMetrics for NoOpMovementMetrics {
    async fn record_write(
        &self,
        _outcome: MovementWriteOutcome,
    ) -> Result<(), MovementMetricsError> {
        Ok(())
    }

    async fn record_dropped_samples(&self, _count: u64) -> Result<(), MovementMetricsError> {
        Ok(())
    }
}
