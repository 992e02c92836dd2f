//! Prometheus request metrics and the movement counters sharing their
//! registry.

use std::sync::Arc;

use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};

use equipment_movements::domain::ports::MovementMetrics;
use equipment_movements::outbound::metrics::PrometheusMovementMetrics;

/// Build the `/metrics` middleware.
pub(crate) fn build_prometheus() -> std::io::Result<PrometheusMetrics> {
    PrometheusMetricsBuilder::new("movements")
        .endpoint("/metrics")
        .build()
        .map_err(|err| std::io::Error::other(format!("configure Prometheus metrics: {err}")))
}

/// Register the movement write counters next to the request metrics.
pub(crate) fn movement_metrics(
    prometheus: &PrometheusMetrics,
) -> std::io::Result<Arc<dyn MovementMetrics>> {
    let metrics = PrometheusMovementMetrics::new(&prometheus.registry).map_err(|err| {
        std::io::Error::other(format!("movement metrics registration failed: {err}"))
    })?;
    Ok(Arc::new(metrics))
}

#[cfg(test)]
mod tests {
    //! Registration of the shared registry.

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn movement_counters_join_request_registry() {
        let prometheus = build_prometheus().expect("prometheus middleware");
        movement_metrics(&prometheus).expect("register counters");
        let names: Vec<String> = prometheus
            .registry
            .gather()
            .into_iter()
            .map(|family| family.name().to_owned())
            .collect();
        assert!(names.iter().any(|name| name == "movements_dropped_samples_total"));
    }

    #[rstest]
    fn registering_twice_fails() {
        let prometheus = build_prometheus().expect("prometheus middleware");
        movement_metrics(&prometheus).expect("first registration");
        assert!(movement_metrics(&prometheus).is_err());
    }
}
