//! Telemetry sink implementations.

use std::sync::{Arc, Mutex};

use tracing::info;

use fleetscale_core::{EnvError, EnvResult};

/// A single published data point.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricPoint {
    pub namespace: String,
    pub metric: String,
    pub value: f64,
}

/// Destination for step-level metrics.
///
/// Implementations must be cheap and must not block the tick; the
/// controller treats every error as non-fatal (logged and dropped).
pub trait TelemetrySink: Send + Sync {
    /// Publish one value under `namespace/metric`.
    fn publish(&self, namespace: &str, metric: &str, value: f64) -> EnvResult<()>;
}

/// Sink that emits each point as a structured tracing event.
///
/// The default for the daemon: metrics land in the same log stream as
/// everything else and can be scraped or shipped from there.
#[derive(Debug, Default)]
pub struct LogSink;

impl TelemetrySink for LogSink {
    fn publish(&self, namespace: &str, metric: &str, value: f64) -> EnvResult<()> {
        info!(target: "fleetscale::telemetry", %namespace, %metric, value, "metric");
        Ok(())
    }
}

/// Sink that captures points in memory, for assertions in tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    points: Arc<Mutex<Vec<MetricPoint>>>,
    fail: Arc<Mutex<bool>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All points published so far.
    pub fn points(&self) -> Vec<MetricPoint> {
        self.points.lock().expect("sink poisoned").clone()
    }

    /// Points recorded for one metric name.
    pub fn values_for(&self, metric: &str) -> Vec<f64> {
        self.points()
            .into_iter()
            .filter(|p| p.metric == metric)
            .map(|p| p.value)
            .collect()
    }

    /// Make every subsequent publish fail, to exercise the
    /// swallow-and-log path in the controller.
    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().expect("sink poisoned") = fail;
    }
}

impl TelemetrySink for MemorySink {
    fn publish(&self, namespace: &str, metric: &str, value: f64) -> EnvResult<()> {
        if *self.fail.lock().expect("sink poisoned") {
            return Err(EnvError::TelemetryPublishFailed(format!(
                "injected failure for {namespace}/{metric}"
            )));
        }
        self.points.lock().expect("sink poisoned").push(MetricPoint {
            namespace: namespace.to_string(),
            metric: metric.to_string(),
            value,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric;

    #[test]
    fn memory_sink_captures_points() {
        let sink = MemorySink::new();
        sink.publish("fleetscale", metric::STEP_REWARD, -15.0).unwrap();
        sink.publish("fleetscale", metric::SERVER_COUNT, 55.0).unwrap();

        let points = sink.points();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].namespace, "fleetscale");
        assert_eq!(sink.values_for(metric::STEP_REWARD), vec![-15.0]);
    }

    #[test]
    fn memory_sink_injected_failure() {
        let sink = MemorySink::new();
        sink.set_failing(true);
        let err = sink.publish("fleetscale", metric::RAW_DEMAND, 70.0);
        assert!(matches!(err, Err(EnvError::TelemetryPublishFailed(_))));
        assert!(sink.points().is_empty());
    }

    #[test]
    fn log_sink_never_fails() {
        let sink = LogSink;
        sink.publish("fleetscale", metric::SIGNAL_STALE, 1.0).unwrap();
    }
}
