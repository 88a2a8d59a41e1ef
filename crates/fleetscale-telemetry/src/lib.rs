//! fleetscale-telemetry — best-effort step-metric export.
//!
//! The control loop publishes four fixed metrics per tick (reward,
//! chosen server count, raw demand, staleness flag) into a named
//! namespace. The backend is abstracted behind [`TelemetrySink`] so
//! the loop has zero dependency on any specific monitoring service;
//! a failing sink degrades observability, never correctness.

pub mod sink;

pub use sink::{LogSink, MemorySink, MetricPoint, TelemetrySink};

/// Fixed metric names emitted once per tick.
pub mod metric {
    pub const STEP_REWARD: &str = "step_reward";
    pub const SERVER_COUNT: &str = "server_count";
    pub const RAW_DEMAND: &str = "raw_demand";
    pub const SIGNAL_STALE: &str = "signal_stale";
}
