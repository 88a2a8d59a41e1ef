//! Error types for the FleetScale control loop.

use thiserror::Error;

use crate::types::Phase;

/// Result type alias for control-loop operations.
pub type EnvResult<T> = Result<T, EnvError>;

/// Errors that can occur while driving the decision environment.
///
/// None of these are fatal to the hosting process: `SignalUnavailable`
/// degrades to a cached sample when one exists, `InvalidState` signals
/// a usage bug that a `reset` recovers from, and telemetry failures
/// are swallowed inside the controller.
#[derive(Debug, Error)]
pub enum EnvError {
    /// The demand provider is unreachable and no cached sample exists.
    #[error("demand signal unavailable: {0}")]
    SignalUnavailable(String),

    /// `step` was called outside the `Running` phase.
    #[error("step called in {actual:?} phase, expected {expected:?}")]
    InvalidState { expected: Phase, actual: Phase },

    /// A telemetry publish failed. Always caught inside the controller.
    #[error("telemetry publish failed: {0}")]
    TelemetryPublishFailed(String),

    /// The run configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
}
