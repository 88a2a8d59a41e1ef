//! Domain types for the FleetScale decision environment.
//!
//! These types flow between the demand source, the observation window,
//! and the caller driving the control loop. All of them serialize to
//! JSON so step outcomes can be logged or shipped to an external
//! policy provider unchanged.

use serde::{Deserialize, Serialize};

// ── Demand ────────────────────────────────────────────────────────

/// A single demand reading taken at one tick.
///
/// Immutable once recorded into the observation window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemandSample {
    /// Logical episode time at which the sample was taken (seconds).
    pub epoch_secs: u64,
    /// Raw demand figure, always >= 0.
    pub raw_value: f64,
    /// True when this is a cached fallback from a failed remote fetch.
    pub stale: bool,
}

impl DemandSample {
    /// A fresh (non-stale) sample.
    pub fn fresh(epoch_secs: u64, raw_value: f64) -> Self {
        Self {
            epoch_secs,
            raw_value: raw_value.max(0.0),
            stale: false,
        }
    }

    /// Re-stamp a cached sample as a stale fallback for a later tick.
    pub fn as_stale(self, epoch_secs: u64) -> Self {
        Self {
            epoch_secs,
            stale: true,
            ..self
        }
    }
}

// ── Action ────────────────────────────────────────────────────────

/// A policy output after mapping into an actionable server count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// Logical episode time at which the action was taken (seconds).
    pub epoch_secs: u64,
    /// Normalized policy output, clamped into [0, 1].
    pub normalized: f64,
    /// Mapped integer server target in [min_servers, max_servers].
    pub server_count: u32,
}

// ── Episode ───────────────────────────────────────────────────────

/// Lifecycle phase of an episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No episode has been started yet.
    Uninitialized,
    /// An episode is in progress; `step` is valid.
    Running,
    /// The episode hit its duration; terminal until the next `reset`.
    Done,
}

/// Per-tick sidecar data returned alongside the observation.
///
/// Carries what an external caller needs to actually issue a scaling
/// operation: the resolved server count, the demand that drove it, and
/// whether the signal was a stale fallback.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepInfo {
    pub step_index: u64,
    pub server_count: u32,
    pub raw_demand: f64,
    pub signal_stale: bool,
}

/// Everything one `step` call produces.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    /// Fixed-width feature vector (see the observation window docs).
    pub observation: Vec<f64>,
    pub reward: f64,
    pub done: bool,
    pub info: StepInfo,
}
