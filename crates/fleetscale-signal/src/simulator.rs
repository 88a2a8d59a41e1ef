//! Deterministic local demand simulator.
//!
//! Produces a smooth periodic load curve as a pure function of logical
//! elapsed seconds, so offline runs replay identically.

use std::f64::consts::TAU;

use fleetscale_core::DemandSample;

/// Sine-shaped demand curve: `base + amplitude * sin(TAU * t / period)`,
/// clamped to >= 0.
///
/// With the defaults the curve swings between zero and `peak` over one
/// period (an hour by default), which exercises both the shortfall and
/// surplus sides of the reward without any randomness.
#[derive(Debug, Clone)]
pub struct LocalSimulator {
    period_secs: u64,
    base: f64,
    amplitude: f64,
}

impl LocalSimulator {
    /// Create a simulator whose curve peaks near `peak` over `period_secs`.
    pub fn new(period_secs: u64, peak: f64) -> Self {
        let peak = peak.max(0.0);
        Self {
            period_secs: period_secs.max(1),
            base: peak / 2.0,
            amplitude: peak / 2.0,
        }
    }

    /// Simulator with explicit base and amplitude.
    pub fn with_curve(period_secs: u64, base: f64, amplitude: f64) -> Self {
        Self {
            period_secs: period_secs.max(1),
            base,
            amplitude,
        }
    }

    /// The demand sample at the given logical elapsed time.
    pub fn sample(&self, elapsed_secs: u64) -> DemandSample {
        let phase = TAU * (elapsed_secs % self.period_secs) as f64 / self.period_secs as f64;
        let value = self.base + self.amplitude * phase.sin();
        DemandSample::fresh(elapsed_secs, value)
    }
}
