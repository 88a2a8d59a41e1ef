//! fleetscale-signal — demand signal sources for the control loop.
//!
//! Two ways to answer "how many players need servers right now":
//!
//! - [`LocalSimulator`]: a deterministic sine-shaped load curve over
//!   logical elapsed time. No network, fully reproducible, used for
//!   offline dev loops and tests.
//! - [`RemoteProvider`]: an HTTP GET against a configured inventory
//!   endpoint, with a bounded timeout and a cached-fallback path so a
//!   briefly unreachable provider degrades the tick instead of
//!   killing it.
//!
//! The variant is chosen once at construction from
//! `RunConfig.gs_inventory_url` (the sentinel `"local"` selects the
//! simulator), never re-selected per tick.

pub mod remote;
pub mod simulator;

use fleetscale_core::{DemandSample, EnvResult, RunConfig};

pub use remote::RemoteProvider;
pub use simulator::LocalSimulator;

/// A source of demand samples, one per tick.
#[derive(Debug)]
pub enum DemandSource {
    Local(LocalSimulator),
    Remote(RemoteProvider),
}

impl DemandSource {
    /// Build the source selected by the run configuration.
    pub fn from_config(config: &RunConfig) -> Self {
        if config.uses_local_signal() {
            DemandSource::Local(LocalSimulator::new(
                config.simulator_period_secs,
                config.action_factor,
            ))
        } else {
            DemandSource::Remote(RemoteProvider::new(
                config.gs_inventory_url.clone(),
                std::time::Duration::from_secs(config.signal_timeout_secs),
            ))
        }
    }

    /// Fetch the demand sample for the given logical elapsed time.
    ///
    /// Fails with `EnvError::SignalUnavailable` only when the remote
    /// provider is unreachable and no cached sample exists; a stale
    /// cached sample is returned (flagged) in preference to failing.
    pub async fn current_demand(&mut self, elapsed_secs: u64) -> EnvResult<DemandSample> {
        match self {
            DemandSource::Local(sim) => Ok(sim.sample(elapsed_secs)),
            DemandSource::Remote(provider) => provider.fetch(elapsed_secs).await,
        }
    }
}
