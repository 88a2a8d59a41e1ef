//! fleetscale.toml run configuration.
//!
//! Loaded once at startup and passed by value into constructors; the
//! control loop never reads ambient global state, so several
//! independently configured controllers can coexist in one process.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{EnvError, EnvResult};

/// Sentinel for `gs_inventory_url` selecting the local simulator.
pub const LOCAL_SIGNAL: &str = "local";

/// Immutable per-run configuration for one control loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Smallest fleet size the mapper may emit.
    pub min_servers: u32,
    /// Largest fleet size the mapper may emit.
    pub max_servers: u32,
    /// Scale applied to the normalized action before rounding.
    pub action_factor: f64,
    /// Reward-side divisor softening the per-unit surplus penalty.
    pub over_prov_factor: f64,
    /// Discount factor, passed through to the external optimizer.
    /// The control loop itself never consumes it.
    pub gamma: f64,
    /// Seconds between successive ticks.
    pub learning_freq_secs: u64,
    /// Episode length in seconds of logical time.
    pub episode_duration_secs: u64,
    /// Demand source selector: a URL, or `"local"` for the simulator.
    pub gs_inventory_url: String,
    /// Observation window capacity K. Feature width is 2K + 1.
    pub window_size: usize,
    /// Period of the simulator's sine load curve, in seconds.
    pub simulator_period_secs: u64,
    /// Timeout for each remote signal fetch, in seconds.
    pub signal_timeout_secs: u64,
    /// Namespace under which step metrics are published.
    pub telemetry_namespace: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            min_servers: 1,
            max_servers: 100,
            action_factor: 100.0,
            over_prov_factor: 5.0,
            gamma: 0.99,
            learning_freq_secs: 60,
            episode_duration_secs: 3600,
            gs_inventory_url: LOCAL_SIGNAL.to_string(),
            window_size: 7,
            simulator_period_secs: 3600,
            signal_timeout_secs: 2,
            telemetry_namespace: "fleetscale".to_string(),
        }
    }
}

impl RunConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: RunConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Render back to TOML, for scaffolding a starter config.
    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check cross-field invariants the serde layer cannot express.
    pub fn validate(&self) -> EnvResult<()> {
        if self.min_servers > self.max_servers {
            return Err(EnvError::Config(format!(
                "min_servers ({}) exceeds max_servers ({})",
                self.min_servers, self.max_servers
            )));
        }
        if self.action_factor <= 0.0 || !self.action_factor.is_finite() {
            return Err(EnvError::Config(format!(
                "action_factor must be a positive finite number, got {}",
                self.action_factor
            )));
        }
        if self.over_prov_factor <= 0.0 || !self.over_prov_factor.is_finite() {
            return Err(EnvError::Config(format!(
                "over_prov_factor must be a positive finite number, got {}",
                self.over_prov_factor
            )));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(EnvError::Config(format!(
                "gamma must be in [0, 1], got {}",
                self.gamma
            )));
        }
        if self.learning_freq_secs == 0 {
            // Logical time advances by the cadence per tick; a zero
            // cadence means elapsed time never moves and the episode
            // never terminates.
            return Err(EnvError::Config(
                "learning_freq_secs must be positive".to_string(),
            ));
        }
        if self.episode_duration_secs == 0 {
            return Err(EnvError::Config(
                "episode_duration_secs must be positive".to_string(),
            ));
        }
        if self.signal_timeout_secs == 0 {
            return Err(EnvError::Config(
                "signal_timeout_secs must be positive".to_string(),
            ));
        }
        if self.window_size == 0 {
            return Err(EnvError::Config(
                "window_size must be positive".to_string(),
            ));
        }
        if self.simulator_period_secs == 0 {
            return Err(EnvError::Config(
                "simulator_period_secs must be positive".to_string(),
            ));
        }
        if self.gs_inventory_url.is_empty() {
            return Err(EnvError::Config(
                "gs_inventory_url must be set (use \"local\" for the simulator)".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether this run uses the local demand simulator.
    pub fn uses_local_signal(&self) -> bool {
        self.gs_inventory_url == LOCAL_SIGNAL
    }

    /// Width of the observation feature vector for this config.
    pub fn feature_width(&self) -> usize {
        2 * self.window_size + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = RunConfig::default();
        config.validate().unwrap();
        assert!(config.uses_local_signal());
        assert_eq!(config.feature_width(), 15);
    }

    #[test]
    fn parse_minimal_toml() {
        let toml_str = r#"
min_servers = 10
max_servers = 100
gs_inventory_url = "http://inventory.internal/demand"
"#;
        let config: RunConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.min_servers, 10);
        assert!(!config.uses_local_signal());
        // Unspecified fields keep their defaults.
        assert_eq!(config.learning_freq_secs, 60);
        config.validate().unwrap();
    }

    #[test]
    fn toml_round_trip() {
        let config = RunConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        let back: RunConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(back.max_servers, config.max_servers);
        assert_eq!(back.gs_inventory_url, config.gs_inventory_url);
    }

    #[test]
    fn rejects_inverted_server_bounds() {
        let config = RunConfig {
            min_servers: 50,
            max_servers: 10,
            ..RunConfig::default()
        };
        assert!(matches!(config.validate(), Err(EnvError::Config(_))));
    }

    #[test]
    fn rejects_non_positive_factors() {
        let config = RunConfig {
            action_factor: 0.0,
            ..RunConfig::default()
        };
        assert!(config.validate().is_err());

        let config = RunConfig {
            over_prov_factor: -1.0,
            ..RunConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_gamma_outside_unit_interval() {
        let config = RunConfig {
            gamma: 1.5,
            ..RunConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_cadence() {
        // A zero tick cadence would freeze logical time, so an episode
        // could never reach its duration.
        let config = RunConfig {
            learning_freq_secs: 0,
            ..RunConfig::default()
        };
        assert!(matches!(config.validate(), Err(EnvError::Config(_))));
    }

    #[test]
    fn rejects_zero_signal_timeout() {
        let config = RunConfig {
            signal_timeout_secs: 0,
            ..RunConfig::default()
        };
        assert!(matches!(config.validate(), Err(EnvError::Config(_))));
    }

    #[test]
    fn rejects_zero_window() {
        let config = RunConfig {
            window_size: 0,
            ..RunConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
