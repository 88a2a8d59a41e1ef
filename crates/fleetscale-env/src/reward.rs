//! Transition scoring.

use fleetscale_core::RunConfig;

/// Asymmetric deficit/surplus penalty.
///
/// A shortfall (demand above the provisioned count) costs one reward
/// unit per missing server, since player-facing wait is the expensive
/// side. A surplus costs `1 / over_prov_factor` per idle server, which
/// still discourages runaway over-allocation. Reward is zero exactly
/// at parity and negative everywhere else.
#[derive(Debug, Clone, Copy)]
pub struct RewardModel {
    over_prov_factor: f64,
}

impl RewardModel {
    pub fn new(over_prov_factor: f64) -> Self {
        Self { over_prov_factor }
    }

    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(config.over_prov_factor)
    }

    /// Score one tick's transition.
    pub fn reward(&self, demand: f64, server_count: u32) -> f64 {
        let count = server_count as f64;
        let deficit = (demand - count).max(0.0);
        let surplus = (count - demand).max(0.0);
        -deficit - surplus / self.over_prov_factor
    }
}
