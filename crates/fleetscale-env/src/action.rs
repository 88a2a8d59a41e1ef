//! Normalized action → integer server count.

use fleetscale_core::RunConfig;

/// Maps a policy's normalized output into an actionable fleet size.
///
/// A misbehaving policy must not crash the loop, so inputs outside
/// [0, 1] (including NaN and infinities) are clamped rather than
/// rejected. The over-provisioning factor is deliberately absent here:
/// it is a reward-side weight, which lets the same policy output be
/// evaluated under different cost trade-offs without retraining.
#[derive(Debug, Clone, Copy)]
pub struct ActionMapper {
    min_servers: u32,
    max_servers: u32,
    action_factor: f64,
}

impl ActionMapper {
    pub fn new(min_servers: u32, max_servers: u32, action_factor: f64) -> Self {
        Self {
            min_servers,
            max_servers,
            action_factor,
        }
    }

    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(config.min_servers, config.max_servers, config.action_factor)
    }

    /// Clamp a raw policy output into [0, 1]. Non-finite values map to 0.
    pub fn clamp_normalized(&self, normalized: f64) -> f64 {
        if normalized.is_finite() {
            normalized.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Map a (possibly out-of-range) normalized action to a server
    /// count in [min_servers, max_servers].
    pub fn map(&self, normalized: f64) -> u32 {
        let raw = self.clamp_normalized(normalized) * self.action_factor;
        (raw.round() as u32).clamp(self.min_servers, self.max_servers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> ActionMapper {
        ActionMapper::new(10, 100, 100.0)
    }

    #[test]
    fn worked_example_from_docs() {
        // 0.55 * 100 = 55, inside [10, 100].
        assert_eq!(mapper().map(0.55), 55);
    }

    #[test]
    fn clips_to_min() {
        assert_eq!(mapper().map(0.0), 10);
        assert_eq!(mapper().map(0.03), 10);
    }

    #[test]
    fn clips_to_max() {
        let m = ActionMapper::new(10, 80, 100.0);
        assert_eq!(m.map(1.0), 80);
    }

    #[test]
    fn out_of_range_inputs_are_clamped() {
        assert_eq!(mapper().map(-3.0), 10);
        assert_eq!(mapper().map(42.0), 100);
    }

    #[test]
    fn non_finite_inputs_map_to_min() {
        // Non-finite is treated as 0.0, not clamped to 1.0.
        assert_eq!(mapper().map(f64::NAN), 10);
        assert_eq!(mapper().map(f64::INFINITY), 10);
        assert_eq!(mapper().map(f64::NEG_INFINITY), 10);
    }

    #[test]
    fn output_always_in_bounds() {
        let m = mapper();
        for input in [
            -1e18, -1.0, -0.001, 0.0, 0.25, 0.5, 0.999, 1.0, 1.5, 1e18,
            f64::NAN, f64::INFINITY, f64::NEG_INFINITY,
        ] {
            let count = m.map(input);
            assert!((10..=100).contains(&count), "input {input} gave {count}");
        }
    }

    #[test]
    fn rounds_to_nearest() {
        assert_eq!(mapper().map(0.554), 55);
        assert_eq!(mapper().map(0.556), 56);
    }
}
