//! Rolling observation window and feature flattening.

use std::collections::VecDeque;

use fleetscale_core::{ActionRecord, DemandSample};

/// Fixed-capacity FIFO window over the most recent K
/// (demand, action) pairs, flattened into a constant-width feature
/// vector for the policy.
///
/// # Flattening convention
///
/// With capacity K the vector has `2K + 1` entries (15 at the default
/// K = 7):
///
/// ```text
/// [ demand_0 .. demand_{K-1},      // raw demand / demand_scale, oldest first
///   action_0 .. action_{K-1},      // normalized actions, oldest first
///   elapsed_fraction ]             // episode progress in [0, 1]
/// ```
///
/// Before warm-up the leading slots of each block are zero-filled, so
/// the width never changes within a run.
#[derive(Debug, Clone)]
pub struct ObservationBuffer {
    window: VecDeque<(DemandSample, ActionRecord)>,
    capacity: usize,
    /// Divisor bringing raw demand into roughly [0, 1]; the action
    /// factor, since it bounds the servable demand.
    demand_scale: f64,
}

impl ObservationBuffer {
    pub fn new(capacity: usize, demand_scale: f64) -> Self {
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            demand_scale: if demand_scale > 0.0 { demand_scale } else { 1.0 },
        }
    }

    /// Append one tick's pair, evicting the oldest past capacity.
    pub fn record(&mut self, sample: DemandSample, action: ActionRecord) {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back((sample, action));
    }

    /// Drop all recorded pairs (episode reset).
    pub fn clear(&mut self) {
        self.window.clear();
    }

    /// Number of pairs currently held.
    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Width of the vector `features` returns, constant per buffer.
    pub fn feature_width(&self) -> usize {
        2 * self.capacity + 1
    }

    /// Flatten the window into the fixed-width feature vector.
    ///
    /// Deterministic given the buffer contents and `elapsed_fraction`.
    pub fn features(&self, elapsed_fraction: f64) -> Vec<f64> {
        let k = self.capacity;
        let mut features = vec![0.0; self.feature_width()];
        let pad = k - self.window.len();
        for (i, (sample, action)) in self.window.iter().enumerate() {
            features[pad + i] = sample.raw_value / self.demand_scale;
            features[k + pad + i] = action.normalized;
        }
        features[2 * k] = elapsed_fraction.clamp(0.0, 1.0);
        features
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(epoch: u64, demand: f64, normalized: f64) -> (DemandSample, ActionRecord) {
        (
            DemandSample::fresh(epoch, demand),
            ActionRecord {
                epoch_secs: epoch,
                normalized,
                server_count: (normalized * 100.0).round() as u32,
            },
        )
    }

    #[test]
    fn width_is_constant_from_first_call() {
        let mut buffer = ObservationBuffer::new(7, 100.0);
        assert_eq!(buffer.features(0.0).len(), 15);

        let (s, a) = pair(60, 50.0, 0.5);
        buffer.record(s, a);
        assert_eq!(buffer.features(0.1).len(), 15);
    }

    #[test]
    fn empty_window_is_all_zero_except_elapsed() {
        let buffer = ObservationBuffer::new(7, 100.0);
        let features = buffer.features(0.25);
        assert!(features[..14].iter().all(|&f| f == 0.0));
        assert_eq!(features[14], 0.25);
    }

    #[test]
    fn warm_up_zero_fills_leading_slots() {
        let mut buffer = ObservationBuffer::new(3, 100.0);
        let (s, a) = pair(60, 80.0, 0.4);
        buffer.record(s, a);

        let features = buffer.features(0.0);
        // Demand block: [0, 0, 0.8]; action block: [0, 0, 0.4].
        assert_eq!(&features[..3], &[0.0, 0.0, 0.8]);
        assert_eq!(&features[3..6], &[0.0, 0.0, 0.4]);
    }

    #[test]
    fn fifo_eviction_keeps_most_recent() {
        let mut buffer = ObservationBuffer::new(3, 100.0);
        for (i, demand) in [10.0, 20.0, 30.0, 40.0].iter().enumerate() {
            let (s, a) = pair(i as u64 * 60, *demand, 0.1 * (i as f64 + 1.0));
            buffer.record(s, a);
        }

        assert_eq!(buffer.len(), 3);
        let features = buffer.features(0.0);
        // Oldest (10.0) evicted; window is [20, 30, 40].
        assert_eq!(&features[..3], &[0.2, 0.3, 0.4]);
    }

    #[test]
    fn features_are_deterministic() {
        let mut buffer = ObservationBuffer::new(5, 100.0);
        let (s, a) = pair(60, 73.0, 0.7);
        buffer.record(s, a);
        assert_eq!(buffer.features(0.5), buffer.features(0.5));
    }

    #[test]
    fn clear_empties_the_window() {
        let mut buffer = ObservationBuffer::new(3, 100.0);
        let (s, a) = pair(60, 50.0, 0.5);
        buffer.record(s, a);
        assert!(!buffer.is_empty());

        buffer.clear();
        assert!(buffer.is_empty());
        assert!(buffer.features(0.0)[..6].iter().all(|&f| f == 0.0));
    }

    #[test]
    fn elapsed_fraction_is_clamped() {
        let buffer = ObservationBuffer::new(2, 100.0);
        assert_eq!(buffer.features(7.0)[4], 1.0);
        assert_eq!(buffer.features(-1.0)[4], 0.0);
    }
}
