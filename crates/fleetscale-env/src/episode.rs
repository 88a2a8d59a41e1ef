//! Episode lifecycle state machine.
//!
//! `Uninitialized → Running → Done`, driven by `reset` and `step`.
//! One controller owns one observation window and one episode state;
//! nothing is shared, so independent controllers (one per fleet or
//! region) can run in parallel tasks.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use fleetscale_core::{
    ActionRecord, DemandSample, EnvError, EnvResult, Phase, RunConfig, StepInfo, StepOutcome,
};
use fleetscale_signal::DemandSource;
use fleetscale_telemetry::{TelemetrySink, metric};

use crate::action::ActionMapper;
use crate::observation::ObservationBuffer;
use crate::reward::RewardModel;

/// Drives one bounded control-loop episode at a fixed cadence.
///
/// The caller (an external policy-execution loop) calls `reset` once,
/// then `step` once per tick with a normalized action; the controller
/// owns timing, demand ingestion, action mapping, reward, termination,
/// and telemetry. The cadence wait inside `step` is the loop's only
/// intentional suspension point, so cancelling between `step` calls
/// never leaves an action half-applied.
pub struct EpisodeController {
    config: RunConfig,
    source: DemandSource,
    sink: Arc<dyn TelemetrySink>,
    window: ObservationBuffer,
    mapper: ActionMapper,
    reward: RewardModel,
    phase: Phase,
    step_index: u64,
    elapsed_secs: u64,
    /// Deadline of the next tick; carried across steps so per-tick
    /// work does not accumulate drift.
    next_tick: Option<Instant>,
}

impl EpisodeController {
    /// Assemble a controller from an already-validated configuration.
    pub fn new(config: RunConfig, source: DemandSource, sink: Arc<dyn TelemetrySink>) -> Self {
        let window = ObservationBuffer::new(config.window_size, config.action_factor);
        let mapper = ActionMapper::from_config(&config);
        let reward = RewardModel::from_config(&config);
        Self {
            config,
            source,
            sink,
            window,
            mapper,
            reward,
            phase: Phase::Uninitialized,
            step_index: 0,
            elapsed_secs: 0,
            next_tick: None,
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Logical episode time elapsed so far, in seconds.
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    /// Width of every observation this controller returns.
    pub fn observation_width(&self) -> usize {
        self.window.feature_width()
    }

    /// Discount factor for the external optimizer. Unused by the loop.
    pub fn gamma(&self) -> f64 {
        self.config.gamma
    }

    /// Begin a new episode, returning the first (zero-filled)
    /// observation.
    ///
    /// Valid from any phase; a reset mid-episode abandons the episode
    /// in progress.
    pub fn reset(&mut self) -> Vec<f64> {
        debug!(
            previous_phase = ?self.phase,
            steps_taken = self.step_index,
            "episode reset"
        );
        self.window.clear();
        self.phase = Phase::Running;
        self.step_index = 0;
        self.elapsed_secs = 0;
        self.next_tick = Some(Instant::now() + self.tick_interval());
        self.window.features(0.0)
    }

    /// Advance one tick: wait for the cadence boundary, ingest demand,
    /// apply the action, score it, and report.
    ///
    /// Fails with `EnvError::InvalidState` outside the `Running` phase
    /// and with `EnvError::SignalUnavailable` only when the demand
    /// source fails with no cached sample to fall back on. In both
    /// cases no episode state has been mutated.
    pub async fn step(&mut self, normalized_action: f64) -> EnvResult<StepOutcome> {
        if self.phase != Phase::Running {
            return Err(EnvError::InvalidState {
                expected: Phase::Running,
                actual: self.phase,
            });
        }

        self.wait_for_tick().await;

        // Logical time at this tick's boundary.
        let tick_secs = self.elapsed_secs + self.config.learning_freq_secs;

        let sample = self.source.current_demand(tick_secs).await?;

        let normalized = self.mapper.clamp_normalized(normalized_action);
        let server_count = self.mapper.map(normalized_action);
        let action = ActionRecord {
            epoch_secs: tick_secs,
            normalized,
            server_count,
        };

        self.window.record(sample, action);
        let reward = self.reward.reward(sample.raw_value, server_count);

        self.step_index += 1;
        self.elapsed_secs = tick_secs;

        let done = self.elapsed_secs >= self.config.episode_duration_secs;
        if done {
            self.phase = Phase::Done;
            info!(
                steps = self.step_index,
                elapsed_secs = self.elapsed_secs,
                "episode complete"
            );
        }

        let elapsed_fraction =
            self.elapsed_secs as f64 / self.config.episode_duration_secs as f64;
        let observation = self.window.features(elapsed_fraction);

        let info = StepInfo {
            step_index: self.step_index,
            server_count,
            raw_demand: sample.raw_value,
            signal_stale: sample.stale,
        };

        self.publish_step(&sample, server_count, reward);

        debug!(
            step = self.step_index,
            demand = sample.raw_value,
            servers = server_count,
            reward,
            stale = sample.stale,
            done,
            "tick"
        );

        Ok(StepOutcome {
            observation,
            reward,
            done,
            info,
        })
    }

    /// Sleep until the next cadence boundary, then advance it.
    async fn wait_for_tick(&mut self) {
        let interval = self.tick_interval();
        if interval.is_zero() {
            return;
        }
        // reset() always seeds next_tick before the phase allows step.
        let deadline = self.next_tick.unwrap_or_else(Instant::now);
        tokio::time::sleep_until(deadline).await;
        self.next_tick = Some(deadline + interval);
    }

    fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.config.learning_freq_secs)
    }

    /// Best-effort metric export. Failures are logged and swallowed;
    /// observability never fails a tick.
    fn publish_step(&self, sample: &DemandSample, server_count: u32, reward: f64) {
        let namespace = &self.config.telemetry_namespace;
        let points = [
            (metric::STEP_REWARD, reward),
            (metric::SERVER_COUNT, server_count as f64),
            (metric::RAW_DEMAND, sample.raw_value),
            (metric::SIGNAL_STALE, if sample.stale { 1.0 } else { 0.0 }),
        ];
        for (name, value) in points {
            if let Err(e) = self.sink.publish(namespace, name, value) {
                warn!(%namespace, metric = name, error = %e, "telemetry publish failed");
            }
        }
    }
}
