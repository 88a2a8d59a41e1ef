//! fleetscale-env — the capacity-control decision environment.
//!
//! One [`EpisodeController`] drives one bounded control loop: per tick
//! it pulls a demand sample, maps the policy's normalized action into
//! a clipped server count, records both into a fixed-width observation
//! window, scores the transition, and publishes best-effort telemetry.
//!
//! The policy itself lives outside this crate: callers hand `step` a
//! scalar in [0, 1] and get back an observation/reward pair, which is
//! the seam where an RL optimizer, a fixed heuristic, or a human
//! operator can be substituted.
//!
//! # Reward shape
//!
//! ```text
//! deficit = max(0, demand - servers)     // players waiting
//! surplus = max(0, servers - demand)     // idle compute
//! reward  = -deficit - surplus / over_prov_factor
//! ```
//!
//! Shortfalls cost a full unit each; surpluses are softened by the
//! over-provisioning factor, so the optimum sits at parity but errs
//! toward spare capacity.

pub mod action;
pub mod episode;
pub mod observation;
pub mod reward;

pub use action::ActionMapper;
pub use episode::EpisodeController;
pub use observation::ObservationBuffer;
pub use reward::RewardModel;
