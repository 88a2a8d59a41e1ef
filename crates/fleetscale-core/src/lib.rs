//! fleetscale-core — shared types for the FleetScale control loop.
//!
//! Holds the domain types exchanged between the demand signal, the
//! decision environment, and the telemetry layer, plus the immutable
//! per-run configuration and the error taxonomy. Everything here is
//! plain data: no I/O, no clocks, no async.

pub mod config;
pub mod error;
pub mod types;

pub use config::RunConfig;
pub use error::{EnvError, EnvResult};
pub use types::*;
