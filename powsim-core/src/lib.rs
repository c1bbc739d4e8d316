//! Core types for the proof-of-work admission-control simulator.
//!
//! This crate holds what every other part of the workspace shares: the
//! discrete [`Tick`] clock, the [`ScenarioConfig`] describing one run, the
//! error types and the structured logging helpers.
//!
//! # Time Model
//!
//! The simulation advances in whole ticks. Clients may schedule attempts at
//! fractional times (work takes `effort / client_performance_rate` ticks), so
//! attempt times are plain `f64` values compared against [`Tick::as_f64`].
//! Nothing in the workspace reads the wall clock, which keeps every run
//! reproducible.

pub mod config;
pub mod error;
pub mod logging;
pub mod time;

pub use config::{AttackConfig, AttackKind, BotnetSize, RecommenderKind, ScenarioConfig};
pub use error::{ConfigError, SimError};
pub use logging::{
    init_detailed_simulation_logging, init_simulation_logging,
    init_simulation_logging_with_level, period_span, simulation_span, tick_span,
};
pub use time::Tick;
