//! Structured logging for admission-control simulations
//!
//! # Controlling terminal output
//!
//! ```rust
//! use powsim_core::logging::init_simulation_logging_with_level;
//! init_simulation_logging_with_level("debug");
//! ```
//!
//! `RUST_LOG` always wins over the level passed in code:
//!
//! ```bash
//! RUST_LOG=powsim=debug cargo run --example sustained_flood
//! RUST_LOG=powsim_components=trace cargo run --example precomputed_burst
//! ```
//!
//! ## Log level guidelines
//! - **TRACE**: individual clients (trimmed, expired)
//! - **DEBUG**: per-tick progress and queue saturation
//! - **INFO**: run start/finish, effort updates and period summaries
//! - **WARN**: update periods in which no legitimate client was served
//!
//! The initializers use `try_init`, so calling them more than once (for
//! example from several tests) is harmless.

use crate::Tick;
use tracing::{debug, info, trace, warn, Span};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging for the simulation at INFO
pub fn init_simulation_logging() {
    init_simulation_logging_with_level("info")
}

/// Initialize logging with a specific level
///
/// # Arguments
/// * `level` - Log level: "trace", "debug", "info", "warn", or "error"
pub fn init_simulation_logging_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("{level},powsim_core={level},powsim_components={level},powsim_metrics={level}")
            .into()
    });

    let installed = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter)
        .try_init()
        .is_ok();

    if installed {
        info!("Simulation logging initialized at level: {}", level);
    }
}

/// Initialize very verbose, pretty-printed logging for debugging a scenario
pub fn init_detailed_simulation_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "trace,powsim_components=trace,powsim_metrics=debug".into());

    let installed = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_file(true)
                .with_line_number(true)
                .pretty(),
        )
        .with(filter)
        .try_init()
        .is_ok();

    if installed {
        info!("Detailed simulation logging initialized");
    }
}

/// Span covering a whole run
pub fn simulation_span(name: &str) -> Span {
    tracing::info_span!("simulation", name = name)
}

/// Span covering one tick of the driver loop
pub fn tick_span(tick: Tick) -> Span {
    tracing::debug_span!("tick", tick = tick.as_u64())
}

/// Span covering one update period
pub fn period_span(index: u64) -> Span {
    tracing::debug_span!("period", index = index)
}

/// Logging utilities for common simulation events
pub mod events {
    use super::*;

    pub fn simulation_started(name: &str, ticks: u64, queue_capacity: usize) {
        info!(
            simulation = name,
            ticks = ticks,
            queue_capacity = queue_capacity,
            "Simulation started"
        );
    }

    pub fn simulation_completed(name: &str, final_tick: Tick, served_legitimate: u64) {
        info!(
            simulation = name,
            final_tick = final_tick.as_u64(),
            served_legitimate = served_legitimate,
            "Simulation completed"
        );
    }

    /// Log a new published effort
    pub fn effort_updated(tick: Tick, policy: &str, previous: f64, current: f64) {
        info!(
            tick = tick.as_u64(),
            policy = policy,
            previous = previous,
            current = current,
            "Descriptor effort updated"
        );
    }

    /// Log the statistics of the period that just ended
    pub fn period_summary(
        tick: Tick,
        handled: usize,
        legitimate: usize,
        backlog: usize,
        trimmed: usize,
    ) {
        info!(
            tick = tick.as_u64(),
            handled = handled,
            legitimate = legitimate,
            backlog = backlog,
            trimmed = trimmed,
            "Update period closed"
        );
    }

    pub fn client_trimmed(tick: Tick, effort: f64, attacker: bool) {
        trace!(
            tick = tick.as_u64(),
            effort = effort,
            attacker = attacker,
            "Client trimmed from admission queue"
        );
    }

    pub fn client_expired(tick: Tick, deadline: f64) {
        trace!(
            tick = tick.as_u64(),
            deadline = deadline,
            "Client expired before service"
        );
    }
}

/// Logging utilities for unusual conditions
pub mod diagnostics {
    use super::*;

    /// The queue held more clients than its capacity before trimming
    pub fn queue_saturated(tick: Tick, queue_len: usize, capacity: usize) {
        debug!(
            tick = tick.as_u64(),
            queue_len = queue_len,
            capacity = capacity,
            "Admission queue over capacity"
        );
    }

    /// A whole update period went by without serving a legitimate client
    pub fn legitimate_starvation(tick: Tick, handled: usize) {
        warn!(
            tick = tick.as_u64(),
            handled = handled,
            "No legitimate client served during the last update period"
        );
    }
}
