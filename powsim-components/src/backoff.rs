//! Effort backoff for retried clients
//!
//! A client that is trimmed from the admission queue comes back with more
//! work done: its effort is raised to the floor if it was below it, and
//! doubled otherwise. [`RetrySchedule`] combines that rule with the time the
//! extra work takes to decide when the retry is presented again.

use powsim_core::{ScenarioConfig, Tick};

/// Doubling backoff with a floor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffortBackoff {
    floor: f64,
}

impl EffortBackoff {
    pub fn new(floor: f64) -> Self {
        Self { floor }
    }

    pub fn floor(&self) -> f64 {
        self.floor
    }

    /// Effort to present on the next attempt.
    ///
    /// Returns the floor for anything below it, twice the effort otherwise.
    pub fn next_effort(&self, effort: f64) -> f64 {
        next_effort(effort, self.floor)
    }
}

/// Free-function form of [`EffortBackoff::next_effort`].
pub fn next_effort(effort: f64, floor: f64) -> f64 {
    if effort < floor {
        floor
    } else {
        2.0 * effort
    }
}

/// Scheduling parameters for clients re-entering through the backlog
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetrySchedule {
    pub backoff: EffortBackoff,
    pub timeout_window: u64,
    pub client_performance_rate: f64,
}

impl RetrySchedule {
    pub fn from_config(config: &ScenarioConfig) -> Self {
        Self {
            backoff: EffortBackoff::new(config.effort_floor),
            timeout_window: config.timeout_window,
            client_performance_rate: config.client_performance_rate,
        }
    }

    /// Ticks needed to compute `effort` units of work
    pub fn work_time(&self, effort: f64) -> f64 {
        effort / self.client_performance_rate
    }

    /// Attempt time of a client trimmed at `tick` that now presents `effort`.
    ///
    /// The client waits out the timeout window before noticing the drop, then
    /// does the additional work.
    pub fn retry_time(&self, tick: Tick, effort: f64) -> f64 {
        tick.as_f64() + self.timeout_window as f64 + self.work_time(effort)
    }
}
