//! Client entities
//!
//! A [`Client`] is one connection attempt. Legitimate clients perform the
//! published effort before presenting themselves and retry with more effort
//! when trimmed; attackers are injected straight into the admission queue and
//! never retry.

use crate::backoff::RetrySchedule;
use powsim_core::Tick;
use serde::{Deserialize, Serialize};

/// Who generated the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Legitimate,
    Attacker,
}

/// A single connection attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    /// Tick the client first showed up; preserved across retries
    pub arrival_tick: Tick,
    /// Effort attached to the current attempt
    pub effort: f64,
    pub origin: Origin,
    /// Time at which the current attempt is presented to the queue
    pub next_attempt_tick: f64,
}

impl Client {
    /// A client presented to the queue on the tick it arrives
    pub fn arriving(tick: Tick, effort: f64, origin: Origin) -> Self {
        Self {
            arrival_tick: tick,
            effort,
            origin,
            next_attempt_tick: tick.as_f64(),
        }
    }

    pub fn attacker(tick: Tick, effort: f64) -> Self {
        Self::arriving(tick, effort, Origin::Attacker)
    }

    /// A legitimate client that must first spend `work_time` ticks computing
    pub fn working(tick: Tick, effort: f64, work_time: f64) -> Self {
        Self {
            arrival_tick: tick,
            effort,
            origin: Origin::Legitimate,
            next_attempt_tick: tick.as_f64() + work_time,
        }
    }

    pub fn is_attacker(&self) -> bool {
        self.origin == Origin::Attacker
    }

    /// Last moment the current attempt is still worth serving
    pub fn deadline(&self, timeout_window: u64) -> f64 {
        self.next_attempt_tick + timeout_window as f64
    }

    /// Whether the attempt ranks as stale when the queue is trimmed
    pub fn is_timed_out(&self, tick: Tick, timeout_window: u64) -> bool {
        self.deadline(timeout_window) < tick.as_f64()
    }

    /// Whether the client gave up before it could be served at `tick`.
    ///
    /// The window is exclusive at its end: a client whose deadline falls on
    /// the current tick is already gone.
    pub fn is_expired(&self, tick: Tick, timeout_window: u64) -> bool {
        self.deadline(timeout_window) <= tick.as_f64()
    }

    /// Priority used to order the admission queue (higher is served first)
    pub fn trim_priority(&self, tick: Tick, timeout_window: u64) -> f64 {
        if self.is_timed_out(tick, timeout_window) {
            0.0
        } else {
            self.effort
        }
    }

    /// A fresh client for the next attempt after being trimmed at `tick`.
    pub fn retry(&self, tick: Tick, schedule: &RetrySchedule) -> Client {
        let effort = schedule.backoff.next_effort(self.effort);
        Client {
            arrival_tick: self.arrival_tick,
            effort,
            origin: self.origin,
            next_attempt_tick: schedule.retry_time(tick, effort),
        }
    }

    /// Ticks between first arrival and service at `tick`
    pub fn time_to_connect(&self, tick: Tick) -> u64 {
        tick.ticks_since(self.arrival_tick)
    }
}
