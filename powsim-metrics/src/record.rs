//! Per-tick records and per-period summaries
//!
//! [`TickRecord`] is the external interface of a run: one per tick, five
//! fields, in a fixed order. Its `Display` form is the space-separated line
//! the record stream is written as, with `?` standing in for an undefined
//! time-to-connect. [`TickDetail`] and [`PeriodSummary`] carry extra
//! diagnostics for analysis.

use powsim_core::Tick;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mean ticks-to-connect of the legitimate clients served in a tick
///
/// Undefined when no legitimate client was served; serialized as `null` and
/// displayed as `?`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeToConnect(Option<f64>);

impl TimeToConnect {
    pub const UNDEFINED_SENTINEL: &'static str = "?";

    pub fn undefined() -> Self {
        TimeToConnect(None)
    }

    /// Mean of `total_wait` over `served` clients, undefined for zero clients
    pub fn mean(total_wait: u64, served: usize) -> Self {
        if served == 0 {
            TimeToConnect(None)
        } else {
            TimeToConnect(Some(total_wait as f64 / served as f64))
        }
    }

    pub fn value(&self) -> Option<f64> {
        self.0
    }

    pub fn is_defined(&self) -> bool {
        self.0.is_some()
    }
}

impl fmt::Display for TimeToConnect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(ticks) => write!(f, "{ticks}"),
            None => f.write_str(Self::UNDEFINED_SENTINEL),
        }
    }
}

/// One entry of the record stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickRecord {
    pub tick: Tick,
    /// Effort published during this tick
    pub descriptor_effort: f64,
    /// Admission queue size before trimming
    pub queue_len: usize,
    /// Legitimate clients served this tick
    pub served_legitimate: usize,
    pub time_to_connect: TimeToConnect,
}

impl fmt::Display for TickRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.tick,
            self.descriptor_effort,
            self.queue_len,
            self.served_legitimate,
            self.time_to_connect
        )
    }
}

/// Diagnostics collected alongside a [`TickRecord`]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TickDetail {
    /// Backlog size at the end of the tick
    pub backlog_len: usize,
    /// Clients presented to the queue this tick (attackers, released backlog, direct admissions)
    pub presented: usize,
    pub attackers_presented: usize,
    /// Mean effort of the presented clients
    pub mean_presented_effort: Option<f64>,
    pub trimmed: usize,
    pub expired: usize,
    pub served_attackers: usize,
    /// Individual waits of the legitimate clients served this tick
    pub legitimate_waits: Vec<u64>,
}

/// Everything the driver reports for one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub record: TickRecord,
    pub detail: TickDetail,
}

/// Statistics of an update period, taken at the boundary that closes it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    /// Index of the boundary (`tick / update_period`)
    pub index: u64,
    pub tick: Tick,
    /// Effort published at this boundary
    pub descriptor_effort: f64,
    pub handled: usize,
    pub handled_legitimate: usize,
    pub backlog_len: usize,
    pub trimmed: usize,
}

impl PeriodSummary {
    /// Whether the closed period served no legitimate client at all
    pub fn is_starved(&self) -> bool {
        self.index > 0 && self.handled_legitimate == 0
    }
}
