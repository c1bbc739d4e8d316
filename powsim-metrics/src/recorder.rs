//! In-memory collection of a whole run
//!
//! [`RunRecorder`] is a [`RecordSink`] that keeps every tick record and
//! period summary and aggregates the legitimate time-to-connect distribution
//! in an HDR histogram, so a [`RunSummary`] can be produced at the end.

use crate::error::MetricsError;
use crate::record::{PeriodSummary, TickRecord, TickReport};
use crate::sink::RecordSink;
use hdrhistogram::Histogram;
use powsim_core::Tick;
use serde::{Deserialize, Serialize};

/// Upper bound of the time-to-connect histogram, in ticks
const TTC_HISTOGRAM_MAX_TICKS: u64 = 1_000_000;

/// Aggregate view of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub ticks: u64,
    pub first_tick: Option<Tick>,
    pub last_tick: Option<Tick>,
    pub served_legitimate: u64,
    pub served_attackers: u64,
    pub trimmed: u64,
    pub expired: u64,
    /// Fraction of served clients that were legitimate
    pub legitimate_share: Option<f64>,
    pub ttc_mean: Option<f64>,
    pub ttc_p50: Option<u64>,
    pub ttc_p99: Option<u64>,
    pub ttc_max: Option<u64>,
    pub max_descriptor_effort: f64,
    /// Ticks whose pre-trim queue size reached capacity
    pub saturated_ticks: u64,
    pub periods: usize,
    /// Closed periods that served no legitimate client
    pub starved_periods: usize,
}

#[derive(Debug)]
pub struct RunRecorder {
    queue_capacity: usize,
    records: Vec<TickRecord>,
    periods: Vec<PeriodSummary>,
    ttc_hist: Option<Histogram<u64>>,
    ttc_sum: u64,
    served_legitimate: u64,
    served_attackers: u64,
    trimmed: u64,
    expired: u64,
    saturated_ticks: u64,
}

impl RunRecorder {
    /// `queue_capacity` is used to count saturated ticks.
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            queue_capacity,
            records: Vec::new(),
            periods: Vec::new(),
            ttc_hist: Histogram::<u64>::new_with_bounds(1, TTC_HISTOGRAM_MAX_TICKS, 3).ok(),
            ttc_sum: 0,
            served_legitimate: 0,
            served_attackers: 0,
            trimmed: 0,
            expired: 0,
            saturated_ticks: 0,
        }
    }

    pub fn records(&self) -> &[TickRecord] {
        &self.records
    }

    pub fn periods(&self) -> &[PeriodSummary] {
        &self.periods
    }

    pub fn into_records(self) -> Vec<TickRecord> {
        self.records
    }

    pub fn summary(&self) -> RunSummary {
        let served_total = self.served_legitimate + self.served_attackers;
        let legitimate_share = (served_total > 0)
            .then(|| self.served_legitimate as f64 / served_total as f64);
        let ttc_mean = (self.served_legitimate > 0)
            .then(|| self.ttc_sum as f64 / self.served_legitimate as f64);
        let quantile = |q: f64| {
            self.ttc_hist
                .as_ref()
                .filter(|h| !h.is_empty())
                .map(|h| h.value_at_quantile(q))
        };

        RunSummary {
            ticks: self.records.len() as u64,
            first_tick: self.records.first().map(|r| r.tick),
            last_tick: self.records.last().map(|r| r.tick),
            served_legitimate: self.served_legitimate,
            served_attackers: self.served_attackers,
            trimmed: self.trimmed,
            expired: self.expired,
            legitimate_share,
            ttc_mean,
            ttc_p50: quantile(0.5),
            ttc_p99: quantile(0.99),
            ttc_max: self
                .ttc_hist
                .as_ref()
                .filter(|h| !h.is_empty())
                .map(|h| h.max()),
            max_descriptor_effort: self
                .records
                .iter()
                .map(|r| r.descriptor_effort)
                .fold(0.0, f64::max),
            saturated_ticks: self.saturated_ticks,
            periods: self.periods.len(),
            starved_periods: self.periods.iter().filter(|p| p.is_starved()).count(),
        }
    }
}

impl RecordSink for RunRecorder {
    fn record_tick(&mut self, report: &TickReport) -> Result<(), MetricsError> {
        let detail = &report.detail;
        self.served_legitimate += report.record.served_legitimate as u64;
        self.served_attackers += detail.served_attackers as u64;
        self.trimmed += detail.trimmed as u64;
        self.expired += detail.expired as u64;
        if report.record.queue_len >= self.queue_capacity {
            self.saturated_ticks += 1;
        }
        for &wait in &detail.legitimate_waits {
            self.ttc_sum += wait;
            if let Some(hist) = self.ttc_hist.as_mut() {
                hist.saturating_record(wait);
            }
        }
        self.records.push(report.record.clone());
        Ok(())
    }

    fn record_period(&mut self, summary: &PeriodSummary) -> Result<(), MetricsError> {
        self.periods.push(summary.clone());
        Ok(())
    }
}
