//! Full-length run under the large sustained flood, printing the record stream
//!
//! Usage: `cargo run --example sustained_flood -- [throughput|max_trimmed|median_trimmed]`
//!
//! Set `RUST_LOG=powsim=debug` for per-tick logs on stderr.

use powsim::metrics::{export_csv, export_json};
use powsim::prelude::*;
use powsim_metrics::{MetricsError, PeriodSummary, RecordSink, TickReport};
use std::io::{self, BufWriter};

/// Forwards each tick to two sinks
struct Tee<'a>(&'a mut dyn RecordSink, &'a mut dyn RecordSink);

impl RecordSink for Tee<'_> {
    fn record_tick(&mut self, report: &TickReport) -> Result<(), MetricsError> {
        self.0.record_tick(report)?;
        self.1.record_tick(report)
    }

    fn record_period(&mut self, summary: &PeriodSummary) -> Result<(), MetricsError> {
        self.0.record_period(summary)?;
        self.1.record_period(summary)
    }

    fn finish(&mut self) -> Result<(), MetricsError> {
        self.0.finish()?;
        self.1.finish()
    }
}

fn parse_recommender(arg: Option<String>) -> RecommenderKind {
    match arg.as_deref() {
        Some("max_trimmed") => RecommenderKind::MaxTrimmed,
        Some("median_trimmed") => RecommenderKind::MedianTrimmed,
        _ => RecommenderKind::Throughput,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    powsim::core::init_simulation_logging();

    let recommender = parse_recommender(std::env::args().nth(1));
    let config = ScenarioConfig::default().with_recommender(recommender);
    let mut sim = Simulation::new(config)?;

    let mut lines = LineWriterSink::new(BufWriter::new(io::stdout().lock()));
    let mut recorder = RunRecorder::new(sim.queue().capacity());
    sim.run(&mut Tee(&mut lines, &mut recorder))?;

    let summary = recorder.summary();
    eprintln!(
        "served {} legitimate / {} attackers, mean time-to-connect {:?}, p99 {:?}",
        summary.served_legitimate, summary.served_attackers, summary.ttc_mean, summary.ttc_p99
    );

    let out = std::env::temp_dir().join("powsim_sustained_flood");
    export_csv(&recorder, out.with_extension("csv"))?;
    export_json(&recorder, out.with_extension("json"), true)?;
    eprintln!("results written next to {}", out.display());
    Ok(())
}
