//! Export of recorded runs
//!
//! CSV for the raw record stream and period summaries, JSON for the run
//! summary. Both read from a finished [`RunRecorder`].

pub mod csv;
pub mod json;

use crate::error::MetricsError;
use crate::recorder::RunRecorder;
use std::path::Path;

/// Trait for exporting a recorded run to different formats
pub trait RunExporter {
    /// Export the run to the configured destination
    fn export(&self, run: &RunRecorder) -> Result<(), MetricsError>;
}

/// Export a run to JSON
///
/// # Example
/// ```no_run
/// use powsim_metrics::RunRecorder;
/// use powsim_metrics::export::export_json;
///
/// let recorder = RunRecorder::new(5400);
/// // ... run a simulation into the recorder ...
/// export_json(&recorder, "results/run.json", true).unwrap();
/// ```
pub fn export_json(
    run: &RunRecorder,
    path: impl AsRef<Path>,
    pretty: bool,
) -> Result<(), MetricsError> {
    json::JsonExporter::new(path.as_ref(), pretty).export(run)
}

/// Export a run to CSV (`{stem}_ticks.csv` and `{stem}_periods.csv`)
///
/// # Example
/// ```no_run
/// use powsim_metrics::RunRecorder;
/// use powsim_metrics::export::export_csv;
///
/// let recorder = RunRecorder::new(5400);
/// export_csv(&recorder, "results/run.csv").unwrap();
/// ```
pub fn export_csv(run: &RunRecorder, path: impl AsRef<Path>) -> Result<(), MetricsError> {
    csv::CsvExporter::new(path.as_ref()).export(run)
}
