//! CSV export
//!
//! Writes two files next to the given path:
//! - `{stem}_ticks.csv` - the record stream, one row per tick
//! - `{stem}_periods.csv` - one row per update-period boundary

use crate::error::MetricsError;
use crate::export::RunExporter;
use crate::record::{PeriodSummary, TickRecord};
use crate::recorder::RunRecorder;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug)]
pub struct CsvExporter {
    path: PathBuf,
}

impl CsvExporter {
    /// `path` is a base path; the stem gets a suffix per file.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Get the path for a specific CSV file
    pub fn path_for(&self, suffix: &str) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("run");
        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        parent.join(format!("{stem}_{suffix}.csv"))
    }

    fn create(&self, suffix: &str) -> Result<BufWriter<File>, MetricsError> {
        let path = self.path_for(suffix);
        File::create(&path).map(BufWriter::new).map_err(|e| {
            MetricsError::ExportError(format!("Failed to create {}: {e}", path.display()))
        })
    }

    fn export_ticks(&self, records: &[TickRecord]) -> Result<(), MetricsError> {
        let mut file = self.create("ticks")?;
        writeln!(
            file,
            "tick,descriptor_effort,queue_len,served_legitimate,time_to_connect"
        )?;
        for r in records {
            writeln!(
                file,
                "{},{},{},{},{}",
                r.tick, r.descriptor_effort, r.queue_len, r.served_legitimate, r.time_to_connect
            )?;
        }
        file.flush()?;
        Ok(())
    }

    fn export_periods(&self, periods: &[PeriodSummary]) -> Result<(), MetricsError> {
        let mut file = self.create("periods")?;
        writeln!(
            file,
            "index,tick,descriptor_effort,handled,handled_legitimate,backlog_len,trimmed"
        )?;
        for p in periods {
            writeln!(
                file,
                "{},{},{},{},{},{},{}",
                p.index,
                p.tick,
                p.descriptor_effort,
                p.handled,
                p.handled_legitimate,
                p.backlog_len,
                p.trimmed
            )?;
        }
        file.flush()?;
        Ok(())
    }
}

impl RunExporter for CsvExporter {
    fn export(&self, run: &RunRecorder) -> Result<(), MetricsError> {
        self.export_ticks(run.records())?;
        self.export_periods(run.periods())?;
        info!(
            ticks = %self.path_for("ticks").display(),
            periods = %self.path_for("periods").display(),
            "Exported run to CSV"
        );
        Ok(())
    }
}
