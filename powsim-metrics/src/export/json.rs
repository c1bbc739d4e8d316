//! JSON export of the run summary and period table

use crate::error::MetricsError;
use crate::export::RunExporter;
use crate::record::PeriodSummary;
use crate::recorder::{RunRecorder, RunSummary};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug)]
pub struct JsonExporter {
    path: PathBuf,
    pretty: bool,
}

#[derive(Debug, Serialize)]
struct ExportData<'a> {
    summary: RunSummary,
    periods: &'a [PeriodSummary],
}

impl JsonExporter {
    /// # Arguments
    /// * `path` - Output file path
    /// * `pretty` - Whether to pretty-print the JSON
    pub fn new(path: &Path, pretty: bool) -> Self {
        Self {
            path: path.to_path_buf(),
            pretty,
        }
    }

    /// Render the export document without touching the filesystem
    pub fn render(&self, run: &RunRecorder) -> Result<String, MetricsError> {
        let data = ExportData {
            summary: run.summary(),
            periods: run.periods(),
        };
        let json = if self.pretty {
            serde_json::to_string_pretty(&data)?
        } else {
            serde_json::to_string(&data)?
        };
        Ok(json)
    }
}

impl RunExporter for JsonExporter {
    fn export(&self, run: &RunRecorder) -> Result<(), MetricsError> {
        let json = self.render(run)?;
        let mut file = File::create(&self.path).map_err(|e| {
            MetricsError::ExportError(format!("Failed to create {}: {e}", self.path.display()))
        })?;
        file.write_all(json.as_bytes())?;
        info!(path = %self.path.display(), bytes = json.len(), "Exported run to JSON");
        Ok(())
    }
}
