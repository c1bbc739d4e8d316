//! Destinations for the record stream

use crate::error::MetricsError;
use crate::record::{PeriodSummary, TickRecord, TickReport};
use std::io::Write;

/// Receives the output of a run as it is produced
pub trait RecordSink {
    /// Called once per tick, in tick order
    fn record_tick(&mut self, report: &TickReport) -> Result<(), MetricsError>;

    /// Called at every update-period boundary, before that tick's report
    fn record_period(&mut self, _summary: &PeriodSummary) -> Result<(), MetricsError> {
        Ok(())
    }

    /// Called when the executor stops
    fn finish(&mut self) -> Result<(), MetricsError> {
        Ok(())
    }
}

impl RecordSink for Vec<TickRecord> {
    fn record_tick(&mut self, report: &TickReport) -> Result<(), MetricsError> {
        self.push(report.record.clone());
        Ok(())
    }
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl RecordSink for NullSink {
    fn record_tick(&mut self, _report: &TickReport) -> Result<(), MetricsError> {
        Ok(())
    }
}

/// Writes one text line per tick
///
/// Lines follow [`TickRecord`]'s `Display` form, so two runs of the same
/// scenario produce byte-identical output.
#[derive(Debug)]
pub struct LineWriterSink<W: Write> {
    writer: W,
    lines: u64,
}

impl<W: Write> LineWriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, lines: 0 }
    }

    pub fn lines_written(&self) -> u64 {
        self.lines
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for LineWriterSink<W> {
    fn record_tick(&mut self, report: &TickReport) -> Result<(), MetricsError> {
        writeln!(self.writer, "{}", report.record)?;
        self.lines += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), MetricsError> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{TickDetail, TimeToConnect};
    use powsim_core::Tick;

    fn report(tick: u64, served: usize) -> TickReport {
        TickReport {
            record: TickRecord {
                tick: Tick::new(tick),
                descriptor_effort: 1000.0,
                queue_len: 20,
                served_legitimate: served,
                time_to_connect: TimeToConnect::mean(served as u64 * 2, served),
            },
            detail: TickDetail::default(),
        }
    }

    #[test]
    fn test_line_writer_output() {
        let mut sink = LineWriterSink::new(Vec::new());
        sink.record_tick(&report(0, 0)).unwrap();
        sink.record_tick(&report(1, 20)).unwrap();
        sink.finish().unwrap();
        assert_eq!(sink.lines_written(), 2);

        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text, "0 1000 20 0 ?\n1 1000 20 20 2\n");
    }

    #[test]
    fn test_vec_sink_collects_records() {
        let mut records: Vec<TickRecord> = Vec::new();
        records.record_tick(&report(5, 1)).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].tick, Tick::new(5));
    }
}
