//! Records, sinks and summaries for powsim runs
//!
//! The driver hands every tick's [`TickReport`] and every boundary's
//! [`PeriodSummary`] to a [`RecordSink`]. Sinks provided here write the
//! record stream as text ([`LineWriterSink`]), collect it
//! ([`Vec<TickRecord>`], [`RunRecorder`]) or drop it ([`NullSink`]).

pub mod error;
pub mod export;
pub mod record;
pub mod recorder;
pub mod sink;

pub use error::MetricsError;
pub use export::{export_csv, export_json, RunExporter};
pub use record::{PeriodSummary, TickDetail, TickRecord, TickReport, TimeToConnect};
pub use recorder::{RunRecorder, RunSummary};
pub use sink::{LineWriterSink, NullSink, RecordSink};
