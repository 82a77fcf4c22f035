//! Startup ingestion of the vehicle schedule file.
//!
//! The pipeline fetches the remote flat file to a local path, parses it
//! fail-closed and merges the records into the vehicle store without
//! overwriting existing bus numbers. Every failure here is logged and
//! recovered; the server starts regardless.

pub mod fetcher;
pub mod parser;
pub mod pipeline;
pub mod reconciler;

pub use fetcher::ScheduleFetcher;
pub use parser::{ScheduleRecords, parse, parse_all};
pub use pipeline::{IngestPhase, IngestReport, Ingestor, ScheduleSource};
pub use reconciler::{ReconcileSummary, Reconciler, VehicleStore};

/// Ingestion failures.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Network failure or non-success HTTP status.
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// The fetched bytes could not be persisted locally.
    #[error("Write failed: {0}")]
    Write(String),

    /// No local schedule copy could be read.
    #[error("Read failed: {0}")]
    Read(String),

    /// A line of the schedule file is malformed.
    #[error("Parse error on line {line}, field '{field}': {reason}")]
    Parse {
        line: usize,
        field: &'static str,
        reason: String,
    },
}
