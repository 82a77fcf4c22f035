//! The startup ingestion pass: fetch, parse, reconcile.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{info, warn};

use super::IngestError;
use super::fetcher::ScheduleFetcher;
use super::parser::parse_all;
use super::reconciler::{ReconcileSummary, Reconciler, VehicleStore};

/// Where the schedule comes from.
#[derive(Debug, Clone)]
pub struct ScheduleSource {
    /// Remote location. `None` ingests the local copy only.
    pub url: Option<String>,
    /// Local copy, refreshed by a successful fetch.
    pub local_path: PathBuf,
    pub fetch_timeout: Duration,
}

/// Lifecycle of one ingestion pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestPhase {
    Uninitialized,
    Fetching,
    Parsing,
    Reconciling,
    Ready,
}

impl fmt::Display for IngestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Fetching => "fetching",
            Self::Parsing => "parsing",
            Self::Reconciling => "reconciling",
            Self::Ready => "ready",
        };
        f.write_str(name)
    }
}

/// Result of [`Ingestor::run`].
#[derive(Debug)]
pub struct IngestReport {
    /// `Ready` on success, otherwise the phase that failed.
    pub phase: IngestPhase,
    /// Set when the download failed and a prior local copy was used.
    pub fetch_error: Option<IngestError>,
    pub outcome: Result<ReconcileSummary, IngestError>,
}

impl IngestReport {
    pub const fn is_ready(&self) -> bool {
        matches!(self.phase, IngestPhase::Ready)
    }
}

/// Runs the schedule ingestion state machine once.
pub struct Ingestor<S> {
    source: ScheduleSource,
    reconciler: Reconciler<S>,
    phase: IngestPhase,
}

impl<S: VehicleStore> Ingestor<S> {
    pub const fn new(source: ScheduleSource, store: S) -> Self {
        Self {
            source,
            reconciler: Reconciler::new(store),
            phase: IngestPhase::Uninitialized,
        }
    }

    fn enter(&mut self, phase: IngestPhase) {
        info!(from = %self.phase, to = %phase, "Ingestion phase");
        self.phase = phase;
    }

    fn failed(&self, fetch_error: Option<IngestError>, error: IngestError) -> IngestReport {
        warn!(
            phase = %self.phase,
            error = %error,
            "Schedule ingestion failed; serving existing data"
        );
        IngestReport {
            phase: self.phase,
            fetch_error,
            outcome: Err(error),
        }
    }

    /// Fetch, parse and reconcile. Never fails: errors are logged and
    /// returned in the report, and the store is untouched unless parsing
    /// succeeded.
    pub async fn run(mut self) -> IngestReport {
        self.enter(IngestPhase::Fetching);
        let fetch_error = self.fetch().await.err();
        if let Some(e) = &fetch_error {
            warn!(
                error = %e,
                path = %self.source.local_path.display(),
                "Schedule download failed; using local copy"
            );
        }

        let raw = match tokio::fs::read(&self.source.local_path).await {
            Ok(raw) => raw,
            Err(e) => {
                let error = fetch_error.unwrap_or_else(|| {
                    IngestError::Read(format!("{}: {e}", self.source.local_path.display()))
                });
                return self.failed(None, error);
            }
        };

        self.enter(IngestPhase::Parsing);
        let records = match parse_all(&raw) {
            Ok(records) => records,
            Err(e) => return self.failed(fetch_error, e),
        };
        info!(records = records.len(), "Schedule parsed");

        self.enter(IngestPhase::Reconciling);
        let summary = self.reconciler.reconcile(&records).await;

        self.enter(IngestPhase::Ready);
        IngestReport {
            phase: self.phase,
            fetch_error,
            outcome: Ok(summary),
        }
    }

    async fn fetch(&self) -> Result<(), IngestError> {
        let Some(url) = self.source.url.as_deref() else {
            info!("No schedule URL configured; skipping download");
            return Ok(());
        };
        let fetcher = ScheduleFetcher::new(self.source.fetch_timeout)?;
        fetcher.fetch(url, &self.source.local_path).await?;
        Ok(())
    }
}
