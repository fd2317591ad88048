//! Per-ID outcomes and per-worker tallies

use crate::error::Result;
use crate::proxy::models::Endpoint;
use serde::Serialize;
use std::fs;
use std::ops::Range;
use std::path::Path;

/// What happened to one document ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The document was filtered and handed to the save sink
    Saved(i64),
    /// 403 or 404: the document does not exist or is not public
    NotFound { id: i64, status: u16 },
    /// Any other status; the proxy was evicted from the pool
    ProxyRejected { id: i64, proxy: Endpoint, status: u16 },
    /// Timeout, refused connection or DNS failure
    NetworkError { id: i64, reason: String },
    /// The save sink could not store the document
    SaveFailed { id: i64, reason: String },
}

impl FetchOutcome {
    pub fn id(&self) -> i64 {
        match self {
            FetchOutcome::Saved(id)
            | FetchOutcome::NotFound { id, .. }
            | FetchOutcome::ProxyRejected { id, .. }
            | FetchOutcome::NetworkError { id, .. }
            | FetchOutcome::SaveFailed { id, .. } => *id,
        }
    }

    /// Network and storage failures are errors; the rest is expected traffic
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            FetchOutcome::NetworkError { .. } | FetchOutcome::SaveFailed { .. }
        )
    }
}

/// Counts of outcomes for one worker's sub-range
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerReport {
    pub index: usize,
    pub range: Range<i64>,
    pub attempted: usize,
    pub saved: usize,
    pub not_found: usize,
    pub proxy_rejected: usize,
    pub network_errors: usize,
    pub save_failures: usize,
}

impl WorkerReport {
    pub fn new(index: usize, range: Range<i64>) -> Self {
        Self {
            index,
            range,
            attempted: 0,
            saved: 0,
            not_found: 0,
            proxy_rejected: 0,
            network_errors: 0,
            save_failures: 0,
        }
    }

    pub fn record(&mut self, outcome: &FetchOutcome) {
        self.attempted += 1;
        match outcome {
            FetchOutcome::Saved(_) => self.saved += 1,
            FetchOutcome::NotFound { .. } => self.not_found += 1,
            FetchOutcome::ProxyRejected { .. } => self.proxy_rejected += 1,
            FetchOutcome::NetworkError { .. } => self.network_errors += 1,
            FetchOutcome::SaveFailed { .. } => self.save_failures += 1,
        }
    }
}

/// A worker that stopped before the end of its sub-range
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerFailure {
    pub index: usize,
    pub range: Range<i64>,
    pub error: String,
}

/// Result of a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Workers that reached the end of their sub-range, ordered by index
    pub completed: Vec<WorkerReport>,
    /// Workers that failed fatally, ordered by index
    pub failed: Vec<WorkerFailure>,
}

impl RunReport {
    pub fn attempted(&self) -> usize {
        self.completed.iter().map(|w| w.attempted).sum()
    }

    pub fn saved(&self) -> usize {
        self.completed.iter().map(|w| w.saved).sum()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Write the report as pretty-printed JSON
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }
}
