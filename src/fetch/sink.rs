//! Destinations for fetched documents and fetch events

use crate::error::Result;
use crate::fetch::outcome::FetchOutcome;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Stores a document addressed by its ID
///
/// Called from several workers at once; saving the same ID twice overwrites.
pub trait DocumentSink: Send + Sync {
    fn save(&self, id: i64, content: &str) -> Result<()>;
}

/// Receives every per-ID outcome
pub trait EventSink: Send + Sync {
    fn notify(&self, outcome: &FetchOutcome);
}

/// Writes each document to `{dir}/{id}.html`
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    /// Use `dir`, creating it if missing
    pub fn create<P: AsRef<Path>>(dir: P) -> Result<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
        })
    }

    pub fn path_for(&self, id: i64) -> PathBuf {
        self.dir.join(format!("{id}.html"))
    }
}

impl DocumentSink for FileSink {
    fn save(&self, id: i64, content: &str) -> Result<()> {
        fs::write(self.path_for(id), content)?;
        Ok(())
    }
}

/// Logs outcomes through `tracing`, inside the caller's worker span
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn notify(&self, outcome: &FetchOutcome) {
        match outcome {
            FetchOutcome::Saved(id) => info!(id, "Document saved"),
            FetchOutcome::NotFound { id, status } => info!(
                id,
                "Document is not available, response status code - {}", status
            ),
            FetchOutcome::ProxyRejected { id, proxy, status } => info!(
                id,
                %proxy,
                "Failed to download document; Response status code - {}", status
            ),
            FetchOutcome::NetworkError { id, reason } => error!(
                id,
                "An error occurred while downloading document: {}", reason
            ),
            FetchOutcome::SaveFailed { id, reason } => {
                error!(id, "Failed to save document: {}", reason)
            }
        }
    }
}
