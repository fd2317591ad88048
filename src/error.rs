//! Error types shared by the partitioner, the proxy pool and the orchestrator.

use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid ID range [{first}, {last}): bounds must be non-negative and first <= last")]
    InvalidRange { first: i64, last: i64 },

    #[error("Cannot split a range into zero sub-ranges")]
    InvalidWorkerCount,

    /// No live proxy is left and a refresh could not repopulate the pool.
    #[error("Proxy pool is empty")]
    EmptyPool,

    #[error("Worker panicked on {0}")]
    WorkerPanic(String),

    #[error("Invalid proxy endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Invalid CSS selector: {0}")]
    InvalidSelector(String),

    #[error("Invalid class name: {0:?}")]
    InvalidClass(String),

    #[error("Reqwest Error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Tokio Join Error, couldn't await a worker! {0}")]
    RuntimeJoin(#[from] tokio::task::JoinError),
}
