//! Range Fetch - parallel document fetcher behind rotating proxies
//!
//! Splits a numbered ID range across a fixed number of workers. Each worker
//! owns a proxy pool seeded from one shared harvest, fetches its IDs in order
//! and evicts proxies that answer with unexpected status codes.

pub mod config;
pub mod error;
pub mod fetch;
pub mod orchestrator;
pub mod partition;
pub mod progress;
pub mod proxy;

#[cfg(test)]
mod testing;

pub use config::{CrawlConfig, SourceFormat};
pub use error::{Error, Result};
pub use fetch::*;
pub use orchestrator::Orchestrator;
pub use partition::{partition, validate_id_range};
pub use progress::{RunProgress, WorkerProgress};
pub use proxy::*;
