//! Proxy module for gathering, validating and rotating proxies
//!
//! This module provides functionality for:
//! - Crawling a proxy directory page to extract candidate endpoints
//! - Checking candidates against a fixed URL before trusting them
//! - Keeping a per-worker pool with random selection, eviction and refresh

pub mod checker;
pub mod crawler;
pub mod models;
pub mod pool;
pub mod source;
pub mod transport;

pub use checker::ProxyChecker;
pub use crawler::ProxyCrawler;
pub use models::{Endpoint, Page};
pub use pool::{EndpointSupply, ProxyHarvester, ProxyPool};
pub use source::{extractor_for, EndpointExtractor, PlainListExtractor, TableExtractor};
pub use transport::{HttpTransport, Transport};
