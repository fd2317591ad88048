//! Proxy crawler module for fetching candidate proxies from a directory page

use crate::config::CrawlConfig;
use crate::error::Result;
use crate::proxy::models::Endpoint;
use crate::proxy::source::{extractor_for, EndpointExtractor};
use crate::proxy::transport::Transport;
use std::sync::Arc;
use tracing::{debug, warn};

/// Fetches the proxy directory and extracts candidate endpoints from it
#[derive(Clone)]
pub struct ProxyCrawler<T> {
    transport: T,
    source_url: String,
    extractor: Arc<dyn EndpointExtractor>,
}

impl<T: Transport> ProxyCrawler<T> {
    pub fn new(transport: T, source_url: &str, extractor: Arc<dyn EndpointExtractor>) -> Self {
        Self {
            transport,
            source_url: source_url.to_string(),
            extractor,
        }
    }

    /// Create a crawler for the source configured in `config`
    pub fn from_config(transport: T, config: &CrawlConfig) -> Self {
        Self::new(
            transport,
            &config.proxy_source_url,
            extractor_for(config.source_format),
        )
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// Fetch the directory page and return its candidates
    ///
    /// The directory is fetched directly, never through a proxy. A non-200
    /// page is still parsed since some directories answer with error codes
    /// while serving the list.
    pub async fn crawl(&self) -> Result<Vec<Endpoint>> {
        let page = self.transport.get(&self.source_url, None).await?;
        if !page.is_ok() {
            warn!(
                "Proxy source \"{}\" answered with status code {}",
                self.source_url, page.status
            );
        }

        let candidates = self.extractor.extract(&page.body);
        debug!(
            "Extracted {} candidate proxies from \"{}\"",
            candidates.len(),
            self.source_url
        );
        Ok(candidates)
    }
}
