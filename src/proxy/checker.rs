//! Proxy checker module for checking proxy liveness

use crate::config::CrawlConfig;
use crate::proxy::models::Endpoint;
use crate::proxy::transport::Transport;
use futures::stream::{self, StreamExt};
use std::time::Duration;
use tracing::{error, info};

/// Checks candidates by requesting a fixed URL through them
#[derive(Clone)]
pub struct ProxyChecker<T> {
    transport: T,
    checked_url: String,
    timeout: Duration,
    concurrency: usize,
}

impl<T: Transport> ProxyChecker<T> {
    pub fn new(transport: T, checked_url: &str, timeout: Duration) -> Self {
        Self {
            transport,
            checked_url: checked_url.to_string(),
            timeout,
            concurrency: 1,
        }
    }

    pub fn from_config(transport: T, config: &CrawlConfig) -> Self {
        Self::new(transport, &config.checked_url, config.check_timeout)
            .with_concurrency(config.check_concurrency)
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Whether the checked URL answers 200 through `endpoint`
    ///
    /// The transport keeps nothing for `endpoint` afterwards.
    pub async fn check(&self, endpoint: &Endpoint) -> bool {
        let result = tokio::time::timeout(
            self.timeout,
            self.transport.get(&self.checked_url, Some(endpoint)),
        )
        .await;
        self.transport.release(endpoint);

        match result {
            Ok(Ok(page)) if page.is_ok() => {
                info!("Checked proxy \"{}\"; Proxy is working", endpoint);
                true
            }
            Ok(Ok(page)) => {
                info!(
                    "Checked proxy \"{}\"; Response status code - {}",
                    endpoint, page.status
                );
                false
            }
            Ok(Err(e)) => {
                error!("An error occurred while checking proxy \"{}\": {}", endpoint, e);
                false
            }
            Err(_) => {
                error!("Checking proxy \"{}\" timed out", endpoint);
                false
            }
        }
    }

    /// Check candidates concurrently and keep the working ones
    pub async fn retain_working(&self, candidates: Vec<Endpoint>) -> Vec<Endpoint> {
        stream::iter(candidates)
            .map(|endpoint| async move {
                let working = self.check(&endpoint).await;
                working.then_some(endpoint)
            })
            .buffer_unordered(self.concurrency)
            .filter_map(|checked| async move { checked })
            .collect()
            .await
    }
}
