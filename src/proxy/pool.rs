//! Proxy pool with random selection, eviction and refresh on exhaustion

use crate::config::CrawlConfig;
use crate::error::{Error, Result};
use crate::proxy::checker::ProxyChecker;
use crate::proxy::crawler::ProxyCrawler;
use crate::proxy::models::Endpoint;
use crate::proxy::transport::Transport;
use rand::{seq::SliceRandom, thread_rng};
use std::collections::HashSet;
use tracing::{error, info, warn};

/// Source of validated endpoints used to (re)populate a pool
#[allow(async_fn_in_trait)]
pub trait EndpointSupply: Clone + Send + 'static {
    /// Produce a fresh list of endpoints that passed validation
    async fn supply(&self) -> Result<Vec<Endpoint>>;
}

/// Scrapes the proxy directory and keeps the candidates that pass a liveness check
#[derive(Clone)]
pub struct ProxyHarvester<T> {
    crawler: ProxyCrawler<T>,
    checker: ProxyChecker<T>,
}

impl<T: Transport> ProxyHarvester<T> {
    pub fn new(crawler: ProxyCrawler<T>, checker: ProxyChecker<T>) -> Self {
        Self { crawler, checker }
    }

    pub fn from_config(transport: T, config: &CrawlConfig) -> Self {
        Self::new(
            ProxyCrawler::from_config(transport.clone(), config),
            ProxyChecker::from_config(transport, config),
        )
    }
}

impl<T: Transport> EndpointSupply for ProxyHarvester<T> {
    async fn supply(&self) -> Result<Vec<Endpoint>> {
        let candidates = self.crawler.crawl().await?;
        info!(
            "Validating {} candidate proxies from \"{}\"",
            candidates.len(),
            self.crawler.source_url()
        );
        Ok(self.checker.retain_working(candidates).await)
    }
}

/// Set of currently trusted endpoints
///
/// Mutating operations take `&mut self`; sharing one pool between workers
/// would need an outer lock. The orchestrator gives every worker its own pool.
pub struct ProxyPool<S> {
    endpoints: Vec<Endpoint>,
    supply: S,
}

impl<S: EndpointSupply> ProxyPool<S> {
    /// Create a pool and populate it from `supply` right away
    pub async fn populate(supply: S) -> Self {
        let mut pool = Self {
            endpoints: Vec::new(),
            supply,
        };
        pool.refresh().await;
        pool
    }

    /// Create a pool holding `seed`; `supply` is only used once it runs dry
    pub fn with_seed(supply: S, seed: Vec<Endpoint>) -> Self {
        Self {
            endpoints: unique(seed),
            supply,
        }
    }

    /// A uniformly random live endpoint
    ///
    /// An empty pool is refreshed first. Fails with [`Error::EmptyPool`] if the
    /// refresh produced nothing.
    pub async fn select(&mut self) -> Result<Endpoint> {
        if self.endpoints.is_empty() {
            warn!("Proxy list is empty, refreshing");
            self.refresh().await;
        }

        self.endpoints
            .choose(&mut thread_rng())
            .cloned()
            .ok_or(Error::EmptyPool)
    }

    /// Evict `endpoint`; refreshes synchronously if that empties the pool
    pub async fn reject(&mut self, endpoint: &Endpoint) {
        match self.endpoints.iter().position(|e| e == endpoint) {
            Some(index) => {
                self.endpoints.swap_remove(index);
                info!("Proxy \"{}\" removed from proxy list", endpoint);
            }
            None => warn!("Proxy list does not contain \"{}\"", endpoint),
        }

        if self.endpoints.is_empty() {
            self.refresh().await;
        }
    }

    /// Drop every endpoint and repopulate from the supply
    pub async fn refresh(&mut self) {
        self.endpoints.clear();
        match self.supply.supply().await {
            Ok(endpoints) => {
                self.endpoints = unique(endpoints);
                info!("Proxy list refreshed with {} proxies", self.endpoints.len());
            }
            Err(e) => error!("An error occurred while loading proxies: {}", e),
        }
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn contains(&self, endpoint: &Endpoint) -> bool {
        self.endpoints.contains(endpoint)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

fn unique(endpoints: Vec<Endpoint>) -> Vec<Endpoint> {
    let mut seen = HashSet::new();
    endpoints
        .into_iter()
        .filter(|e| seen.insert(e.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceFormat;
    use crate::testing::{endpoints, FakeSupply, FakeTransport, Reply};
    use std::time::Duration;

    #[tokio::test]
    async fn test_select_returns_seed_values() {
        let seed = endpoints(&["a:1", "b:2"]);
        let mut pool = ProxyPool::with_seed(FakeSupply::new(), seed.clone());

        for _ in 0..50 {
            let selected = pool.select().await.unwrap();
            assert!(seed.contains(&selected));
        }
    }

    #[tokio::test]
    async fn test_seed_is_deduplicated() {
        let pool = ProxyPool::with_seed(FakeSupply::new(), endpoints(&["a:1", "a:1", "b:2"]));
        assert_eq!(pool.len(), 2);
    }

    #[tokio::test]
    async fn test_rejected_endpoint_is_never_selected() {
        let supply = FakeSupply::new();
        let mut pool = ProxyPool::with_seed(supply.clone(), endpoints(&["a:1", "b:2"]));
        let rejected = Endpoint::parse("a:1").unwrap();

        pool.reject(&rejected).await;
        assert!(!pool.contains(&rejected));
        for _ in 0..50 {
            assert_eq!(pool.select().await.unwrap(), Endpoint::parse("b:2").unwrap());
        }
        assert_eq!(supply.calls(), 0);
    }

    #[tokio::test]
    async fn test_reject_unknown_endpoint_is_a_noop() {
        let supply = FakeSupply::new();
        let mut pool = ProxyPool::with_seed(supply.clone(), endpoints(&["a:1"]));

        pool.reject(&Endpoint::parse("z:9").unwrap()).await;
        assert_eq!(pool.endpoints(), endpoints(&["a:1"]).as_slice());
        assert_eq!(supply.calls(), 0);
    }

    #[tokio::test]
    async fn test_rejecting_last_endpoint_refreshes() {
        let supply = FakeSupply::new().then_yield(&["c:3", "d:4"]);
        let mut pool = ProxyPool::with_seed(supply.clone(), endpoints(&["a:1"]));

        pool.reject(&Endpoint::parse("a:1").unwrap()).await;
        assert_eq!(supply.calls(), 1);
        assert_eq!(pool.len(), 2);
        assert!(!pool.contains(&Endpoint::parse("a:1").unwrap()));
    }

    #[tokio::test]
    async fn test_empty_refresh_fails_selection() {
        let supply = FakeSupply::new().then_yield(&[]);
        let mut pool = ProxyPool::with_seed(supply.clone(), endpoints(&["a:1"]));

        pool.reject(&Endpoint::parse("a:1").unwrap()).await;
        assert!(pool.is_empty());
        assert!(matches!(pool.select().await, Err(Error::EmptyPool)));
    }

    #[tokio::test]
    async fn test_failed_refresh_leaves_pool_empty() {
        let supply = FakeSupply::new().then_fail();
        let mut pool = ProxyPool::populate(supply.clone()).await;

        assert!(pool.is_empty());
        assert!(matches!(pool.select().await, Err(Error::EmptyPool)));
        assert_eq!(supply.calls(), 2);
    }

    #[tokio::test]
    async fn test_select_refreshes_empty_pool() {
        let supply = FakeSupply::new().then_yield(&["e:5"]);
        let mut pool = ProxyPool::with_seed(supply.clone(), Vec::new());

        assert_eq!(pool.select().await.unwrap(), Endpoint::parse("e:5").unwrap());
        assert_eq!(supply.calls(), 1);
    }

    #[tokio::test]
    async fn test_harvester_keeps_validated_candidates() {
        let config = CrawlConfig::new()
            .with_proxy_source("http://proxies.test/".to_string(), SourceFormat::PlainList)
            .with_checked_url("http://checked.test/".to_string())
            .with_check_timeout(Duration::from_secs(1));
        let transport = FakeTransport::new();
        transport.route(
            "http://proxies.test/",
            Reply::ok("1.1.1.1:80\n2.2.2.2:80\n3.3.3.3:80\n"),
        );
        transport.route_via(
            "http://checked.test/",
            &Endpoint::new("1.1.1.1", 80),
            Reply::ok(""),
        );
        transport.route_via(
            "http://checked.test/",
            &Endpoint::new("2.2.2.2", 80),
            Reply::status(407),
        );

        let pool = ProxyPool::populate(ProxyHarvester::from_config(transport, &config)).await;
        assert_eq!(pool.endpoints(), endpoints(&["1.1.1.1:80"]).as_slice());
    }

    #[tokio::test]
    async fn test_harvester_with_unreachable_source() {
        let config = CrawlConfig::new();
        let harvester = ProxyHarvester::from_config(FakeTransport::new(), &config);

        assert!(harvester.supply().await.is_err());
        let pool = ProxyPool::populate(harvester).await;
        assert!(pool.is_empty());
    }
}
