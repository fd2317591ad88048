//! HTTP transport, optionally routed through a proxy endpoint

use crate::config::CrawlConfig;
use crate::error::Result;
use crate::proxy::models::{Endpoint, Page};
use reqwest::{Client, Proxy as ReqwestProxy};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Issues GET requests, either directly or through a proxy endpoint.
///
/// A clone must not share open connections with the original: every worker
/// drives its own runtime and takes a clone of the transport.
#[allow(async_fn_in_trait)]
pub trait Transport: Clone + Send + Sync + 'static {
    /// Fetch `url`, going through `proxy` when one is given.
    ///
    /// Any status code is a successful exchange; only network-level failures
    /// (timeout, refused connection, DNS) are errors.
    async fn get(&self, url: &str, proxy: Option<&Endpoint>) -> Result<Page>;

    /// Drop any per-endpoint state kept for `proxy`
    fn release(&self, _proxy: &Endpoint) {}
}

/// reqwest-backed transport with one client per proxy endpoint
pub struct HttpTransport {
    user_agent: String,
    timeout: Duration,
    clients: Mutex<HashMap<Option<Endpoint>, Client>>,
}

impl HttpTransport {
    pub fn new(user_agent: &str, timeout: Duration) -> Self {
        Self {
            user_agent: user_agent.to_string(),
            timeout,
            clients: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &CrawlConfig) -> Self {
        Self::new(&config.user_agent, config.request_timeout)
    }

    /// Get or create the client for a route
    fn client_for(&self, proxy: Option<&Endpoint>) -> Result<Client> {
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);
        let key = proxy.cloned();
        if let Some(client) = clients.get(&key) {
            return Ok(client.clone());
        }

        let builder = Client::builder()
            .user_agent(&self.user_agent)
            .timeout(self.timeout);
        let client = match proxy {
            Some(endpoint) => builder.proxy(ReqwestProxy::all(endpoint.url())?).build()?,
            None => builder.no_proxy().build()?,
        };

        clients.insert(key, client.clone());
        Ok(client)
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &str, proxy: Option<&Endpoint>) -> Result<Page> {
        let client = self.client_for(proxy)?;
        let response = client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(Page::new(status, body))
    }

    fn release(&self, proxy: &Endpoint) {
        self.clients
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&Some(proxy.clone()));
    }
}

impl Clone for HttpTransport {
    fn clone(&self) -> Self {
        Self::new(&self.user_agent, self.timeout)
    }
}
