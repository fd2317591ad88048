//! In-memory doubles shared by the unit tests

use crate::error::{Error, Result};
use crate::fetch::sink::DocumentSink;
use crate::proxy::models::{Endpoint, Page};
use crate::proxy::pool::EndpointSupply;
use crate::proxy::transport::Transport;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

/// Canned answer for a request
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Page(u16, String),
    Fail(String),
}

impl Reply {
    pub(crate) fn status(status: u16) -> Self {
        Reply::Page(status, String::new())
    }

    pub(crate) fn ok(body: &str) -> Self {
        Reply::Page(200, body.to_string())
    }
}

#[derive(Default)]
struct FakeState {
    routes: HashMap<String, Reply>,
    proxy_routes: HashMap<(String, Endpoint), Reply>,
    requests: Vec<(String, Option<Endpoint>)>,
    released: Vec<Endpoint>,
}

/// Transport answering from a routing table; unknown URLs fail like a dead host
#[derive(Clone, Default)]
pub(crate) struct FakeTransport {
    state: Arc<Mutex<FakeState>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn route(&self, url: &str, reply: Reply) -> &Self {
        self.state
            .lock()
            .unwrap()
            .routes
            .insert(url.to_string(), reply);
        self
    }

    pub(crate) fn route_via(&self, url: &str, endpoint: &Endpoint, reply: Reply) -> &Self {
        self.state
            .lock()
            .unwrap()
            .proxy_routes
            .insert((url.to_string(), endpoint.clone()), reply);
        self
    }

    pub(crate) fn requests(&self) -> Vec<(String, Option<Endpoint>)> {
        self.state.lock().unwrap().requests.clone()
    }

    pub(crate) fn released(&self) -> Vec<Endpoint> {
        self.state.lock().unwrap().released.clone()
    }
}

impl Transport for FakeTransport {
    async fn get(&self, url: &str, proxy: Option<&Endpoint>) -> Result<Page> {
        let reply = {
            let mut state = self.state.lock().unwrap();
            state.requests.push((url.to_string(), proxy.cloned()));
            proxy
                .and_then(|p| state.proxy_routes.get(&(url.to_string(), p.clone())))
                .or_else(|| state.routes.get(url))
                .cloned()
        };

        match reply {
            Some(Reply::Page(status, body)) => Ok(Page::new(status, body)),
            Some(Reply::Fail(reason)) => Err(Error::Io(std::io::Error::other(reason))),
            None => Err(Error::Io(std::io::Error::other(format!("no route to {url}")))),
        }
    }

    fn release(&self, proxy: &Endpoint) {
        self.state.lock().unwrap().released.push(proxy.clone());
    }
}

/// Supply returning queued batches, then empty lists
#[derive(Clone, Default)]
pub(crate) struct FakeSupply {
    batches: Arc<Mutex<Vec<Result<Vec<Endpoint>>>>>,
    calls: Arc<Mutex<usize>>,
}

impl FakeSupply {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn then_yield(self, endpoints: &[&str]) -> Self {
        let batch = endpoints.iter().map(|e| Endpoint::parse(e).unwrap()).collect();
        self.batches.lock().unwrap().push(Ok(batch));
        self
    }

    pub(crate) fn then_fail(self) -> Self {
        self.batches.lock().unwrap().push(Err(Error::EmptyPool));
        self
    }

    pub(crate) fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl EndpointSupply for FakeSupply {
    async fn supply(&self) -> Result<Vec<Endpoint>> {
        *self.calls.lock().unwrap() += 1;
        let mut batches = self.batches.lock().unwrap();
        if batches.is_empty() {
            Ok(Vec::new())
        } else {
            batches.remove(0)
        }
    }
}

/// Sink keeping documents in memory
#[derive(Default)]
pub(crate) struct MemorySink {
    pub(crate) documents: Mutex<BTreeMap<i64, String>>,
}

impl DocumentSink for MemorySink {
    fn save(&self, id: i64, content: &str) -> Result<()> {
        self.documents
            .lock()
            .unwrap()
            .insert(id, content.to_string());
        Ok(())
    }
}

pub(crate) fn endpoints(list: &[&str]) -> Vec<Endpoint> {
    list.iter().map(|e| Endpoint::parse(e).unwrap()).collect()
}
