//! Sequential fetch loop over one sub-range

use crate::config::CrawlConfig;
use crate::error::Result;
use crate::fetch::filter::FragmentFilter;
use crate::fetch::outcome::{FetchOutcome, WorkerReport};
use crate::fetch::sink::{DocumentSink, EventSink};
use crate::progress::WorkerProgress;
use crate::proxy::pool::{EndpointSupply, ProxyPool};
use crate::proxy::transport::Transport;
use std::ops::Range;
use std::sync::Arc;
use tracing::{info, info_span, warn, Instrument};

/// Everything a worker needs besides its range and its pool
#[derive(Clone)]
pub struct WorkerContext<T> {
    pub transport: T,
    pub base_url: String,
    pub filter: FragmentFilter,
    pub documents: Arc<dyn DocumentSink>,
    pub events: Arc<dyn EventSink>,
}

impl<T: Transport> WorkerContext<T> {
    pub fn new(
        transport: T,
        base_url: &str,
        filter: FragmentFilter,
        documents: Arc<dyn DocumentSink>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            filter,
            documents,
            events,
        }
    }

    pub fn from_config(
        transport: T,
        config: &CrawlConfig,
        documents: Arc<dyn DocumentSink>,
        events: Arc<dyn EventSink>,
    ) -> Result<Self> {
        Ok(Self::new(
            transport,
            &config.base_url,
            FragmentFilter::new(config.fragment_classes.as_slice())?,
            documents,
            events,
        ))
    }

    pub fn document_url(&self, id: i64) -> String {
        format!("{}/{}/", self.base_url, id)
    }
}

/// Fetches every ID of its sub-range once, in ascending order
///
/// No ID is retried. The only fatal error is an exhausted proxy pool.
pub struct FetchWorker<T, S> {
    index: usize,
    range: Range<i64>,
    pool: ProxyPool<S>,
    context: WorkerContext<T>,
    progress: WorkerProgress,
}

impl<T: Transport, S: EndpointSupply> FetchWorker<T, S> {
    pub fn new(
        index: usize,
        range: Range<i64>,
        pool: ProxyPool<S>,
        context: WorkerContext<T>,
    ) -> Self {
        Self {
            index,
            range,
            pool,
            context,
            progress: WorkerProgress::hidden(),
        }
    }

    pub fn with_progress(mut self, progress: WorkerProgress) -> Self {
        self.progress = progress;
        self
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn range(&self) -> Range<i64> {
        self.range.clone()
    }

    pub fn pool(&self) -> &ProxyPool<S> {
        &self.pool
    }

    /// Process the whole sub-range
    pub async fn run(mut self) -> Result<WorkerReport> {
        let span = info_span!(
            "worker",
            index = self.index,
            first = self.range.start,
            last = self.range.end
        );
        async move {
            info!("Worker started with {} proxies", self.pool.len());
            let mut report = WorkerReport::new(self.index, self.range.clone());

            for id in self.range.clone() {
                let outcome = match self.fetch(id).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        warn!(
                            attempted = report.attempted,
                            saved = report.saved,
                            "Worker stopped at document {}: {}", id, e
                        );
                        self.progress.abandon(format!("stopped at {id}: {e}"));
                        return Err(e);
                    }
                };
                self.context.events.notify(&outcome);
                report.record(&outcome);
                self.progress.advance();
            }
            self.progress.finish();

            info!(
                attempted = report.attempted,
                saved = report.saved,
                not_found = report.not_found,
                proxy_rejected = report.proxy_rejected,
                network_errors = report.network_errors,
                "Worker finished"
            );
            Ok(report)
        }
        .instrument(span)
        .await
    }

    /// Fetch one ID through a pool proxy and classify the response
    ///
    /// Fails only when no proxy can be selected.
    pub async fn fetch(&mut self, id: i64) -> Result<FetchOutcome> {
        let proxy = self.pool.select().await?;
        let url = self.context.document_url(id);

        let page = match self.context.transport.get(&url, Some(&proxy)).await {
            Ok(page) => page,
            Err(e) => {
                return Ok(FetchOutcome::NetworkError {
                    id,
                    reason: e.to_string(),
                })
            }
        };

        let outcome = match page.status {
            200 => {
                let content = self.context.filter.apply(&page.body);
                match self.context.documents.save(id, &content) {
                    Ok(()) => FetchOutcome::Saved(id),
                    Err(e) => FetchOutcome::SaveFailed {
                        id,
                        reason: e.to_string(),
                    },
                }
            }
            403 | 404 => FetchOutcome::NotFound {
                id,
                status: page.status,
            },
            status => {
                self.pool.reject(&proxy).await;
                self.context.transport.release(&proxy);
                FetchOutcome::ProxyRejected { id, proxy, status }
            }
        };
        Ok(outcome)
    }
}
