//! Splits the ID range and runs one worker per sub-range on its own thread

use crate::error::{Error, Result};
use crate::fetch::outcome::{RunReport, WorkerFailure, WorkerReport};
use crate::fetch::worker::{FetchWorker, WorkerContext};
use crate::partition::{partition, validate_id_range};
use crate::progress::RunProgress;
use crate::proxy::pool::{EndpointSupply, ProxyPool};
use crate::proxy::transport::Transport;
use std::any::Any;
use std::collections::HashMap;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
use tokio::task::{Id, JoinSet};
use tracing::{error, info, warn};

/// Runs a crawl over `[first, last)` with a bounded number of workers
pub struct Orchestrator<T, S> {
    context: WorkerContext<T>,
    supply: S,
    show_progress: bool,
}

impl<T: Transport, S: EndpointSupply> Orchestrator<T, S> {
    pub fn new(context: WorkerContext<T>, supply: S) -> Self {
        Self {
            context,
            supply,
            show_progress: false,
        }
    }

    /// Draw one progress bar per worker and an overall bar on stderr
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Fetch every ID in `[first, last)` and wait for all workers
    ///
    /// The proxy directory is harvested once; every worker then owns a pool
    /// seeded with a copy of that list. A worker that exhausts its pool is
    /// reported in [`RunReport::failed`] without stopping the others.
    pub async fn run(&self, first: i64, last: i64, worker_count: usize) -> Result<RunReport> {
        validate_id_range(first, last)?;

        let span = usize::try_from(last - first).unwrap_or(usize::MAX);
        if span == 0 {
            info!("Nothing to fetch in [{}, {})", first, last);
            return Ok(RunReport::default());
        }

        let workers = worker_count.clamp(1, span);
        let ranges = partition(first, last, workers)?;
        info!("Running {} workers over [{}, {})", workers, first, last);

        let seed = ProxyPool::populate(self.supply.clone())
            .await
            .endpoints()
            .to_vec();
        if seed.is_empty() {
            warn!("Initial proxy list is empty, workers will refresh on their own");
        } else {
            info!("Initial proxy list holds {} proxies", seed.len());
        }

        let ids = u64::try_from(span).unwrap_or(u64::MAX);
        let progress = if self.show_progress {
            RunProgress::new(ids)
        } else {
            RunProgress::hidden(ids)
        };

        let mut tasks = JoinSet::new();
        let mut assigned = HashMap::new();
        for (index, range) in ranges.into_iter().enumerate() {
            let pool = ProxyPool::with_seed(self.supply.clone(), seed.clone());
            let worker = FetchWorker::new(index, range.clone(), pool, self.context.clone())
                .with_progress(progress.worker(index, &range));
            let handle = tasks.spawn_blocking(move || run_on_own_runtime(worker));
            assigned.insert(handle.id(), (index, range));
        }

        let mut report = collect_workers(tasks, assigned).await;
        progress.finish();

        report.completed.sort_by_key(|w| w.index);
        report.failed.sort_by_key(|f| f.index);
        info!(
            attempted = report.attempted(),
            saved = report.saved(),
            failed_workers = report.failed.len(),
            "Run finished"
        );
        Ok(report)
    }
}

/// Wait for every worker; each one lands in either `completed` or `failed`
async fn collect_workers(
    mut tasks: JoinSet<Result<WorkerReport>>,
    mut assigned: HashMap<Id, (usize, Range<i64>)>,
) -> RunReport {
    let mut report = RunReport::default();
    while let Some(joined) = tasks.join_next_with_id().await {
        let (id, outcome) = match joined {
            Ok((id, outcome)) => (id, outcome),
            Err(e) => (e.id(), Err(Error::RuntimeJoin(e))),
        };
        let Some((index, range)) = assigned.remove(&id) else {
            error!("Finished task {} was not assigned a range", id);
            continue;
        };

        match outcome {
            Ok(worker_report) => report.completed.push(worker_report),
            Err(e) => {
                error!(
                    "Worker {} on [{}, {}) failed: {}",
                    index, range.start, range.end, e
                );
                report.failed.push(WorkerFailure {
                    index,
                    range,
                    error: e.to_string(),
                });
            }
        }
    }
    report
}

/// Drive a worker to completion on a single-threaded runtime owned by the current thread
fn run_on_own_runtime<T: Transport, S: EndpointSupply>(
    worker: FetchWorker<T, S>,
) -> Result<WorkerReport> {
    let range: Range<i64> = worker.range();
    let outcome = panic::catch_unwind(AssertUnwindSafe(move || -> Result<WorkerReport> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(worker.run())
    }));

    outcome.unwrap_or_else(|payload| {
        Err(Error::WorkerPanic(format!(
            "[{}, {}): {}",
            range.start,
            range.end,
            panic_message(payload.as_ref())
        )))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
