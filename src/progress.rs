//! Terminal progress bars: one per worker plus an overall bar

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use once_cell::sync::Lazy;
use std::ops::Range;

const TOTAL_STYLE: &str = "{prefix:>12.green.bold} [{elapsed_precise}] {wide_bar:.green/white} {pos}/{len} ({eta})";
const WORKER_STYLE: &str = "{prefix:>12.cyan.bold} [{elapsed_precise}] {wide_bar:.cyan/blue} {pos}/{len} {msg}";
const BAR_CHARS: &str = "█▓▒░  ";

static TOTAL_TEMPLATE: Lazy<Option<ProgressStyle>> = Lazy::new(|| style(TOTAL_STYLE));
static WORKER_TEMPLATE: Lazy<Option<ProgressStyle>> = Lazy::new(|| style(WORKER_STYLE));

fn style(template: &str) -> Option<ProgressStyle> {
    ProgressStyle::with_template(template)
        .ok()
        .map(|style| style.progress_chars(BAR_CHARS))
}

fn styled(bar: ProgressBar, template: &Option<ProgressStyle>) -> ProgressBar {
    match template.as_ref() {
        Some(style) => bar.with_style(style.clone()),
        None => bar,
    }
}

/// Bars for a whole run
pub struct RunProgress {
    bars: MultiProgress,
    total: ProgressBar,
}

impl RunProgress {
    /// Draw to stderr
    pub fn new(ids: u64) -> Self {
        Self::with_target(ids, ProgressDrawTarget::stderr())
    }

    /// Track progress without drawing anything
    pub fn hidden(ids: u64) -> Self {
        Self::with_target(ids, ProgressDrawTarget::hidden())
    }

    fn with_target(ids: u64, target: ProgressDrawTarget) -> Self {
        let bars = MultiProgress::with_draw_target(target);
        let total = bars.add(styled(ProgressBar::new(ids), &TOTAL_TEMPLATE));
        total.set_prefix("Total");
        Self { bars, total }
    }

    /// Bar for worker `index`, drawn below the ones created before it
    pub fn worker(&self, index: usize, range: &Range<i64>) -> WorkerProgress {
        let len = u64::try_from(range.end - range.start).unwrap_or(0);
        let own = self
            .bars
            .add(styled(ProgressBar::new(len), &WORKER_TEMPLATE));
        own.set_prefix(format!("Worker {}", index + 1));
        WorkerProgress {
            own,
            total: self.total.clone(),
        }
    }

    pub fn total(&self) -> &ProgressBar {
        &self.total
    }

    pub fn finish(&self) {
        self.total.finish();
    }
}

/// A worker's own bar and the shared overall bar
#[derive(Clone)]
pub struct WorkerProgress {
    own: ProgressBar,
    total: ProgressBar,
}

impl WorkerProgress {
    pub fn hidden() -> Self {
        Self {
            own: ProgressBar::hidden(),
            total: ProgressBar::hidden(),
        }
    }

    /// One more ID handled
    pub fn advance(&self) {
        self.own.inc(1);
        self.total.inc(1);
    }

    pub fn finish(&self) {
        self.own.finish_with_message("done");
    }

    pub fn abandon(&self, reason: String) {
        self.own.abandon_with_message(reason);
    }

    pub fn position(&self) -> u64 {
        self.own.position()
    }

    pub fn is_finished(&self) -> bool {
        self.own.is_finished()
    }
}

impl Default for WorkerProgress {
    fn default() -> Self {
        Self::hidden()
    }
}
