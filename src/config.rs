//! Crawl configuration

use std::path::PathBuf;
use std::time::Duration;

/// Default base URL; documents are fetched from `{base_url}/{id}/`
pub const DEFAULT_BASE_URL: &str = "https://habr.com/ru/post";

/// Default identity header sent with every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_4) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/83.0.4103.97 Safari/537.36";

/// Default proxy directory page
pub const DEFAULT_PROXY_SOURCE_URL: &str =
    "https://hidemy.name/en/proxy-list/?maxtime=100&type=h#list";

/// Default URL used to check that a proxy works
pub const DEFAULT_CHECKED_URL: &str = "https://www.google.com/";

/// Default directory for downloaded documents
pub const DEFAULT_OUTPUT_DIR: &str = "data/unprocessed_posts";

/// Content regions kept from a fetched document
pub const DEFAULT_FRAGMENT_CLASSES: &[&str] = &["tm-article-presenter__body", "tm-article-author"];

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CHECK_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CHECK_CONCURRENCY: usize = 10;

/// Layout of the proxy directory page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceFormat {
    /// HTML table whose rows start with an `ip` cell and a `port` cell
    #[default]
    Table,
    /// Plain text with one `host:port` per line
    PlainList,
}

/// Configuration for a crawl run
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub base_url: String,
    pub user_agent: String,
    pub proxy_source_url: String,
    pub source_format: SourceFormat,
    pub checked_url: String,
    pub fragment_classes: Vec<String>,
    pub output_dir: PathBuf,
    /// Timeout for document and directory requests
    pub request_timeout: Duration,
    /// Timeout for a single proxy liveness check
    pub check_timeout: Duration,
    /// Number of candidates validated at once during a refresh
    pub check_concurrency: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            proxy_source_url: DEFAULT_PROXY_SOURCE_URL.to_string(),
            source_format: SourceFormat::default(),
            checked_url: DEFAULT_CHECKED_URL.to_string(),
            fragment_classes: DEFAULT_FRAGMENT_CLASSES
                .iter()
                .map(|c| c.to_string())
                .collect(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            check_timeout: Duration::from_secs(DEFAULT_CHECK_TIMEOUT_SECS),
            check_concurrency: DEFAULT_CHECK_CONCURRENCY,
        }
    }
}

impl CrawlConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }

    pub fn with_proxy_source(mut self, url: String, format: SourceFormat) -> Self {
        self.proxy_source_url = url;
        self.source_format = format;
        self
    }

    pub fn with_checked_url(mut self, url: String) -> Self {
        self.checked_url = url;
        self
    }

    pub fn with_fragment_classes(mut self, classes: Vec<String>) -> Self {
        self.fragment_classes = classes;
        self
    }

    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_check_timeout(mut self, timeout: Duration) -> Self {
        self.check_timeout = timeout;
        self
    }

    pub fn with_check_concurrency(mut self, concurrency: usize) -> Self {
        self.check_concurrency = concurrency.max(1);
        self
    }

    /// URL of the document with the given ID
    pub fn document_url(&self, id: i64) -> String {
        format!("{}/{}/", self.base_url, id)
    }
}
