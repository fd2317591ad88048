//! Extraction of candidate endpoints from a proxy directory page
//!
//! The pool never looks at the directory markup itself. Each directory layout
//! gets its own [`EndpointExtractor`], so a new source format only needs a new
//! implementation here.

use crate::config::SourceFormat;
use crate::error::{Error, Result};
use crate::proxy::models::Endpoint;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::Arc;
use tracing::debug;

/// Container holding the proxy table on the default directory page
pub const DEFAULT_TABLE_CONTAINER: &str = "div.table_block";

/// Regex pattern to match IP:PORT patterns in text
static IP_PORT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}):(\d{1,5})\b")
        .expect("Invalid IP:PORT regex")
});

/// Turns a directory page into candidate endpoints
pub trait EndpointExtractor: Send + Sync {
    /// Candidates found on the page, without duplicates
    fn extract(&self, page: &str) -> Vec<Endpoint>;
}

/// Build the extractor for a directory layout
pub fn extractor_for(format: SourceFormat) -> Arc<dyn EndpointExtractor> {
    match format {
        SourceFormat::Table => Arc::new(TableExtractor::default()),
        SourceFormat::PlainList => Arc::new(PlainListExtractor),
    }
}

/// Reads `{ip}` and `{port}` from the first two cells of each table row
#[derive(Debug, Clone)]
pub struct TableExtractor {
    rows: String,
}

impl TableExtractor {
    /// Use the table inside the element matching `container`
    pub fn new(container: &str) -> Result<Self> {
        let rows = format!("{container} tbody tr");
        create_selector(&rows)?;
        Ok(Self { rows })
    }
}

impl Default for TableExtractor {
    fn default() -> Self {
        Self {
            rows: format!("{DEFAULT_TABLE_CONTAINER} tbody tr"),
        }
    }
}

impl EndpointExtractor for TableExtractor {
    fn extract(&self, page: &str) -> Vec<Endpoint> {
        let (Ok(row_selector), Ok(cell_selector)) =
            (create_selector(&self.rows), create_selector("td"))
        else {
            return Vec::new();
        };

        let doc = Html::parse_document(page);
        let mut endpoints = Vec::new();
        for row in doc.select(&row_selector) {
            let cells: Vec<String> = row
                .select(&cell_selector)
                .take(2)
                .map(|cell| cell.text().collect::<String>())
                .collect();
            let [host, port] = cells.as_slice() else {
                continue;
            };

            match Endpoint::parse(&format!("{}:{}", host.trim(), port.trim())) {
                Ok(endpoint) => endpoints.push(endpoint),
                Err(e) => debug!("Skipping proxy table row: {}", e),
            }
        }

        dedup(endpoints)
    }
}

/// Reads one `host:port` per line, scanning for `a.b.c.d:port` when no line parses
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainListExtractor;

impl PlainListExtractor {
    fn extract_with_regex(content: &str) -> Vec<Endpoint> {
        IP_PORT_REGEX
            .captures_iter(content)
            .filter_map(|cap| {
                let host = cap.get(1)?.as_str();
                let port: u16 = cap.get(2)?.as_str().parse().ok()?;

                // Validate IP address parts
                if host.split('.').any(|part| part.parse::<u8>().is_err()) {
                    return None;
                }
                if port == 0 {
                    return None;
                }

                Some(Endpoint::new(host, port))
            })
            .collect()
    }
}

impl EndpointExtractor for PlainListExtractor {
    fn extract(&self, page: &str) -> Vec<Endpoint> {
        let mut endpoints: Vec<Endpoint> = page
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| Endpoint::parse(line).ok())
            .collect();

        if endpoints.is_empty() {
            endpoints = Self::extract_with_regex(page);
        }

        dedup(endpoints)
    }
}

fn dedup(mut endpoints: Vec<Endpoint>) -> Vec<Endpoint> {
    endpoints.sort();
    endpoints.dedup();
    endpoints
}

#[inline]
fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|_| Error::InvalidSelector(sel_str.into()))
}
