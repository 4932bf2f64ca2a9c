//! Pagination loop: fetch every page, keep ranked entries, sort

use super::models::{ResultRecord, ResultSet, SearchQuery};
use crate::error::SearchError;
use crate::metrics::Metrics;
use crate::transport::{RawEntry, SearchTransport};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Follows a transport's cursor chain until exhausted and ranks the results
pub struct PaginatedSearchAggregator {
    transport: Arc<dyn SearchTransport>,
    /// Optional cap on pages per search
    max_pages: Option<u32>,
    metrics: Option<Arc<Metrics>>,
}

impl PaginatedSearchAggregator {
    pub fn new(transport: Arc<dyn SearchTransport>) -> Self {
        Self {
            transport,
            max_pages: None,
            metrics: None,
        }
    }

    /// Fail searches that would need more than `max_pages` pages
    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Run one search to completion.
    ///
    /// A blank term returns an empty set without touching the transport.
    /// Any failed page fails the whole search; partial results are dropped.
    pub async fn aggregate(&self, query: impl Into<SearchQuery>) -> Result<ResultSet, SearchError> {
        let query = query.into();
        if query.is_empty() {
            return Ok(ResultSet::empty());
        }

        if let Some(ref metrics) = self.metrics {
            metrics.inc_search();
        }
        let start = Instant::now();

        match self.fetch_all(&query.term).await {
            Ok(set) => {
                let elapsed = start.elapsed();
                info!(
                    "Search '{}' on {} returned {} records from {} pages in {:?}",
                    query.term,
                    self.transport.name(),
                    set.len(),
                    set.pages_fetched,
                    elapsed
                );
                if let Some(ref metrics) = self.metrics {
                    metrics.record_success(elapsed.as_millis() as u64);
                }
                Ok(set)
            }
            Err(e) => {
                warn!(
                    "Search '{}' on {} failed ({}): {}",
                    query.term,
                    self.transport.name(),
                    e.kind(),
                    e
                );
                if let Some(ref metrics) = self.metrics {
                    metrics.record_failure(e.kind());
                }
                Err(e)
            }
        }
    }

    async fn fetch_all(&self, term: &str) -> Result<ResultSet, SearchError> {
        let mut cursor: Option<String> = None;
        let mut accumulated = Vec::new();
        let mut pages = 0u32;

        loop {
            if let Some(max) = self.max_pages {
                if pages >= max {
                    return Err(SearchError::PageLimitExceeded(max));
                }
            }

            let page = self.transport.fetch_page(term, cursor.as_deref()).await?;
            pages += 1;

            let received = page.entries.len();
            let before = accumulated.len();
            accumulated.extend(page.entries.into_iter().filter_map(ranked));
            let dropped = received - (accumulated.len() - before);

            debug!(
                "Page {} for '{}': {} entries, {} dropped, has_next_page={}",
                pages, term, received, dropped, page.has_next_page
            );

            if let Some(ref metrics) = self.metrics {
                metrics.record_page(dropped);
            }

            if !page.has_next_page {
                break;
            }
            cursor = page.end_cursor;
        }

        Ok(ResultSet::from_unsorted(accumulated, pages))
    }
}

/// Entries without a usable rank or identifier are dropped
fn ranked(entry: RawEntry) -> Option<ResultRecord> {
    let rank = u64::try_from(entry.rank?).ok()?;
    let identifier = entry.identifier.filter(|id| !id.is_empty())?;
    Some(ResultRecord::new(identifier, rank))
}
