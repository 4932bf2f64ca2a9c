//! Transport traits and page types

use crate::error::SearchError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One entry of a page, as decoded from the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntry {
    /// Unique name of the record, if the backend exposed one
    pub identifier: Option<String>,
    /// Ranking value, if the backend exposed one
    pub rank: Option<i64>,
}

impl RawEntry {
    pub fn new(identifier: impl Into<String>, rank: Option<i64>) -> Self {
        Self {
            identifier: Some(identifier.into()),
            rank,
        }
    }
}

/// One batch of entries plus continuation metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub entries: Vec<RawEntry>,
    pub has_next_page: bool,
    /// Opaque cursor, handed back to the transport untouched
    pub end_cursor: Option<String>,
}

impl Page {
    /// A page that ends the result stream
    pub fn last(entries: Vec<RawEntry>) -> Self {
        Self {
            entries,
            has_next_page: false,
            end_cursor: None,
        }
    }

    /// A page followed by more results at `cursor`
    pub fn with_next(entries: Vec<RawEntry>, cursor: impl Into<String>) -> Self {
        Self {
            entries,
            has_next_page: true,
            end_cursor: Some(cursor.into()),
        }
    }
}

/// Executes a single page request against a search backend.
///
/// Implementations must encode `term` safely into the backend's query
/// syntax and report any non-success response as an error.
#[async_trait]
pub trait SearchTransport: Send + Sync {
    /// Transport name, used in logs
    fn name(&self) -> &str;

    /// Fetch the page starting at `cursor` (`None` for the first page)
    async fn fetch_page(&self, term: &str, cursor: Option<&str>) -> Result<Page, SearchError>;
}
