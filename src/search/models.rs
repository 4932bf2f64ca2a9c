//! Search query and result data models

use comfy_table::{presets::UTF8_FULL_CONDENSED, CellAlignment, Table};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Characters removed from a term before it reaches the search backend
pub(crate) fn is_stripped(c: char) -> bool {
    c == '"' || c == '\\'
}

/// Free-text search term
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// The search term as typed
    pub term: String,
}

impl SearchQuery {
    pub fn new(term: impl Into<String>) -> Self {
        Self { term: term.into() }
    }

    /// Check if query is empty once quotes and backslashes are removed
    pub fn is_empty(&self) -> bool {
        self.term.chars().all(|c| c.is_whitespace() || is_stripped(c))
    }
}

impl From<&str> for SearchQuery {
    fn from(term: &str) -> Self {
        Self::new(term)
    }
}

impl From<String> for SearchQuery {
    fn from(term: String) -> Self {
        Self::new(term)
    }
}

/// A record that made it into the result set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Unique name (the user login)
    pub identifier: String,
    /// Ordering value (the follower count)
    pub rank: u64,
}

impl ResultRecord {
    pub fn new(identifier: impl Into<String>, rank: u64) -> Self {
        Self {
            identifier: identifier.into(),
            rank,
        }
    }
}

/// Records ordered by descending rank
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSet {
    pub records: Vec<ResultRecord>,
    /// Pages fetched to build this set
    pub pages_fetched: u32,
}

impl ResultSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from records in fetch order; sorts stably by descending rank
    pub fn from_unsorted(mut records: Vec<ResultRecord>, pages_fetched: u32) -> Self {
        records.sort_by(|a, b| b.rank.cmp(&a.rank));
        Self {
            records,
            pages_fetched,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResultRecord> {
        self.records.iter()
    }

    /// Identifiers in result order
    pub fn identifiers(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.identifier.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a ResultRecord;
    type IntoIter = std::slice::Iter<'a, ResultRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl ResultSet {
    /// Two-column `User | Followers` table
    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL_CONDENSED)
            .set_header(vec!["User", "Followers"]);

        for record in &self.records {
            table.add_row(vec![record.identifier.clone(), record.rank.to_string()]);
        }
        if let Some(column) = table.column_mut(1) {
            column.set_cell_alignment(CellAlignment::Right);
        }
        table
    }
}

impl fmt::Display for ResultSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_table())
    }
}
