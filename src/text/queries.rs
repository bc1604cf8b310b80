//! Search queries attached to an episode
//!
//! Stored as one comma-joined cell (`Added Queries`). Parsing is lenient and
//! keeps whatever order and duplicates the cell already has; only `add`
//! enforces uniqueness.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered list of queries for one episode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryList(Vec<String>);

impl QueryList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a stored cell: split on `,`, trim, drop empty pieces.
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(',')
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Append `query` unless an identical entry exists.
    ///
    /// Returns whether the list changed. Blank queries are ignored.
    pub fn add(&mut self, query: &str) -> bool {
        if query.trim().is_empty() || self.contains(query) {
            return false;
        }
        self.0.push(query.to_string());
        true
    }

    /// Remove every entry equal to `query`. Returns how many were removed.
    pub fn remove(&mut self, query: &str) -> usize {
        let before = self.0.len();
        self.0.retain(|q| q != query);
        before - self.0.len()
    }

    pub fn contains(&self, query: &str) -> bool {
        self.0.iter().any(|q| q == query)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    /// Storage form: entries joined with `,`.
    pub fn to_cell(&self) -> String {
        self.0.join(",")
    }
}

impl fmt::Display for QueryList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_cell())
    }
}

impl From<Vec<String>> for QueryList {
    fn from(items: Vec<String>) -> Self {
        Self(items)
    }
}

/// Parse `raw` and add `query` to it.
pub fn add_query(raw: &str, query: &str) -> QueryList {
    let mut list = QueryList::parse(raw);
    list.add(query);
    list
}

/// Parse `raw` and remove every occurrence of `query`.
pub fn remove_query(raw: &str, query: &str) -> QueryList {
    let mut list = QueryList::parse(raw);
    list.remove(query);
    list
}
