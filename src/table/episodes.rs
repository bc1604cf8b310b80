//! EpisodeTable: the uploaded table, validated and typed

use super::record::{columns, EpisodeRecord};
use crate::text::RawField;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Reasons an upload is rejected before anything is stored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("CSV must contain columns: Title, Description (missing: {})", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("duplicate episode title: {0}")]
    DuplicateTitle(String),
}

/// Untyped tabular data as handed over by a transport.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<RawField>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn with_row(mut self, row: Vec<RawField>) -> Self {
        self.rows.push(row);
        self
    }
}

/// 1-based episode positions split by analysis state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub analyzed_episodes: Vec<usize>,
    pub not_analyzed_episodes: Vec<usize>,
    pub total_episodes: usize,
    pub analyzed_count: usize,
    pub not_analyzed_count: usize,
}

/// The overview columns of one episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayRow {
    pub title: String,
    pub description: String,
    pub analyzed: bool,
    pub query_count: usize,
    pub added_queries: String,
}

/// An ingested episode table.
///
/// Always carries `Title`, `Description` and the tracking columns. Column
/// order is the upload's order with missing tracking columns appended.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodeTable {
    columns: Vec<String>,
    records: Vec<EpisodeRecord>,
}

impl EpisodeTable {
    /// Validate an upload and backfill tracking columns.
    ///
    /// Header names are made unique first (see [`unique_column_names`]), so
    /// the only schema failures are missing required columns and repeated
    /// titles.
    pub fn from_raw(raw: RawTable) -> Result<Self, SchemaError> {
        let RawTable { columns: header, rows } = raw;
        let mut header = unique_column_names(header);

        let missing: Vec<String> = columns::REQUIRED
            .iter()
            .filter(|required| !header.iter().any(|c| c == *required))
            .map(|required| required.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(SchemaError::MissingColumns(missing));
        }

        let records: Vec<EpisodeRecord> = rows
            .into_iter()
            .map(|row| EpisodeRecord::from_row(&header, row))
            .collect();

        let mut titles = HashSet::new();
        if let Some(dup) = records
            .iter()
            .map(|r| r.title.as_str())
            .filter(|title| !title.trim().is_empty())
            .find(|title| !titles.insert(*title))
        {
            return Err(SchemaError::DuplicateTitle(dup.to_string()));
        }

        // Records already hold tracking defaults for columns the upload lacked.
        for tracking in columns::TRACKING {
            if !header.iter().any(|c| c == tracking) {
                header.push(tracking.to_string());
            }
        }

        Ok(Self {
            columns: header,
            records,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn records(&self) -> &[EpisodeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.title.as_str())
    }

    /// Look up an episode by exact title.
    pub fn find(&self, title: &str) -> Option<&EpisodeRecord> {
        self.records.iter().find(|r| r.title == title)
    }

    pub fn find_mut(&mut self, title: &str) -> Option<&mut EpisodeRecord> {
        self.records.iter_mut().find(|r| r.title == title)
    }

    pub fn analyzed_count(&self) -> usize {
        self.records.iter().filter(|r| r.analyzed).count()
    }

    pub fn pending_count(&self) -> usize {
        self.len() - self.analyzed_count()
    }

    /// Whether pre-computed keyword columns were uploaded.
    pub fn has_important_words(&self) -> bool {
        self.has_column(columns::IMPORTANT_WORDS)
    }

    pub fn analysis_summary(&self) -> AnalysisSummary {
        let (analyzed, pending): (Vec<_>, Vec<_>) = self
            .records
            .iter()
            .enumerate()
            .map(|(i, r)| (i + 1, r.analyzed))
            .partition(|(_, analyzed)| *analyzed);
        let analyzed_episodes: Vec<usize> = analyzed.into_iter().map(|(i, _)| i).collect();
        let not_analyzed_episodes: Vec<usize> = pending.into_iter().map(|(i, _)| i).collect();
        AnalysisSummary {
            total_episodes: self.len(),
            analyzed_count: analyzed_episodes.len(),
            not_analyzed_count: not_analyzed_episodes.len(),
            analyzed_episodes,
            not_analyzed_episodes,
        }
    }

    pub fn display_rows(&self) -> Vec<DisplayRow> {
        self.records
            .iter()
            .map(|r| DisplayRow {
                title: r.title.clone(),
                description: r.description.clone(),
                analyzed: r.analyzed,
                query_count: r.query_count(),
                added_queries: r.added_queries().to_string(),
            })
            .collect()
    }
}

/// Rename blank and repeated header cells the way spreadsheet exports are
/// usually read back.
///
/// A blank name at position `i` becomes `Unnamed: i`. Later copies of a name
/// get `.1`, `.2`, ... appended, skipping suffixes already taken.
pub(crate) fn unique_column_names(header: Vec<String>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    header
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let mut name = if name.is_empty() {
                format!("Unnamed: {i}")
            } else {
                name
            };
            let mut count = counts.get(&name).copied().unwrap_or(0);
            while count > 0 {
                counts.insert(name.clone(), count + 1);
                name = format!("{name}.{count}");
                count = counts.get(&name).copied().unwrap_or(0);
            }
            counts.insert(name.clone(), 1);
            name
        })
        .collect()
}
