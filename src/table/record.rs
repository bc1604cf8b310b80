//! Episode records: one typed row of an uploaded table

use crate::text::{QueryList, RawField};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Column names the core understands.
pub mod columns {
    pub const TITLE: &str = "Title";
    pub const DESCRIPTION: &str = "Description";
    pub const ANALYZED: &str = "Analyzed";
    pub const QUERY_COUNT: &str = "No of Queries";
    pub const ADDED_QUERIES: &str = "Added Queries";
    pub const IMPORTANT_WORDS: &str = "Important Words";
    pub const IMPORTANT_WORDS_1: &str = "Important Words 1";
    pub const IMPORTANT_WORDS_2: &str = "Important Words 2";
    pub const IMPORTANT_WORDS_3: &str = "Important Words 3";

    /// Columns that must be present in every upload.
    pub const REQUIRED: [&str; 2] = [TITLE, DESCRIPTION];

    /// Tracking columns, appended in this order when an upload lacks them.
    pub const TRACKING: [&str; 3] = [ANALYZED, QUERY_COUNT, ADDED_QUERIES];

    /// Columns shown in the table overview.
    pub const DISPLAY: [&str; 5] = [TITLE, DESCRIPTION, ANALYZED, QUERY_COUNT, ADDED_QUERIES];
}

/// Pre-computed keyword columns. Any of them may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportantWords {
    pub general: RawField,
    pub one_word: RawField,
    pub two_word: RawField,
    pub three_word: RawField,
}

impl ImportantWords {
    fn slot(&self, column: &str) -> Option<&RawField> {
        match column {
            columns::IMPORTANT_WORDS => Some(&self.general),
            columns::IMPORTANT_WORDS_1 => Some(&self.one_word),
            columns::IMPORTANT_WORDS_2 => Some(&self.two_word),
            columns::IMPORTANT_WORDS_3 => Some(&self.three_word),
            _ => None,
        }
    }

    fn slot_mut(&mut self, column: &str) -> Option<&mut RawField> {
        match column {
            columns::IMPORTANT_WORDS => Some(&mut self.general),
            columns::IMPORTANT_WORDS_1 => Some(&mut self.one_word),
            columns::IMPORTANT_WORDS_2 => Some(&mut self.two_word),
            columns::IMPORTANT_WORDS_3 => Some(&mut self.three_word),
            _ => None,
        }
    }
}

/// One episode row.
///
/// Known columns get typed fields; everything else the upload carried is kept
/// in `extra` so an export reproduces it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub title: String,
    pub description: String,
    pub analyzed: bool,
    query_count: usize,
    added_queries: String,
    pub important_words: ImportantWords,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, RawField>,
}

impl EpisodeRecord {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn with_important_words(mut self, column: &str, field: impl Into<RawField>) -> Self {
        if let Some(slot) = self.important_words.slot_mut(column) {
            *slot = field.into();
        }
        self
    }

    /// Build a record from a row aligned with `columns`.
    ///
    /// Missing trailing cells are treated as absent; surplus cells are ignored.
    pub(crate) fn from_row(columns: &[String], row: Vec<RawField>) -> Self {
        let mut record = Self::default();
        let mut cells = row.into_iter();
        for column in columns {
            let cell = cells.next().unwrap_or_default();
            record.set_cell(column, cell);
        }
        record
    }

    fn set_cell(&mut self, column: &str, cell: RawField) {
        match column {
            columns::TITLE => self.title = text_or_empty(cell),
            columns::DESCRIPTION => self.description = text_or_empty(cell),
            columns::ANALYZED => self.analyzed = parse_flag(&cell),
            columns::QUERY_COUNT => self.query_count = parse_count(&cell),
            // Lists and other non-text values carry no stored queries.
            columns::ADDED_QUERIES => {
                self.added_queries = cell.as_text().map(str::to_string).unwrap_or_default()
            }
            other => match self.important_words.slot_mut(other) {
                Some(slot) => *slot = cell,
                None => {
                    self.extra.insert(other.to_string(), cell);
                }
            },
        }
    }

    /// Render the value of `column` as a CSV cell.
    pub fn cell(&self, column: &str) -> String {
        match column {
            columns::TITLE => self.title.clone(),
            columns::DESCRIPTION => self.description.clone(),
            columns::ANALYZED => flag_cell(self.analyzed).to_string(),
            columns::QUERY_COUNT => self.query_count.to_string(),
            columns::ADDED_QUERIES => self.added_queries.clone(),
            other => self
                .important_words
                .slot(other)
                .or_else(|| self.extra.get(other))
                .map(RawField::to_cell)
                .unwrap_or_default(),
        }
    }

    /// Stored query count (`No of Queries`).
    pub fn query_count(&self) -> usize {
        self.query_count
    }

    /// Raw `Added Queries` cell.
    pub fn added_queries(&self) -> &str {
        &self.added_queries
    }

    /// Parsed `Added Queries`.
    pub fn queries(&self) -> QueryList {
        QueryList::parse(&self.added_queries)
    }

    /// Store a query list, keeping `No of Queries` equal to its length.
    pub fn set_queries(&mut self, queries: &QueryList) {
        self.added_queries = queries.to_cell();
        self.query_count = queries.len();
    }
}

fn text_or_empty(cell: RawField) -> String {
    match cell {
        RawField::Text(text) => text,
        RawField::Absent => String::new(),
        list @ RawField::List(_) => list.to_cell(),
    }
}

fn flag_cell(flag: bool) -> &'static str {
    if flag {
        "True"
    } else {
        "False"
    }
}

/// Accepts the spellings spreadsheet tools write for booleans.
fn parse_flag(cell: &RawField) -> bool {
    match cell.as_text().map(str::trim) {
        Some(text) => matches!(
            text.to_ascii_lowercase().as_str(),
            "true" | "1" | "1.0" | "yes" | "y"
        ),
        None => false,
    }
}

/// Non-negative integer cell. Float spellings (`"3.0"`) are accepted because
/// a column with gaps is often written as floats.
fn parse_count(cell: &RawField) -> usize {
    let Some(text) = cell.as_text().map(str::trim) else {
        return 0;
    };
    if let Ok(count) = text.parse::<usize>() {
        return count;
    }
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value as usize,
        _ => 0,
    }
}
