//! Keyword suggestions for a single episode
//!
//! Runs each `Important Words N` column through extraction and expansion.
//! The general `Important Words` column is only extracted; it is shown as-is
//! next to the per-length groups.

use crate::table::EpisodeRecord;
use crate::text::{clean_text, expand, extract_words, RawField};
use serde::{Deserialize, Serialize};

/// Extracted words and their planner phrases for one keyword column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordGroup {
    pub words: Vec<String>,
    pub variants: Vec<String>,
    pub planner_text: String,
}

impl KeywordGroup {
    pub fn from_field(field: &RawField) -> Self {
        let words = extract_words(field);
        let expansion = expand(&words);
        Self {
            words,
            variants: expansion.variants,
            planner_text: expansion.planner_text,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Everything shown for one episode on the results view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeSuggestions {
    pub title: String,
    /// Description with links, markup and symbols removed
    pub description: String,
    pub one_word: KeywordGroup,
    pub two_word: KeywordGroup,
    pub three_word: KeywordGroup,
    pub general_words: Vec<String>,
    pub analyzed: bool,
    pub query_count: usize,
}

impl EpisodeSuggestions {
    pub fn for_record(record: &EpisodeRecord) -> Self {
        let words = &record.important_words;
        Self {
            title: record.title.clone(),
            description: clean_text(&record.description),
            one_word: KeywordGroup::from_field(&words.one_word),
            two_word: KeywordGroup::from_field(&words.two_word),
            three_word: KeywordGroup::from_field(&words.three_word),
            general_words: extract_words(&words.general),
            analyzed: record.analyzed,
            query_count: record.query_count(),
        }
    }
}
