//! Keyword expansion into "podcast" search phrases
//!
//! Every extracted word becomes two planner phrases, `<word> podcast` and
//! `<word> podcasts`. The phrases are produced both as a list (for display)
//! and as one comma-joined blob ready to paste into a keyword planner.

use serde::{Deserialize, Serialize};

use super::normalize::collapse_whitespace;
use super::words::strip_list_punctuation;

/// Phrase variants and planner text for one word list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordExpansion {
    /// `"<w> podcast"`, `"<w> podcasts"` per word, interleaved in word order
    pub variants: Vec<String>,
    /// `"<w> podcast, <w> podcasts"` groups joined by `", "`
    pub planner_text: String,
}

/// Expand a word list into variants and planner text.
pub fn expand<S: AsRef<str>>(words: &[S]) -> KeywordExpansion {
    KeywordExpansion {
        variants: podcast_variations(words),
        planner_text: planner_text(words),
    }
}

/// Suffix each word with "podcast" and "podcasts".
///
/// Words are used as given; cleaning only applies to the planner text.
pub fn podcast_variations<S: AsRef<str>>(words: &[S]) -> Vec<String> {
    words
        .iter()
        .flat_map(|word| {
            let word = word.as_ref();
            [format!("{word} podcast"), format!("{word} podcasts")]
        })
        .collect()
}

/// Clean a single word for planner display.
pub fn planner_word(word: &str) -> String {
    collapse_whitespace(&strip_list_punctuation(word))
}

/// Build the comma-joined planner text.
pub fn planner_text<S: AsRef<str>>(words: &[S]) -> String {
    let text = words
        .iter()
        .map(|word| planner_word(word.as_ref()))
        .filter(|word| !word.is_empty())
        .map(|word| format!("{word} podcast, {word} podcasts"))
        .collect::<Vec<_>>()
        .join(", ");
    collapse_whitespace(&text)
}
