//! Text processing for episode fields
//!
//! Leaf helpers shared by the table and suggestion layers. None of them fail:
//! unreliable upstream data degrades to empty results instead of errors.

pub mod expand;
pub mod normalize;
pub mod queries;
pub mod words;

pub use expand::{expand, planner_text, planner_word, podcast_variations, KeywordExpansion};
pub use normalize::{clean_text, clean_value, collapse_whitespace};
pub use queries::{add_query, remove_query, QueryList};
pub use words::{extract_words, RawField};
