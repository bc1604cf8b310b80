//! Word-list extraction from semi-structured cells
//!
//! Keyword columns reach us in three shapes: a real list (JSON uploads), a
//! list that was flattened into its bracketed repr by whatever produced the
//! CSV, or plain comma/space separated text. `RawField` tags the shape at the
//! ingestion boundary and `extract_words` applies one policy per shape.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Characters stripped from list items left over from a flattened list.
const LIST_PUNCTUATION: &[char] = &['\'', '"', '[', ']'];

/// Cell values that spreadsheet tools and dataframe exports write for a
/// missing value. Matched exactly, without trimming.
const NA_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// A single cell as it arrived, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "Value")]
pub enum RawField {
    Text(String),
    List(Vec<String>),
    /// Missing, empty or NaN
    #[default]
    Absent,
}

impl RawField {
    /// Build a field from a CSV cell. Empty cells and NA markers are absent.
    pub fn from_cell(cell: &str) -> Self {
        if cell.is_empty() || NA_MARKERS.contains(&cell) {
            RawField::Absent
        } else {
            RawField::Text(cell.to_string())
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, RawField::Absent)
    }

    /// The text payload, if this is a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawField::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Render the field back into a single CSV cell.
    ///
    /// Lists are written in their bracketed form (`['a', 'b']`) so a later
    /// upload of the exported file extracts the same words.
    pub fn to_cell(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RawField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawField::Text(text) => f.write_str(text),
            RawField::Absent => Ok(()),
            RawField::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    if item.contains('\'') && !item.contains('"') {
                        write!(f, "\"{}\"", item)?;
                    } else {
                        write!(f, "'{}'", item)?;
                    }
                }
                f.write_str("]")
            }
        }
    }
}

impl From<&str> for RawField {
    fn from(s: &str) -> Self {
        RawField::Text(s.to_string())
    }
}

impl From<String> for RawField {
    fn from(s: String) -> Self {
        RawField::Text(s)
    }
}

impl From<Vec<String>> for RawField {
    fn from(items: Vec<String>) -> Self {
        RawField::List(items)
    }
}

impl<T: Into<RawField>> From<Option<T>> for RawField {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(RawField::Absent)
    }
}

/// JSON uploads: strings and arrays keep their shape, everything else
/// (null, numbers, booleans, objects) carries no words.
impl From<Value> for RawField {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => RawField::Text(s),
            Value::Array(items) => RawField::List(
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(s) => s,
                        Value::Null => String::new(),
                        other => other.to_string(),
                    })
                    .collect(),
            ),
            _ => RawField::Absent,
        }
    }
}

impl Serialize for RawField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RawField::Text(text) => serializer.serialize_str(text),
            RawField::List(items) => items.serialize(serializer),
            RawField::Absent => serializer.serialize_none(),
        }
    }
}

/// Recover the ordered word list held in a cell.
///
/// Never fails: malformed input degrades to fewer (or no) words.
pub fn extract_words(field: &RawField) -> Vec<String> {
    match field {
        RawField::Absent => Vec::new(),
        RawField::Text(text) if text.is_empty() => Vec::new(),
        RawField::Text(text) => {
            // Flattened list repr. Any apostrophe counts, even inside prose.
            if text.starts_with('[') || text.contains('\'') {
                let inner = text
                    .strip_prefix('[')
                    .and_then(|rest| rest.strip_suffix(']'))
                    .unwrap_or(text);
                inner.split(',').filter_map(clean_list_item).collect()
            } else if text.contains(',') {
                text.split(',')
                    .map(str::trim)
                    .filter(|word| !word.is_empty())
                    .map(str::to_string)
                    .collect()
            } else {
                text.split_whitespace().map(str::to_string).collect()
            }
        }
        RawField::List(items) => items.iter().filter_map(|item| clean_list_item(item)).collect(),
    }
}

/// Strip whitespace and list punctuation from one item; `None` when nothing
/// is left.
fn clean_list_item(item: &str) -> Option<String> {
    let stripped = strip_list_punctuation(item);
    let cleaned = stripped.trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Trim, strip quote/bracket characters from both ends, then drop any that
/// remain inside the item.
pub(crate) fn strip_list_punctuation(item: &str) -> String {
    item.trim()
        .trim_matches(LIST_PUNCTUATION)
        .replace(LIST_PUNCTUATION, "")
}
