//! Text cleanup for free-form episode fields
//!
//! Descriptions arrive straight from podcast feeds and carry links, contact
//! addresses, leftover markup and emoji. `clean_text` reduces them to plain
//! ASCII prose with single spaces.

use regex::Regex;
use std::fmt::Display;
use std::sync::LazyLock;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"http\S+|www\S+|https\S+").unwrap());
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\S+@\S+").unwrap());
static HTML_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<.*?>").unwrap());
static NON_ASCII_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\x00-\x7F]+").unwrap());

/// Strip URLs, emails, HTML tags and non-ASCII runs, then collapse whitespace.
///
/// Each removed fragment is replaced by a space before collapsing, so words on
/// either side of a removed token never fuse together.
pub fn clean_text(text: &str) -> String {
    let text = URL_RE.replace_all(text, " ");
    let text = EMAIL_RE.replace_all(&text, " ");
    let text = HTML_TAG_RE.replace_all(&text, " ");
    let text = NON_ASCII_RE.replace_all(&text, " ");
    collapse_whitespace(&text)
}

/// Clean any displayable value by coercing it to a string first.
pub fn clean_value<T: Display + ?Sized>(value: &T) -> String {
    clean_text(&value.to_string())
}

/// Collapse whitespace runs into single spaces and trim both ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scheme_and_www_links() {
        let cleaned = clean_text("listen at http://x.example/ep1 or www.x.example today");
        assert!(!cleaned.contains("http://x"));
        assert!(!cleaned.contains("www.x"));
        assert_eq!(cleaned, "listen at or today");
    }

    #[test]
    fn strips_https_links_glued_to_text() {
        assert_eq!(clean_text("show notes:https://pod.fm/notes"), "show notes:");
    }

    #[test]
    fn strips_email_addresses() {
        assert_eq!(
            clean_text("write to host@pod.fm with questions"),
            "write to with questions"
        );
    }

    #[test]
    fn strips_html_tags_non_greedy() {
        assert_eq!(
            clean_text("<p>Great <b>guest</b> this week</p>"),
            "Great guest this week"
        );
    }

    #[test]
    fn strips_emoji_and_symbols() {
        assert_eq!(clean_text("new episode 🎙️✨ out now"), "new episode out now");
        assert_eq!(clean_text("café"), "caf");
    }

    #[test]
    fn collapses_whitespace_and_trims() {
        assert_eq!(clean_text("  a \t\n b   c  "), "a b c");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text("   "), "");
        assert_eq!(clean_text("🎧"), "");
    }

    #[test]
    fn coerces_non_string_values() {
        assert_eq!(clean_value(&42), "42");
        assert_eq!(clean_value(&1.5f64), "1.5");
        assert_eq!(clean_value("plain"), "plain");
    }
}
