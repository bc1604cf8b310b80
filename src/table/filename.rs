//! Download filenames that record analysis progress

use regex::Regex;
use std::sync::LazyLock;

static PROGRESS_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_\d+_rows_processed_\d+_rows_pending$").unwrap());

/// Name for an exported table: `<base>_<analyzed>_rows_processed_<pending>_rows_pending.csv`.
///
/// `base` is the uploaded name without its extension and without a progress
/// suffix from an earlier export, so re-exporting replaces the counts instead
/// of stacking them.
pub fn download_filename(uploaded: &str, analyzed: usize, pending: usize) -> String {
    let base = match uploaded.rsplit_once('.') {
        Some((base, _ext)) => base,
        None => uploaded,
    };
    let base = PROGRESS_SUFFIX_RE.replace(base, "");
    format!("{base}_{analyzed}_rows_processed_{pending}_rows_pending.csv")
}
