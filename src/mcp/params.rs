//! MCP tool parameter structs with schemars-derived JSON schemas.

use schemars::JsonSchema;
use serde::Deserialize;

// ── Session params ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SessionParams {
    #[schemars(description = "Session token returned by open_session")]
    pub session: String,
}

// ── Upload params ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UploadCsvParams {
    #[schemars(description = "Session token returned by open_session")]
    pub session: String,
    #[schemars(description = "Path to a CSV file to read (alternative to content)")]
    pub path: Option<String>,
    #[schemars(description = "CSV text with at least Title and Description columns")]
    pub content: Option<String>,
    #[schemars(description = "File name to record; defaults to the name in path. Must end in .csv")]
    pub filename: Option<String>,
}

// ── Episode params ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize, JsonSchema)]
pub struct EpisodeParams {
    #[schemars(description = "Session token returned by open_session")]
    pub session: String,
    #[schemars(description = "Exact episode title")]
    pub title: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct MarkAnalyzedParams {
    #[schemars(description = "Session token returned by open_session")]
    pub session: String,
    #[schemars(description = "Exact episode title")]
    pub title: String,
    #[schemars(description = "New value; the flag is toggled when omitted")]
    pub value: Option<bool>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct QueryParams {
    #[schemars(description = "Session token returned by open_session")]
    pub session: String,
    #[schemars(description = "Exact episode title")]
    pub title: String,
    #[schemars(description = "Search query (no commas)")]
    pub query: String,
}

// ── Export params ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExportParams {
    #[schemars(description = "Session token returned by open_session")]
    pub session: String,
    #[schemars(description = "Directory to write the CSV into; returned inline when omitted")]
    pub out_dir: Option<String>,
}
