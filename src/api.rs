//! Transport-independent API layer.
//!
//! `EpisodeApi` is the single entry point for all consumer-facing operations.
//! Transports (MCP, the CLI, an HTTP front end) call `EpisodeApi` methods with
//! an [`Identity`] and plain values; they never reach into the
//! [`SessionStore`] directly.
//!
//! Every failure comes back as an [`ApiError`]. Nothing here panics on user
//! data.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::store::{BundleUpdate, Identity, ProcessingState, SessionStore};
use crate::suggest::EpisodeSuggestions;
use crate::table::{
    columns, download_filename, read_csv, AnalysisSummary, DisplayRow, EpisodeRecord,
    EpisodeTable, RawTable, SchemaError,
};

const NO_TABLE: &str = "No CSV uploaded yet.";

/// Errors returned by [`EpisodeApi`].
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Error processing CSV file: {0}")]
    Csv(#[from] csv::Error),
}

/// Coarse classification of an [`ApiError`], stable across messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    SchemaError,
    NotFound,
    InvalidInput,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::SchemaError => "schema_error",
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidInput => "invalid_input",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Schema(_) => ErrorKind::SchemaError,
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::InvalidInput(_) | ApiError::Csv(_) => ErrorKind::InvalidInput,
        }
    }

    fn no_table() -> Self {
        ApiError::NotFound(NO_TABLE.to_string())
    }

    fn unknown_title(title: &str) -> Self {
        ApiError::NotFound(format!("Invalid title: {title}"))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Home-page view of the stored table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOverview {
    pub filename: Option<String>,
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<String>,
    pub display_columns: Vec<String>,
    pub rows: Vec<DisplayRow>,
}

impl TableOverview {
    fn new(filename: Option<String>, table: &EpisodeTable) -> Self {
        Self {
            filename,
            row_count: table.len(),
            column_count: table.column_count(),
            columns: table.columns().to_vec(),
            display_columns: columns::DISPLAY.iter().map(|c| c.to_string()).collect(),
            rows: table.display_rows(),
        }
    }
}

/// Episode title with its 1-based position in the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedTitle {
    pub index: usize,
    pub title: String,
}

/// Results-page view: titles to pick from plus progress counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultsOverview {
    pub titles: Vec<IndexedTitle>,
    pub analyzed_count: usize,
    pub total_episodes: usize,
    /// Whether the table carries an `Important Words` column
    pub download_ready: bool,
}

/// Query list of one episode after an add or remove.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryUpdate {
    pub count: usize,
    pub queries: Vec<String>,
}

/// Tracking state of one episode. All zero when nothing is known.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeStatus {
    pub analyzed: bool,
    pub count: usize,
    pub queries: Vec<String>,
}

impl EpisodeStatus {
    fn for_record(record: &EpisodeRecord) -> Self {
        let queries = record.queries();
        Self {
            analyzed: record.analyzed,
            count: queries.len(),
            queries: queries.into_vec(),
        }
    }
}

/// A rendered CSV download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedTable {
    pub filename: String,
    pub csv: Vec<u8>,
}

/// Single entry point for all consumer-facing operations.
#[derive(Debug, Clone, Default)]
pub struct EpisodeApi {
    store: Arc<SessionStore>,
}

impl EpisodeApi {
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Issue a fresh identity. Nothing is stored until the first write.
    pub fn new_identity(&self) -> Identity {
        Identity::new()
    }

    // --- Write ---

    /// Validate and store a table, replacing whatever the identity had.
    ///
    /// On error nothing is stored and any previous table stays in place.
    pub fn ingest_table(
        &self,
        identity: &Identity,
        filename: &str,
        raw: RawTable,
    ) -> ApiResult<EpisodeTable> {
        let table = EpisodeTable::from_raw(raw).map_err(|e| {
            warn!(identity = %identity, filename = %filename, error = %e, "rejected upload");
            e
        })?;

        self.store.put(
            identity,
            BundleUpdate::new()
                .with_table(table.clone())
                .with_uploaded_filename(filename)
                .with_current_csv_file(filename)
                .with_processing_state(ProcessingState::new()),
        );
        info!(
            identity = %identity,
            filename = %filename,
            rows = table.len(),
            columns = table.column_count(),
            "ingested episode table"
        );
        Ok(table)
    }

    /// Parse an uploaded CSV file and ingest it.
    pub fn upload_csv(
        &self,
        identity: &Identity,
        filename: &str,
        bytes: &[u8],
    ) -> ApiResult<TableOverview> {
        if !filename.ends_with(".csv") {
            warn!(identity = %identity, filename = %filename, "rejected non-CSV upload");
            return Err(ApiError::InvalidInput(
                "Please upload a valid CSV file.".to_string(),
            ));
        }
        let raw = read_csv(bytes).map_err(|e| {
            warn!(identity = %identity, filename = %filename, error = %e, "unreadable CSV");
            e
        })?;
        let table = self.ingest_table(identity, filename, raw)?;
        Ok(TableOverview::new(Some(filename.to_string()), &table))
    }

    /// Set or toggle the `Analyzed` flag of one episode. Returns the new value.
    pub fn set_analyzed(
        &self,
        identity: &Identity,
        title: &str,
        value: Option<bool>,
    ) -> ApiResult<bool> {
        let analyzed = self.mutate_table(identity, |table| {
            let record = find_episode_mut(table, title)?;
            record.analyzed = value.unwrap_or(!record.analyzed);
            Ok(record.analyzed)
        })?;
        debug!(identity = %identity, title = %title, analyzed, "set analyzed");
        Ok(analyzed)
    }

    /// Attach a search query to an episode. Adding an existing query is a no-op.
    pub fn add_query(&self, identity: &Identity, title: &str, query: &str) -> ApiResult<QueryUpdate> {
        self.edit_queries(identity, title, query, QueryEdit::Add)
    }

    /// Detach every copy of a query from an episode.
    pub fn remove_query(
        &self,
        identity: &Identity,
        title: &str,
        query: &str,
    ) -> ApiResult<QueryUpdate> {
        self.edit_queries(identity, title, query, QueryEdit::Remove)
    }

    // --- Read ---

    /// Overview of the stored table, if any.
    pub fn table_overview(&self, identity: &Identity) -> Option<TableOverview> {
        self.store
            .read(identity, |bundle| {
                bundle
                    .table
                    .as_ref()
                    .map(|table| TableOverview::new(bundle.uploaded_filename.clone(), table))
            })
            .flatten()
    }

    pub fn results_overview(&self, identity: &Identity) -> ApiResult<ResultsOverview> {
        self.with_table(identity, |table| {
            Ok(ResultsOverview {
                titles: table
                    .titles()
                    .enumerate()
                    .map(|(i, title)| IndexedTitle {
                        index: i + 1,
                        title: title.to_string(),
                    })
                    .collect(),
                analyzed_count: table.analyzed_count(),
                total_episodes: table.len(),
                download_ready: table.has_important_words(),
            })
        })
    }

    pub fn episode_suggestions(
        &self,
        identity: &Identity,
        title: &str,
    ) -> ApiResult<EpisodeSuggestions> {
        self.with_table(identity, |table| {
            find_episode(table, title).map(EpisodeSuggestions::for_record)
        })
    }

    /// Tracking state of one episode. Never fails.
    pub fn episode_status(&self, identity: &Identity, title: &str) -> EpisodeStatus {
        let title = title.trim();
        self.with_table(identity, |table| find_episode(table, title).map(EpisodeStatus::for_record))
            .unwrap_or_default()
    }

    pub fn analysis_summary(&self, identity: &Identity) -> ApiResult<AnalysisSummary> {
        self.with_table(identity, |table| Ok(table.analysis_summary()))
    }

    /// Render the stored table as a CSV download.
    pub fn export_table(&self, identity: &Identity) -> ApiResult<ExportedTable> {
        let exported = self
            .store
            .read(identity, |bundle| -> ApiResult<ExportedTable> {
                let table = bundle.table.as_ref().ok_or_else(ApiError::no_table)?;
                let uploaded = bundle
                    .uploaded_filename
                    .as_deref()
                    .ok_or_else(|| ApiError::NotFound("No uploaded filename.".to_string()))?;
                Ok(ExportedTable {
                    filename: download_filename(
                        uploaded,
                        table.analyzed_count(),
                        table.pending_count(),
                    ),
                    csv: table.to_csv()?,
                })
            })
            .unwrap_or_else(|| Err(ApiError::no_table()))?;

        info!(
            identity = %identity,
            filename = %exported.filename,
            bytes = exported.csv.len(),
            "exported episode table"
        );
        Ok(exported)
    }

    // --- Helpers ---

    fn with_table<R>(
        &self,
        identity: &Identity,
        f: impl FnOnce(&EpisodeTable) -> ApiResult<R>,
    ) -> ApiResult<R> {
        self.store
            .read(identity, |bundle| bundle.table.as_ref().map(f))
            .flatten()
            .unwrap_or_else(|| Err(ApiError::no_table()))
    }

    /// Read-modify-write of the identity's table under its store lock.
    ///
    /// The table is changed in place, so `f` returns every error before it
    /// writes to the table.
    fn mutate_table<R>(
        &self,
        identity: &Identity,
        f: impl FnOnce(&mut EpisodeTable) -> ApiResult<R>,
    ) -> ApiResult<R> {
        self.store
            .update(identity, |bundle| match bundle.table.as_mut() {
                Some(table) => f(table),
                None => Err(ApiError::no_table()),
            })
            .unwrap_or_else(|| Err(ApiError::no_table()))
    }

    fn edit_queries(
        &self,
        identity: &Identity,
        title: &str,
        query: &str,
        edit: QueryEdit,
    ) -> ApiResult<QueryUpdate> {
        let (title, query) = (title.trim(), query.trim());
        let update = self.mutate_table(identity, |table| {
            if title.is_empty() || query.is_empty() {
                return Err(ApiError::InvalidInput("Invalid title or query".to_string()));
            }
            // A comma would split into several entries on the next parse.
            if query.contains(',') {
                return Err(ApiError::InvalidInput(format!(
                    "Query must not contain ',': {query}"
                )));
            }
            let record = find_episode_mut(table, title)?;
            let mut queries = record.queries();
            match edit {
                QueryEdit::Add => {
                    queries.add(query);
                }
                QueryEdit::Remove => {
                    queries.remove(query);
                }
            }
            record.set_queries(&queries);
            Ok(QueryUpdate {
                count: queries.len(),
                queries: queries.into_vec(),
            })
        })?;
        debug!(
            identity = %identity,
            title = %title,
            query = %query,
            edit = ?edit,
            count = update.count,
            "edited queries"
        );
        Ok(update)
    }
}

#[derive(Debug, Clone, Copy)]
enum QueryEdit {
    Add,
    Remove,
}

/// Episodes are addressed by exact title. Blank titles never match.
fn find_episode<'a>(table: &'a EpisodeTable, title: &str) -> ApiResult<&'a EpisodeRecord> {
    if title.trim().is_empty() {
        return Err(ApiError::unknown_title(title));
    }
    table.find(title).ok_or_else(|| ApiError::unknown_title(title))
}

fn find_episode_mut<'a>(
    table: &'a mut EpisodeTable,
    title: &str,
) -> ApiResult<&'a mut EpisodeRecord> {
    if title.trim().is_empty() {
        return Err(ApiError::unknown_title(title));
    }
    table.find_mut(title).ok_or_else(|| ApiError::unknown_title(title))
}
