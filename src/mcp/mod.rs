//! MCP server for podplanner: exposes episode upload, keyword suggestions,
//! analysis tracking and query editing via the Model Context Protocol.
//!
//! Every tool except `open_session` takes the session token that
//! `open_session` hands out. Failures come back as
//! `{"success": false, "kind": ..., "error": ...}`.

pub mod params;

use params::*;
use crate::api::{ApiError, EpisodeApi, ErrorKind};
use crate::config::Config;
use crate::store::{Identity, SessionStore};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn ok_json(value: Value) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(pretty(&value))]))
}

fn err_json(value: Value) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::error(vec![Content::text(pretty(&value))]))
}

fn failure_json(kind: ErrorKind, message: &str) -> Value {
    json!({ "success": false, "kind": kind, "error": message })
}

fn api_failure(err: ApiError) -> Result<CallToolResult, McpError> {
    err_json(failure_json(err.kind(), &err.to_string()))
}

/// Resolve an upload to `(filename, bytes)` from either a path or inline text.
fn upload_source(p: &UploadCsvParams) -> Result<(String, Vec<u8>), String> {
    match (&p.path, &p.content) {
        (Some(path), _) => {
            let path = Path::new(path);
            let bytes = std::fs::read(path)
                .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
            let filename = p
                .filename
                .clone()
                .or_else(|| path.file_name().map(|n| n.to_string_lossy().into_owned()))
                .ok_or_else(|| format!("cannot derive a file name from {}", path.display()))?;
            Ok((filename, bytes))
        }
        (None, Some(content)) => {
            let filename = p
                .filename
                .clone()
                .ok_or_else(|| "filename is required with content".to_string())?;
            Ok((filename, content.as_bytes().to_vec()))
        }
        (None, None) => Err("either path or content is required".to_string()),
    }
}

// ---------------------------------------------------------------------------
// PodplannerMcpServer
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct PodplannerMcpServer {
    api: EpisodeApi,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl PodplannerMcpServer {
    pub fn new(api: EpisodeApi) -> Self {
        Self {
            api,
            tool_router: Self::tool_router(),
        }
    }

    // ── Session tools ───────────────────────────────────────────────────

    #[tool(description = "Start a new session and return its token")]
    fn open_session(&self) -> Result<CallToolResult, McpError> {
        let identity = self.api.new_identity();
        ok_json(json!({ "success": true, "session": identity }))
    }

    #[tool(description = "Upload an episode CSV (Title and Description columns required)")]
    fn upload_csv(
        &self,
        Parameters(p): Parameters<UploadCsvParams>,
    ) -> Result<CallToolResult, McpError> {
        let (filename, bytes) = match upload_source(&p) {
            Ok(source) => source,
            Err(msg) => return err_json(failure_json(ErrorKind::InvalidInput, &msg)),
        };
        let identity = Identity::from(p.session);
        match self.api.upload_csv(&identity, &filename, &bytes) {
            Ok(overview) => ok_json(json!({
                "success": true,
                "message": "CSV uploaded successfully.",
                "overview": overview,
            })),
            Err(e) => api_failure(e),
        }
    }

    #[tool(description = "Show the uploaded table: file name, size, columns and tracking columns per episode")]
    fn table_overview(
        &self,
        Parameters(p): Parameters<SessionParams>,
    ) -> Result<CallToolResult, McpError> {
        let identity = Identity::from(p.session);
        match self.api.table_overview(&identity) {
            Some(overview) => ok_json(json!({ "success": true, "overview": overview })),
            None => ok_json(json!({ "success": true, "overview": null })),
        }
    }

    #[tool(description = "List episode titles with 1-based positions and analysis progress")]
    fn results_overview(
        &self,
        Parameters(p): Parameters<SessionParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.api.results_overview(&Identity::from(p.session)) {
            Ok(results) => ok_json(json!({ "success": true, "results": results })),
            Err(e) => api_failure(e),
        }
    }

    // ── Episode tools ───────────────────────────────────────────────────

    #[tool(description = "Keyword suggestions and planner text for one episode")]
    fn get_suggestions(
        &self,
        Parameters(p): Parameters<EpisodeParams>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .api
            .episode_suggestions(&Identity::from(p.session), &p.title)
        {
            Ok(suggestions) => ok_json(json!({ "success": true, "suggestions": suggestions })),
            Err(e) => api_failure(e),
        }
    }

    #[tool(description = "Set or toggle whether an episode has been analyzed")]
    fn mark_episode_analyzed(
        &self,
        Parameters(p): Parameters<MarkAnalyzedParams>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .api
            .set_analyzed(&Identity::from(p.session), &p.title, p.value)
        {
            Ok(analyzed) => ok_json(json!({ "success": true, "Analyzed": analyzed })),
            Err(e) => api_failure(e),
        }
    }

    #[tool(description = "Attach a search query to an episode")]
    fn add_query(
        &self,
        Parameters(p): Parameters<QueryParams>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .api
            .add_query(&Identity::from(p.session), &p.title, &p.query)
        {
            Ok(update) => ok_json(json!({
                "success": true,
                "saved_count": update.count,
                "saved_queries": update.queries,
            })),
            Err(e) => api_failure(e),
        }
    }

    #[tool(description = "Remove a search query from an episode")]
    fn remove_query(
        &self,
        Parameters(p): Parameters<QueryParams>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .api
            .remove_query(&Identity::from(p.session), &p.title, &p.query)
        {
            Ok(update) => ok_json(json!({
                "success": true,
                "saved_count": update.count,
                "saved_queries": update.queries,
            })),
            Err(e) => api_failure(e),
        }
    }

    #[tool(description = "Analyzed flag and saved queries of one episode")]
    fn get_episode_status(
        &self,
        Parameters(p): Parameters<EpisodeParams>,
    ) -> Result<CallToolResult, McpError> {
        let status = self
            .api
            .episode_status(&Identity::from(p.session), &p.title);
        ok_json(json!({
            "Analyzed": status.analyzed,
            "saved_count": status.count,
            "saved_queries": status.queries,
        }))
    }

    #[tool(description = "Which episodes are analyzed and which are pending (1-based positions)")]
    fn get_analysis_status(
        &self,
        Parameters(p): Parameters<SessionParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.api.analysis_summary(&Identity::from(p.session)) {
            Ok(summary) => ok_json(json!(summary)),
            Err(e) => api_failure(e),
        }
    }

    // ── Export tools ────────────────────────────────────────────────────

    #[tool(description = "Export the annotated table as CSV, inline or into a directory")]
    fn export_csv(
        &self,
        Parameters(p): Parameters<ExportParams>,
    ) -> Result<CallToolResult, McpError> {
        let exported = match self.api.export_table(&Identity::from(p.session)) {
            Ok(exported) => exported,
            Err(e) => return api_failure(e),
        };

        match p.out_dir {
            Some(dir) => {
                let path = PathBuf::from(dir).join(&exported.filename);
                match std::fs::write(&path, &exported.csv) {
                    Ok(()) => ok_json(json!({
                        "success": true,
                        "filename": exported.filename,
                        "path": path.display().to_string(),
                    })),
                    Err(e) => err_json(failure_json(
                        ErrorKind::InvalidInput,
                        &format!("failed to write {}: {}", path.display(), e),
                    )),
                }
            }
            None => ok_json(json!({
                "success": true,
                "filename": exported.filename,
                "csv": String::from_utf8_lossy(&exported.csv),
            })),
        }
    }
}

#[tool_handler]
impl ServerHandler for PodplannerMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "podplanner MCP server: upload an episode CSV, review keyword suggestions, track analyzed episodes and saved search queries, then export the annotated CSV. Call open_session first."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run_mcp_server(config: &Config) -> i32 {
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to create tokio runtime");
            return 1;
        }
    };

    let store = Arc::new(SessionStore::from_config(&config.store));
    let server = PodplannerMcpServer::new(EpisodeApi::new(store));

    rt.block_on(async move {
        info!(
            ttl_secs = config.store.ttl_secs,
            capacity = config.store.capacity,
            "podplanner mcp server starting on stdio"
        );

        let service = match server.serve(rmcp::transport::stdio()).await {
            Ok(s) => s,
            Err(e) => {
                error!(error = %e, "failed to start MCP server");
                return 1;
            }
        };

        if let Err(e) = service.waiting().await {
            error!(error = %e, "MCP server error");
            return 1;
        }

        0
    })
}
