//! podplanner CLI: episode keyword planning with an MCP server.
//!
//! Usage:
//!   podplanner mcp [--transport stdio] [--config path]
//!   podplanner inspect <csv> [--json]
//!   podplanner suggest <csv> --title <title> [--json]
//!   podplanner export <csv> [--out-dir dir] [--analyzed <title>]...

use clap::{Parser, Subcommand};
use podplanner::mcp::run_mcp_server;
use podplanner::{Config, EpisodeApi, EpisodeSuggestions, Identity, KeywordGroup, SessionStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "podplanner",
    version,
    about = "Keyword planning for podcast episode tables"
)]
struct Cli {
    /// Path to a YAML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the MCP (Model Context Protocol) server
    Mcp {
        /// Transport type (currently only stdio)
        #[arg(long, default_value = "stdio")]
        transport: String,
    },
    /// Show the columns and tracking state of an episode CSV
    Inspect {
        /// Episode CSV file
        csv: PathBuf,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show keyword suggestions for one episode
    Suggest {
        /// Episode CSV file
        csv: PathBuf,
        /// Exact episode title
        #[arg(long)]
        title: String,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Write the annotated CSV with its progress file name
    Export {
        /// Episode CSV file
        csv: PathBuf,
        /// Output directory (defaults to the CSV's directory)
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Mark an episode as analyzed before exporting (repeatable)
        #[arg(long = "analyzed", value_name = "TITLE")]
        analyzed: Vec<String>,
    },
}

fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load a CSV into a fresh session of a throwaway store.
fn open_csv(config: &Config, path: &Path) -> Result<(EpisodeApi, Identity), String> {
    let bytes =
        std::fs::read(path).map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| format!("not a file: {}", path.display()))?;

    let api = EpisodeApi::new(Arc::new(SessionStore::from_config(&config.store)));
    let identity = api.new_identity();
    api.upload_csv(&identity, &filename, &bytes)
        .map_err(|e| e.to_string())?;
    Ok((api, identity))
}

fn print_json<T: serde::Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(text) => {
            println!("{}", text);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_inspect(config: &Config, csv: &Path, json: bool) -> i32 {
    let (api, identity) = match open_csv(config, csv) {
        Ok(opened) => opened,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let Some(overview) = api.table_overview(&identity) else {
        eprintln!("Error: no table loaded");
        return 1;
    };
    if json {
        return print_json(&overview);
    }

    println!(
        "{} ({} rows, {} columns)",
        overview.filename.as_deref().unwrap_or("-"),
        overview.row_count,
        overview.column_count
    );
    println!("Columns: {}", overview.columns.join(", "));
    println!();
    for row in &overview.rows {
        let mark = if row.analyzed { "x" } else { " " };
        println!("[{}] {} ({} queries)", mark, row.title, row.query_count);
        if !row.added_queries.is_empty() {
            println!("      {}", row.added_queries);
        }
    }
    0
}

fn print_group(label: &str, group: &KeywordGroup) {
    println!("{}:", label);
    if group.is_empty() {
        println!("  (none)");
        return;
    }
    println!("  words:   {}", group.words.join(", "));
    println!("  planner: {}", group.planner_text);
}

fn print_suggestions(s: &EpisodeSuggestions) {
    println!("{}", s.title);
    println!(
        "Analyzed: {}   Queries: {}",
        if s.analyzed { "yes" } else { "no" },
        s.query_count
    );
    if !s.description.is_empty() {
        println!();
        println!("{}", s.description);
    }
    println!();
    print_group("One word", &s.one_word);
    print_group("Two words", &s.two_word);
    print_group("Three words", &s.three_word);
    if !s.general_words.is_empty() {
        println!("Important words: {}", s.general_words.join(", "));
    }
}

fn cmd_suggest(config: &Config, csv: &Path, title: &str, json: bool) -> i32 {
    let (api, identity) = match open_csv(config, csv) {
        Ok(opened) => opened,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    match api.episode_suggestions(&identity, title) {
        Ok(suggestions) if json => print_json(&suggestions),
        Ok(suggestions) => {
            print_suggestions(&suggestions);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_export(config: &Config, csv: &Path, out_dir: Option<&Path>, analyzed: &[String]) -> i32 {
    let (api, identity) = match open_csv(config, csv) {
        Ok(opened) => opened,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    for title in analyzed {
        if let Err(e) = api.set_analyzed(&identity, title, Some(true)) {
            eprintln!("Error: {}", e);
            return 1;
        }
    }

    let exported = match api.export_table(&identity) {
        Ok(exported) => exported,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let dir = out_dir
        .map(Path::to_path_buf)
        .or_else(|| csv.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));
    let path = dir.join(&exported.filename);
    match std::fs::write(&path, &exported.csv) {
        Ok(()) => {
            println!("Wrote {}", path.display());
            0
        }
        Err(e) => {
            eprintln!("Error: failed to write {}: {}", path.display(), e);
            1
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    init_logging(&config.log_level);

    let code = match cli.command {
        Commands::Mcp { transport } => {
            if transport != "stdio" {
                eprintln!("Error: unsupported transport '{}' (only stdio)", transport);
                1
            } else {
                run_mcp_server(&config)
            }
        }
        Commands::Inspect { csv, json } => cmd_inspect(&config, &csv, json),
        Commands::Suggest { csv, title, json } => cmd_suggest(&config, &csv, &title, json),
        Commands::Export {
            csv,
            out_dir,
            analyzed,
        } => cmd_export(&config, &csv, out_dir.as_deref(), &analyzed),
    };

    std::process::exit(code);
}
