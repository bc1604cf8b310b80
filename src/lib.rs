//! podplanner: keyword planning for podcast episode tables
//!
//! Upload a CSV of episodes, get keyword phrases for each one, track which
//! episodes have been analyzed, attach search queries, and export the
//! annotated table again.
//!
//! # Core Concepts
//!
//! - **Episode table**: the uploaded rows, addressed by unique `Title`, with
//!   the tracking columns `Analyzed`, `No of Queries` and `Added Queries`
//! - **Identity**: opaque token that ties requests to one session
//! - **Session store**: per-identity state that expires after inactivity
//!
//! # Example
//!
//! ```
//! use podplanner::EpisodeApi;
//!
//! let api = EpisodeApi::default();
//! let me = api.new_identity();
//! api.upload_csv(&me, "eps.csv", b"Title,Description\nEp 1,Cats\n").unwrap();
//!
//! let update = api.add_query(&me, "Ep 1", "cat podcast").unwrap();
//! assert_eq!(update.count, 1);
//!
//! let exported = api.export_table(&me).unwrap();
//! assert_eq!(exported.filename, "eps_0_rows_processed_1_rows_pending.csv");
//! ```

pub mod api;
pub mod config;
pub mod mcp;
pub mod store;
pub mod suggest;
pub mod table;
pub mod text;

pub use api::{
    ApiError, ApiResult, EpisodeApi, EpisodeStatus, ErrorKind, ExportedTable, IndexedTitle,
    QueryUpdate, ResultsOverview, TableOverview,
};
pub use config::{Config, ConfigError, StoreConfig};
pub use store::{BundleUpdate, Clock, Identity, ManualClock, SessionBundle, SessionStore, SystemClock};
pub use suggest::{EpisodeSuggestions, KeywordGroup};
pub use table::{read_csv, AnalysisSummary, EpisodeRecord, EpisodeTable, RawTable, SchemaError};
pub use text::{QueryList, RawField};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
