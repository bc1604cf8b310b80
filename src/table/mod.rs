//! Episode tables: typed rows, upload validation and CSV exchange

mod csv_io;
mod episodes;
mod filename;
mod record;

#[cfg(test)]
mod tests;

pub use csv_io::read_csv;
pub use episodes::{AnalysisSummary, DisplayRow, EpisodeTable, RawTable, SchemaError};
pub use filename::download_filename;
pub use record::{columns, EpisodeRecord, ImportantWords};
