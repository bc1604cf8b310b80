//! CSV reading and writing for episode tables

use super::episodes::{EpisodeTable, RawTable};
use crate::text::RawField;
use csv::{ReaderBuilder, Terminator, WriterBuilder};
use std::io::{self, Read};

/// Read a CSV with a header row into a `RawTable`.
///
/// Empty and NA cells become `RawField::Absent`. Rows shorter than the
/// header are padded with absent cells; longer rows are an error. A leading
/// byte-order mark on the first header is dropped.
pub fn read_csv<R: Read>(reader: R) -> Result<RawTable, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, name)| {
            if i == 0 {
                name.trim_start_matches('\u{feff}').to_string()
            } else {
                name.to_string()
            }
        })
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.len() > columns.len() {
            let line = record.position().map_or(0, |p| p.line());
            return Err(csv::Error::from(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "line {line}: expected {} fields, saw {}",
                    columns.len(),
                    record.len()
                ),
            )));
        }
        let mut row: Vec<RawField> = record.iter().map(RawField::from_cell).collect();
        row.resize(columns.len(), RawField::Absent);
        rows.push(row);
    }

    Ok(RawTable { columns, rows })
}

impl EpisodeTable {
    /// Write the table as UTF-8 CSV: header row in table order, no index.
    pub fn to_csv(&self) -> Result<Vec<u8>, csv::Error> {
        let mut writer = WriterBuilder::new()
            .terminator(Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        writer.write_record(self.columns())?;
        for record in self.records() {
            writer.write_record(self.columns().iter().map(|c| record.cell(c)))?;
        }
        writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))
    }
}
