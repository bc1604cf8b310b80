//! Session bundles and partial updates

use crate::table::EpisodeTable;
use std::collections::BTreeMap;

/// Free-form processing flags kept alongside the table.
pub type ProcessingState = BTreeMap<String, String>;

/// Mutable per-identity state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionBundle {
    pub table: Option<EpisodeTable>,
    pub uploaded_filename: Option<String>,
    pub current_csv_file: Option<String>,
    pub processing_state: ProcessingState,
}

impl SessionBundle {
    pub fn is_empty(&self) -> bool {
        self.table.is_none()
            && self.uploaded_filename.is_none()
            && self.current_csv_file.is_none()
            && self.processing_state.is_empty()
    }
}

/// Fields to merge into a bundle. `None` leaves the current value alone.
#[derive(Debug, Clone, Default)]
pub struct BundleUpdate {
    pub table: Option<EpisodeTable>,
    pub uploaded_filename: Option<String>,
    pub current_csv_file: Option<String>,
    pub processing_state: Option<ProcessingState>,
}

impl BundleUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: EpisodeTable) -> Self {
        self.table = Some(table);
        self
    }

    pub fn with_uploaded_filename(mut self, name: impl Into<String>) -> Self {
        self.uploaded_filename = Some(name.into());
        self
    }

    pub fn with_current_csv_file(mut self, name: impl Into<String>) -> Self {
        self.current_csv_file = Some(name.into());
        self
    }

    pub fn with_processing_state(mut self, state: ProcessingState) -> Self {
        self.processing_state = Some(state);
        self
    }

    /// Merge into `bundle`, replacing each field that is set.
    pub fn apply(self, bundle: &mut SessionBundle) {
        if let Some(table) = self.table {
            bundle.table = Some(table);
        }
        if let Some(name) = self.uploaded_filename {
            bundle.uploaded_filename = Some(name);
        }
        if let Some(name) = self.current_csv_file {
            bundle.current_csv_file = Some(name);
        }
        if let Some(state) = self.processing_state {
            bundle.processing_state = state;
        }
    }
}
