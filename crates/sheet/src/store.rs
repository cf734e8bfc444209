//! Ownership of the loaded table and its active derived view.

use crate::error::LoadError;
use crate::io::LoadOptions;
use crate::table::Table;
use std::path::Path;
use tracing::debug;

/// Holds the base table and at most one derived view.
///
/// Every filter result replaces the derived view, and the next operation
/// composes onto it. Clearing goes back to the base table, which a sort
/// made without a derived view may have reordered.
#[derive(Debug, Default)]
pub struct TableStore {
    base: Option<Table>,
    derived: Option<Table>,
    version: u64,
}

impl TableStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a file and make it the base table.
    ///
    /// On error the store is left untouched.
    pub fn load<P: AsRef<Path>>(&mut self, path: P, options: &LoadOptions) -> Result<&Table, LoadError> {
        let table = Table::load(path, options)?;
        Ok(self.install(table))
    }

    /// Replace the base table with one loaded elsewhere and drop any derived view
    pub fn install(&mut self, table: Table) -> &Table {
        self.derived = None;
        self.version += 1;
        debug!(
            "Installed table '{}' ({} rows), version {}",
            table.name(),
            table.row_count(),
            self.version
        );
        self.base.insert(table)
    }

    /// The loaded table, ignoring any derived view
    #[must_use]
    pub fn base(&self) -> Option<&Table> {
        self.base.as_ref()
    }

    /// The derived view if one is active, else the base table
    #[must_use]
    pub fn current_view(&self) -> Option<&Table> {
        self.derived.as_ref().or(self.base.as_ref())
    }

    /// Make `view` the active derived view.
    ///
    /// Ignored when nothing is loaded.
    pub fn set_filtered_view(&mut self, view: Table) {
        if self.base.is_some() {
            self.derived = Some(view);
        }
    }

    /// Swap in a reordered copy of the base table, keeping its version.
    ///
    /// Ignored unless `view` shares the base table's schema. Returns
    /// whether the base was replaced.
    pub fn replace_base(&mut self, view: Table) -> bool {
        match &mut self.base {
            Some(base) if view.shares_schema_with(base) => {
                debug!("Reordered base table '{}' ({} rows)", view.name(), view.row_count());
                *base = view;
                true
            }
            _ => false,
        }
    }

    /// Drop the derived view. Returns whether there was one.
    pub fn clear_filtered_view(&mut self) -> bool {
        self.derived.take().is_some()
    }

    #[must_use]
    pub fn has_filtered_view(&self) -> bool {
        self.derived.is_some()
    }

    /// Number of tables installed so far
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }
}
