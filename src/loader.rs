//! Materializes whole tables into memory

use crate::error::{MergeError, Result};
use crate::row::Row;
use crate::store::RowStore;

/// Loads every row of a table for a fixed field list
pub struct TableLoader;

impl TableLoader {
    pub fn load<S: RowStore + ?Sized>(store: &mut S, table: &str, fields: &[String]) -> Result<Vec<Row>> {
        log::info!("Reading table '{}' ({} fields)...", table, fields.len());
        let rows = store.select_all(table, fields).map_err(|e| {
            log::error!("Failed to read table '{}': {}", table, e);
            match e {
                MergeError::Read { .. } => e,
                other => MergeError::read(table, other),
            }
        })?;
        log::info!("Table '{}' has {} rows", table, rows.len());
        Ok(rows)
    }
}
