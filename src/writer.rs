//! Batched inserts into the output table

use crate::assemble::MergedRecord;
use crate::error::{MergeError, Result};
use crate::progress::ProgressReporter;
use crate::row::Value;
use crate::store::RowStore;

/// Writes merged records with one insert statement per batch
pub struct BatchWriter<'a> {
    table: &'a str,
    fields: &'a [String],
    batch_size: usize,
}

impl<'a> BatchWriter<'a> {
    /// `fields` are the output columns including provenance, matching `MergedRecord::to_params`
    pub fn new(table: &'a str, fields: &'a [String], batch_size: usize) -> Self {
        Self {
            table,
            fields,
            batch_size: batch_size.max(1),
        }
    }

    /// Write all records and return how many were inserted.
    ///
    /// The first failing batch aborts the write; earlier batches stay committed.
    pub fn write<S: RowStore + ?Sized>(
        &self,
        store: &mut S,
        records: &[MergedRecord],
        progress: &mut ProgressReporter,
    ) -> Result<usize> {
        if records.is_empty() {
            log::info!("No records to write");
            return Ok(0);
        }

        log::info!(
            "Writing {} records into '{}' in batches of {}",
            records.len(),
            self.table,
            self.batch_size
        );
        progress.start_write(records.len() as u64);

        let mut inserted = 0;
        for batch in records.chunks(self.batch_size) {
            let rows: Vec<Vec<Value>> = batch.iter().map(MergedRecord::to_params).collect();
            let first = inserted + 1;
            let last = inserted + batch.len();

            store.insert_rows(self.table, self.fields, &rows).map_err(|e| {
                log::error!("Batch insert into '{}' failed (rows {}-{}): {}", self.table, first, last, e);
                MergeError::write(self.table, first, last, e)
            })?;

            inserted = last;
            progress.update_write(inserted as u64);
            log::debug!("Written {}/{} records", inserted, records.len());
        }

        progress.finish_write(&format!("Wrote {} records", inserted));
        Ok(inserted)
    }
}
