//! Key lookup over one side's rows

use crate::row::{Key, Row};
use std::collections::HashMap;

/// Maps each distinct key to the last row loaded with it
#[derive(Debug)]
pub struct KeyIndex<'a> {
    entries: HashMap<Key, &'a Row>,
    duplicates: usize,
}

impl<'a> KeyIndex<'a> {
    /// Build the index. A later row with an already-seen key replaces the
    /// earlier one, so earlier duplicates are dropped from matching.
    pub fn build(rows: &'a [Row], key_fields: &[String]) -> Self {
        let mut entries = HashMap::with_capacity(rows.len());
        let mut duplicates = 0;
        for row in rows {
            let key = row.key(key_fields);
            if let Some(previous) = entries.insert(key.clone(), row) {
                duplicates += 1;
                log::debug!("Duplicate key [{}]: keeping the later row, discarding {:?}", key, previous);
            }
        }
        Self { entries, duplicates }
    }

    pub fn get(&self, key: &Key) -> Option<&'a Row> {
        self.entries.get(key).copied()
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of rows overwritten by a later row with the same key
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }
}
