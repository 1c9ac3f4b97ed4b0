//! Null-aware row values and composite keys

use indexmap::IndexMap;

/// Separator placed between key field values
pub const KEY_SEPARATOR: &str = "\x01@@\x01";

/// Stand-in for a NULL (or absent) key field value
pub const NULL_SENTINEL: &str = "\x00<NULL>\x00";

/// A single field value. `None` is SQL NULL and never equals `Some("")`.
pub type Value = Option<String>;

/// One row loaded from a table.
///
/// A field missing from the map is not part of that table's schema, while a
/// field mapped to `None` holds SQL NULL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    values: IndexMap<String, Value>,
}

impl Row {
    pub fn new(values: IndexMap<String, Value>) -> Self {
        Self { values }
    }

    /// Build a row from `(field, value)` pairs, keeping their order
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            values: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Field value, outer `None` when the field is not in this row's schema
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// Field value with absence folded into NULL
    pub fn value(&self, field: &str) -> Option<&str> {
        self.values.get(field).and_then(|v| v.as_deref())
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Composite key over `key_fields`
    pub fn key(&self, key_fields: &[String]) -> Key {
        let parts: Vec<&str> = key_fields
            .iter()
            .map(|f| self.value(f).unwrap_or(NULL_SENTINEL))
            .collect();
        Key(parts.join(KEY_SEPARATOR))
    }
}

/// Identity of an entity across both tables
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(String);

impl Key {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Printable form with the reserved separator and sentinel spelled out
    pub fn display(&self) -> String {
        self.0
            .split(KEY_SEPARATOR)
            .map(|part| if part == NULL_SENTINEL { "<NULL>" } else { part })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

pub fn is_null_or_empty(value: &Value) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

/// Human-readable value, distinguishing NULL from the empty string
pub fn display_value(value: &Value) -> String {
    match value.as_deref() {
        None => "<NULL>".to_string(),
        Some("") => "<empty>".to_string(),
        Some(s) => s.to_string(),
    }
}
