//! Column discovery and unification of the two input schemas

use crate::config::MergeConfig;
use crate::error::{MergeError, Result};
use crate::store::{ColumnDef, ColumnMeta, SchemaStore};
use serde::Serialize;
use std::collections::HashSet;

/// Provenance column names appended to the output schema
pub const SOURCE_COLUMN: &str = "source";
pub const CONFLICT_COLUMN: &str = "conflict";
pub const DIFF_FIELDS_COLUMN: &str = "diff_fields";
pub const PROVENANCE_COLUMNS: [&str; 3] = [SOURCE_COLUMN, CONFLICT_COLUMN, DIFF_FIELDS_COLUMN];
/// Generated key of the output table
pub const SURROGATE_COLUMN: &str = "id";

/// A table column after resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub ordinal: usize,
    pub nullable: bool,
    pub data_type: String,
    pub default: Option<String>,
    pub extra: String,
}

impl ColumnDescriptor {
    pub fn is_auto_increment(&self) -> bool {
        self.extra.to_lowercase().contains("auto_increment")
    }

    /// Storage-layer surrogate key rather than business data
    pub fn is_surrogate_id(&self) -> bool {
        self.name.eq_ignore_ascii_case("id") && self.is_auto_increment()
    }

    /// Nullable definition for the output table. Sequence defaults are dropped.
    pub fn output_def(&self) -> ColumnDef {
        let default = self
            .default
            .clone()
            .filter(|d| !d.to_lowercase().starts_with("nextval("));
        ColumnDef {
            name: self.name.clone(),
            data_type: self.data_type.clone(),
            default,
        }
    }
}

impl From<ColumnMeta> for ColumnDescriptor {
    fn from(meta: ColumnMeta) -> Self {
        Self {
            name: meta.name,
            ordinal: meta.ordinal,
            nullable: meta.nullable,
            data_type: meta.data_type,
            default: meta.default,
            extra: meta.extra,
        }
    }
}

/// Resolves table columns through a schema store
pub struct SchemaResolver;

impl SchemaResolver {
    /// Ordered usable columns of `table`, surrogate id excluded
    pub fn resolve<S: SchemaStore + ?Sized>(store: &mut S, table: &str) -> Result<Vec<ColumnDescriptor>> {
        let columns: Vec<ColumnDescriptor> = store
            .columns(table)?
            .into_iter()
            .map(ColumnDescriptor::from)
            .filter(|c| {
                if c.is_surrogate_id() {
                    log::debug!("Skipping auto-increment column '{}' of '{}'", c.name, table);
                    false
                } else {
                    true
                }
            })
            .collect();

        if columns.is_empty() {
            log::error!("Table '{}' has no columns (or does not exist)", table);
            return Err(MergeError::schema(table, "no columns found (or table does not exist)"));
        }
        Ok(columns)
    }

    /// Resolve both input tables and derive the output schema
    pub fn unify<S: SchemaStore + ?Sized>(store: &mut S, config: &MergeConfig) -> Result<UnifiedSchema> {
        let columns_a = Self::resolve(store, &config.table_a)?;
        let columns_b = Self::resolve(store, &config.table_b)?;
        UnifiedSchema::build(config, columns_a, columns_b)
    }
}

/// Field layout shared by the whole run
#[derive(Debug, Clone, Serialize)]
pub struct UnifiedSchema {
    pub columns_a: Vec<ColumnDescriptor>,
    pub columns_b: Vec<ColumnDescriptor>,
    /// Data fields of the output table (A's columns, in order)
    pub output_fields: Vec<String>,
    /// Output fields that also exist in B, aligned with `output_fields`
    pub in_b: Vec<bool>,
    /// Output fields minus key fields minus A's ignore-list
    pub comparison_fields: Vec<String>,
}

impl UnifiedSchema {
    pub fn build(
        config: &MergeConfig,
        columns_a: Vec<ColumnDescriptor>,
        columns_b: Vec<ColumnDescriptor>,
    ) -> Result<Self> {
        for name in PROVENANCE_COLUMNS.iter().chain(std::iter::once(&SURROGATE_COLUMN)) {
            if columns_a.iter().any(|c| c.name.eq_ignore_ascii_case(name)) {
                return Err(MergeError::schema(
                    &config.table_a,
                    format!("column '{}' collides with a column reserved for the output table", name),
                ));
            }
        }

        let names_b: HashSet<&str> = columns_b.iter().map(|c| c.name.as_str()).collect();
        for key in &config.key_fields {
            if !columns_a.iter().any(|c| &c.name == key) {
                return Err(MergeError::schema(&config.table_a, format!("key field '{}' not found", key)));
            }
            if !names_b.contains(key.as_str()) {
                return Err(MergeError::schema(&config.table_b, format!("key field '{}' not found", key)));
            }
        }

        let output_fields: Vec<String> = columns_a.iter().map(|c| c.name.clone()).collect();
        let in_b = output_fields.iter().map(|f| names_b.contains(f.as_str())).collect();

        let comparison_fields = output_fields
            .iter()
            .filter(|f| !config.key_fields.contains(f) && !config.ignore_fields_a.contains(f))
            .cloned()
            .collect();

        Ok(Self {
            columns_a,
            columns_b,
            output_fields,
            in_b,
            comparison_fields,
        })
    }

    pub fn fields_a(&self) -> Vec<String> {
        self.columns_a.iter().map(|c| c.name.clone()).collect()
    }

    pub fn fields_b(&self) -> Vec<String> {
        self.columns_b.iter().map(|c| c.name.clone()).collect()
    }

    /// Output data fields followed by the provenance columns
    pub fn all_output_fields(&self) -> Vec<String> {
        self.output_fields
            .iter()
            .cloned()
            .chain(PROVENANCE_COLUMNS.iter().map(|c| c.to_string()))
            .collect()
    }

    /// Column definitions for creating the output table
    pub fn output_defs(&self) -> Vec<ColumnDef> {
        let mut defs: Vec<ColumnDef> = self.columns_a.iter().map(ColumnDescriptor::output_def).collect();
        defs.push(ColumnDef { name: SOURCE_COLUMN.into(), data_type: "VARCHAR".into(), default: None });
        defs.push(ColumnDef { name: CONFLICT_COLUMN.into(), data_type: "TINYINT".into(), default: Some("0".into()) });
        defs.push(ColumnDef { name: DIFF_FIELDS_COLUMN.into(), data_type: "VARCHAR".into(), default: None });
        defs
    }
}
