//! Field-by-field comparison of matched rows

use crate::row::{display_value, is_null_or_empty, Row, Value};
use serde::Serialize;

/// How a single differing field gets resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffClass {
    /// A is NULL or empty, B is not: B's value is taken
    AutoFillFromB,
    /// B is NULL or empty, A is not: A's value stays
    AutoKeepA,
    /// Neither side is more empty than the other: needs a policy decision
    Contested,
}

impl DiffClass {
    pub fn classify(a: &Value, b: &Value) -> Self {
        match (is_null_or_empty(a), is_null_or_empty(b)) {
            (true, false) => Self::AutoFillFromB,
            (false, true) => Self::AutoKeepA,
            // Both non-empty and unequal, or NULL against empty string
            _ => Self::Contested,
        }
    }

    pub fn is_auto(self) -> bool {
        !matches!(self, Self::Contested)
    }
}

/// One field whose values differ between the matched rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDiff {
    pub field: String,
    pub a: Value,
    pub b: Value,
    pub class: DiffClass,
}

impl FieldDiff {
    pub fn describe(&self) -> String {
        format!(
            "{}: A={} B={}",
            self.field,
            display_value(&self.a),
            display_value(&self.b)
        )
    }
}

/// All differences found for one matched pair, in comparison-field order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RowDiff {
    pub fields: Vec<FieldDiff>,
}

impl RowDiff {
    pub fn is_exact_match(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|d| d.field.clone()).collect()
    }

    pub fn contested(&self) -> impl Iterator<Item = &FieldDiff> {
        self.fields.iter().filter(|d| d.class == DiffClass::Contested)
    }

    pub fn has_contested(&self) -> bool {
        self.contested().next().is_some()
    }

    pub fn auto_filled(&self) -> impl Iterator<Item = &FieldDiff> {
        self.fields.iter().filter(|d| d.class == DiffClass::AutoFillFromB)
    }

    pub fn auto_resolved_count(&self) -> usize {
        self.fields.iter().filter(|d| d.class.is_auto()).count()
    }
}

/// Compares rows over a fixed set of comparison fields
#[derive(Debug, Clone)]
pub struct DiffEngine<'a> {
    comparison_fields: &'a [String],
    ignore_fields_b: &'a [String],
}

impl<'a> DiffEngine<'a> {
    pub fn new(comparison_fields: &'a [String], ignore_fields_b: &'a [String]) -> Self {
        Self {
            comparison_fields,
            ignore_fields_b,
        }
    }

    /// Differences between `row_a` and `row_b`.
    ///
    /// Fields ignored on B, or missing from B's schema, never count as differing.
    pub fn compare(&self, row_a: &Row, row_b: &Row) -> RowDiff {
        let mut fields = Vec::new();
        for field in self.comparison_fields {
            if self.ignore_fields_b.contains(field) {
                continue;
            }
            let b = match row_b.get(field) {
                Some(b) => b,
                None => continue,
            };
            let a = row_a.get(field).cloned().flatten();
            if !values_equal(&a, b) {
                fields.push(FieldDiff {
                    field: field.clone(),
                    class: DiffClass::classify(&a, b),
                    a,
                    b: b.clone(),
                });
            }
        }
        RowDiff { fields }
    }
}

/// Equal iff both NULL, or both non-NULL and textually identical
pub fn values_equal(a: &Value, b: &Value) -> bool {
    a == b
}
