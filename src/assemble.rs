//! Builds provenance-tagged output records

use crate::diff::{DiffClass, RowDiff};
use crate::policy::Winner;
use crate::row::{Row, Value};
use crate::schema::UnifiedSchema;
use serde::Serialize;
use std::fmt;

/// Where an output record's values came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Source {
    /// Only in A, or identical on both sides
    A,
    /// Only in B
    B,
    /// Matched with differences, A's side kept for contested fields
    MergeA,
    /// Matched with differences, B's side taken for contested fields
    MergeB,
}

impl Source {
    pub fn code(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::MergeA => "MERGE_A",
            Self::MergeB => "MERGE_B",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One row of the output table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedRecord {
    /// Values aligned with the output schema's data fields
    pub values: Vec<Value>,
    pub source: Source,
    /// Set whenever any difference was found, including auto-resolved ones
    pub conflict: bool,
    pub diff_fields: Vec<String>,
}

impl MergedRecord {
    /// Positional insert parameters: data fields then provenance columns
    pub fn to_params(&self) -> Vec<Value> {
        let mut params = Vec::with_capacity(self.values.len() + 3);
        params.extend(self.values.iter().cloned());
        params.push(Some(self.source.code().to_string()));
        params.push(Some(if self.conflict { "1" } else { "0" }.to_string()));
        params.push(if self.diff_fields.is_empty() {
            None
        } else {
            Some(self.diff_fields.join(","))
        });
        params
    }
}

/// Turns rows and resolved comparisons into output records
pub struct RecordAssembler<'a> {
    schema: &'a UnifiedSchema,
    ignore_fields_b: &'a [String],
}

impl<'a> RecordAssembler<'a> {
    pub fn new(schema: &'a UnifiedSchema, ignore_fields_b: &'a [String]) -> Self {
        Self {
            schema,
            ignore_fields_b,
        }
    }

    fn values_from_a(&self, row_a: &Row) -> Vec<Value> {
        self.schema
            .output_fields
            .iter()
            .map(|f| row_a.get(f).cloned().flatten())
            .collect()
    }

    fn position(&self, field: &str) -> Option<usize> {
        self.schema.output_fields.iter().position(|f| f == field)
    }

    /// Row of A with no counterpart in B
    pub fn only_in_a(&self, row_a: &Row) -> MergedRecord {
        MergedRecord {
            values: self.values_from_a(row_a),
            source: Source::A,
            conflict: false,
            diff_fields: Vec::new(),
        }
    }

    /// Row of B with no counterpart in A, projected onto the output schema
    pub fn only_in_b(&self, row_b: &Row) -> MergedRecord {
        let values = self
            .schema
            .output_fields
            .iter()
            .zip(&self.schema.in_b)
            .map(|(field, &in_b)| {
                if !in_b || self.ignore_fields_b.contains(field) {
                    None
                } else {
                    row_b.get(field).cloned().flatten()
                }
            })
            .collect();
        MergedRecord {
            values,
            source: Source::B,
            conflict: false,
            diff_fields: Vec::new(),
        }
    }

    /// Matched pair. `winner` is only consulted when contested fields exist.
    pub fn matched(&self, row_a: &Row, diff: &RowDiff, winner: Option<Winner>) -> MergedRecord {
        let mut values = self.values_from_a(row_a);
        if diff.is_exact_match() {
            return MergedRecord {
                values,
                source: Source::A,
                conflict: false,
                diff_fields: Vec::new(),
            };
        }

        let take_b_for_contested = diff.has_contested() && winner == Some(Winner::B);
        for d in &diff.fields {
            let take_b = match d.class {
                DiffClass::AutoFillFromB => true,
                DiffClass::AutoKeepA => false,
                DiffClass::Contested => take_b_for_contested,
            };
            if take_b {
                if let Some(i) = self.position(&d.field) {
                    values[i] = d.b.clone();
                }
            }
        }

        MergedRecord {
            values,
            source: if take_b_for_contested { Source::MergeB } else { Source::MergeA },
            conflict: true,
            diff_fields: diff.field_names(),
        }
    }
}
