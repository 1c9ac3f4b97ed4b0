//! Output formatting utilities

use crate::error::Result;
use crate::schema::ColumnDescriptor;
use crate::stats::MergeReport;

/// Pretty printer for tabmerge output
pub struct PrettyPrinter;

impl PrettyPrinter {
    /// Print the final merge report
    pub fn print_report(report: &MergeReport) {
        print!("{}", Self::render_report(report));
    }

    pub fn render_report(report: &MergeReport) -> String {
        let c = &report.counts;
        let mut out = String::new();
        out.push_str("📊 Merge Report\n");
        out.push_str(&format!("├─ Rows in A: {}\n", c.total_a));
        out.push_str(&format!("├─ Rows in B: {}\n", c.total_b));
        out.push_str(&format!("├─ Rows written: {}\n", c.total_c));
        out.push_str(&format!("├─ ✅ Exact matches: {}\n", c.exact_match));
        out.push_str(&format!("├─ Only in A: {}\n", c.only_in_a));
        out.push_str(&format!("├─ Only in B: {}\n", c.only_in_b));
        if c.conflict > 0 {
            out.push_str(&format!("├─ ⚠️  Conflicts: {}\n", c.conflict));
            out.push_str(&format!("│  ├─ Resolved toward A: {}\n", c.conflict_use_a));
            out.push_str(&format!("│  └─ Resolved toward B: {}\n", c.conflict_use_b));
        } else {
            out.push_str("├─ ✅ Conflicts: 0\n");
        }
        out.push_str(&format!("├─ Auto-filled NULL/empty fields: {}\n", c.null_auto_filled));
        if c.input_warnings > 0 {
            out.push_str(&format!("├─ ❌ Input failures (defaulted to A): {}\n", c.input_warnings));
        }
        out.push_str(&format!("└─ Duration: {}\n", format_duration(report.duration())));
        out
    }

    /// Print resolved columns of a table
    pub fn print_columns(table: &str, columns: &[ColumnDescriptor]) {
        if columns.is_empty() {
            println!("No columns found for '{}'.", table);
            return;
        }

        println!("📋 Columns of '{}':", table);
        for (i, col) in columns.iter().enumerate() {
            let prefix = if i == columns.len() - 1 { "└─" } else { "├─" };
            let nullable = if col.nullable { "NULL" } else { "NOT NULL" };
            let default = col
                .default
                .as_deref()
                .map(|d| format!(" DEFAULT {}", d))
                .unwrap_or_default();
            println!("{} {}. {} {} {}{}", prefix, col.ordinal, col.name, col.data_type, nullable, default);
        }
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    /// Format any serializable data as JSON
    pub fn format<T: serde::Serialize + ?Sized>(data: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(data)?)
    }
}

/// Format a duration in human-readable form
fn format_duration(duration: chrono::Duration) -> String {
    let millis = duration.num_milliseconds().max(0);
    if millis < 1000 {
        format!("{} ms", millis)
    } else if millis < 60_000 {
        format!("{:.1} s", millis as f64 / 1000.0)
    } else {
        format!("{}m {}s", millis / 60_000, (millis % 60_000) / 1000)
    }
}
