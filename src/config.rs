//! Merge run configuration

use crate::error::{MergeError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// What to do when both sides hold different non-empty values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ConflictStrategy {
    /// Keep table A's values
    #[default]
    PreferA,
    /// Take table B's values
    PreferB,
    /// Ask on the console for every conflicting row
    Interactive,
}

impl ConflictStrategy {
    pub fn describe(self) -> &'static str {
        match self {
            Self::PreferA => "prefer table A",
            Self::PreferB => "prefer table B",
            Self::Interactive => "ask interactively",
        }
    }
}

/// Everything a merge run needs to know
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Database location; `{VAR}` placeholders are filled from the environment
    #[serde(default)]
    pub dsn: String,
    pub table_a: String,
    pub table_b: String,
    /// Output table, dropped and recreated on every run
    pub table_c: String,
    pub key_fields: Vec<String>,
    /// Not compared, but still written to the output
    #[serde(default)]
    pub ignore_fields_a: Vec<String>,
    /// Neither compared nor copied into the output
    #[serde(default)]
    pub ignore_fields_b: Vec<String>,
    #[serde(default)]
    pub strategy: ConflictStrategy,
    /// Rows per insert statement; zero or negative falls back to the default
    #[serde(default)]
    pub batch_size: Option<i64>,
}

impl MergeConfig {
    pub fn new(
        table_a: impl Into<String>,
        table_b: impl Into<String>,
        table_c: impl Into<String>,
        key_fields: Vec<String>,
    ) -> Self {
        Self {
            dsn: String::new(),
            table_a: table_a.into(),
            table_b: table_b.into(),
            table_c: table_c.into(),
            key_fields,
            ignore_fields_a: Vec::new(),
            ignore_fields_b: Vec::new(),
            strategy: ConflictStrategy::default(),
            batch_size: None,
        }
    }

    /// Load a JSON configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            MergeError::config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            MergeError::config(format!("Invalid config file '{}': {}", path.display(), e))
        })
    }

    /// Write this configuration as pretty JSON
    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Effective batch size
    pub fn batch_size(&self) -> usize {
        match self.batch_size {
            Some(n) if n > 0 => n as usize,
            _ => crate::DEFAULT_BATCH_SIZE,
        }
    }

    /// DSN with environment placeholders substituted
    pub fn resolved_dsn(&self) -> Result<String> {
        substitute_env_vars(&self.dsn)
    }

    pub fn validate(&self) -> Result<()> {
        for (label, name) in [("table_a", &self.table_a), ("table_b", &self.table_b), ("table_c", &self.table_c)] {
            if name.trim().is_empty() {
                return Err(MergeError::config(format!("'{}' must not be empty", label)));
            }
        }
        // DuckDB resolves identifiers case-insensitively, quoted or not
        if same_table(&self.table_c, &self.table_a) || same_table(&self.table_c, &self.table_b) {
            return Err(MergeError::config(format!(
                "output table '{}' must differ from the input tables",
                self.table_c
            )));
        }
        if self.key_fields.is_empty() {
            return Err(MergeError::config("at least one key field is required"));
        }
        if let Some(dup) = self
            .key_fields
            .iter()
            .enumerate()
            .find(|(i, k)| self.key_fields[..*i].contains(k))
            .map(|(_, k)| k)
        {
            return Err(MergeError::config(format!("key field '{}' is listed twice", dup)));
        }
        Ok(())
    }

    /// Log the configuration summary at the start of a run
    pub fn log_summary(&self) {
        log::info!(
            "Merging [{}] with [{}] into [{}]",
            self.table_a,
            self.table_b,
            self.table_c
        );
        log::info!("Key fields: {}", self.key_fields.join(","));
        if !self.ignore_fields_a.is_empty() {
            log::info!("Ignored on A (compare only): {}", self.ignore_fields_a.join(","));
        }
        if !self.ignore_fields_b.is_empty() {
            log::info!("Ignored on B: {}", self.ignore_fields_b.join(","));
        }
        log::info!("Conflict strategy: {}", self.strategy.describe());
        log::info!("Batch size: {}", self.batch_size());
    }
}

/// Whether two table names refer to the same DuckDB table
pub fn same_table(left: &str, right: &str) -> bool {
    left.trim().eq_ignore_ascii_case(right.trim())
}

/// Substitute `{VAR_NAME}` placeholders with environment variable values
pub fn substitute_env_vars(input: &str) -> Result<String> {
    let mut result = input.to_string();

    let mut start = 0;
    while let Some(open_pos) = result[start..].find('{') {
        let open_pos = start + open_pos;
        if let Some(close_pos) = result[open_pos..].find('}') {
            let close_pos = open_pos + close_pos;
            let var_name = &result[open_pos + 1..close_pos];

            let var_value = env::var(var_name).map_err(|_| {
                MergeError::config(format!(
                    "Environment variable '{}' not found. Make sure it's set in your .env file or environment.",
                    var_name
                ))
            })?;

            result.replace_range(open_pos..=close_pos, &var_value);
            start = open_pos + var_value.len();
        } else {
            start = open_pos + 1;
        }
    }

    Ok(result)
}

/// Load environment variables from `.env` in the current directory, if present
pub fn load_env_file() -> Result<()> {
    if Path::new(".env").exists() {
        dotenv::dotenv()
            .map_err(|e| MergeError::config(format!("Failed to load .env file: {}", e)))?;
    }
    Ok(())
}
