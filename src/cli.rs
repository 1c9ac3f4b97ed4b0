//! Command-line interface for tabmerge

use crate::config::ConflictStrategy;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tabmerge")]
#[command(about = "Reconcile two overlapping tables into a provenance-tagged merge table")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database to work on (file path or :memory:); supports {ENV_VAR} placeholders
    #[arg(long, global = true)]
    pub dsn: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Merge table A and table B into a freshly created table C
    Merge(MergeArgs),

    /// Show the columns of a table as the merge sees them
    Columns {
        /// Table name
        table: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a template configuration file
    InitConfig {
        /// Where to write the configuration
        #[arg(default_value = "tabmerge.json")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct MergeArgs {
    /// JSON configuration file; flags below override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Primary table (A)
    #[arg(long)]
    pub table_a: Option<String>,

    /// Secondary table (B)
    #[arg(long)]
    pub table_b: Option<String>,

    /// Output table (C), dropped and recreated
    #[arg(long)]
    pub output: Option<String>,

    /// Key fields identifying the same entity, comma separated
    #[arg(long, value_delimiter = ',')]
    pub key: Vec<String>,

    /// Fields of A left out of the comparison, comma separated
    #[arg(long, value_delimiter = ',')]
    pub ignore_a: Vec<String>,

    /// Fields of B neither compared nor copied, comma separated
    #[arg(long, value_delimiter = ',')]
    pub ignore_b: Vec<String>,

    /// How to resolve fields where both sides hold different values
    #[arg(long, value_enum)]
    pub strategy: Option<ConflictStrategy>,

    /// Rows per insert statement (zero or negative uses the default of 500)
    #[arg(long, allow_hyphen_values = true)]
    pub batch_size: Option<i64>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Also save the report as JSON to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Disable progress bars
    #[arg(long)]
    pub no_progress: bool,
}
