//! Command implementations for tabmerge CLI

use crate::cli::{Commands, MergeArgs};
use crate::config::{load_env_file, substitute_env_vars, ConflictStrategy, MergeConfig};
use crate::engine::Reconciler;
use crate::error::{MergeError, Result};
use crate::output::{JsonFormatter, PrettyPrinter};
use crate::policy::{ConsoleInput, DecisionInput};
use crate::schema::SchemaResolver;
use crate::stats::MergeReport;
use crate::store::DuckDbStore;
use std::path::Path;

/// Execute a command
pub fn execute_command(command: Commands, dsn: Option<&str>) -> Result<()> {
    match command {
        Commands::Merge(args) => merge_command(&args, dsn).map(|_| ()),
        Commands::Columns { table, json } => columns_command(dsn, &table, json),
        Commands::InitConfig { path, force } => init_config_command(&path, force),
    }
}

/// Combine the optional config file with command-line overrides
pub fn build_config(args: &MergeArgs, dsn: Option<&str>) -> Result<MergeConfig> {
    let mut config = match &args.config {
        Some(path) => MergeConfig::from_file(path)?,
        None => MergeConfig::new(
            args.table_a.clone().unwrap_or_default(),
            args.table_b.clone().unwrap_or_default(),
            args.output.clone().unwrap_or_default(),
            Vec::new(),
        ),
    };

    if let Some(dsn) = dsn {
        config.dsn = dsn.to_string();
    }
    if let Some(table_a) = &args.table_a {
        config.table_a = table_a.clone();
    }
    if let Some(table_b) = &args.table_b {
        config.table_b = table_b.clone();
    }
    if let Some(output) = &args.output {
        config.table_c = output.clone();
    }
    if !args.key.is_empty() {
        config.key_fields = args.key.clone();
    }
    if !args.ignore_a.is_empty() {
        config.ignore_fields_a = args.ignore_a.clone();
    }
    if !args.ignore_b.is_empty() {
        config.ignore_fields_b = args.ignore_b.clone();
    }
    if let Some(strategy) = args.strategy {
        config.strategy = strategy;
    }
    if args.batch_size.is_some() {
        config.batch_size = args.batch_size;
    }

    config.validate()?;
    Ok(config)
}

fn open_store(dsn: &str) -> Result<DuckDbStore> {
    load_env_file()?;
    let dsn = substitute_env_vars(dsn)?;
    DuckDbStore::open(&dsn)
}

/// Run a merge and print its report
pub fn merge_command(args: &MergeArgs, dsn: Option<&str>) -> Result<MergeReport> {
    let config = build_config(args, dsn)?;
    let mut store = open_store(&config.dsn)?;

    let interactive = config.strategy == ConflictStrategy::Interactive;
    let reconciler = Reconciler::new(config).with_progress(!args.no_progress && !args.json);

    let report = if interactive {
        let mut console = interactive_console(args.json);
        reconciler.run(&mut store, Some(console.as_mut()))?
    } else {
        reconciler.run(&mut store, None)?
    };

    if args.json {
        println!("{}", JsonFormatter::format(&report)?);
    } else {
        PrettyPrinter::print_report(&report);
    }

    if let Some(path) = &args.report {
        std::fs::write(path, JsonFormatter::format(&report)?)?;
        log::info!("Report saved to {}", path.display());
    }

    Ok(report)
}

/// Stream carrying the conflict prompts of an interactive run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptStream {
    Stdout,
    Stderr,
}

impl PromptStream {
    /// With `--json` stdout carries only the report
    fn for_output(json: bool) -> Self {
        if json {
            Self::Stderr
        } else {
            Self::Stdout
        }
    }
}

fn interactive_console(json: bool) -> Box<dyn DecisionInput> {
    match PromptStream::for_output(json) {
        PromptStream::Stdout => Box::new(ConsoleInput::stdio()),
        PromptStream::Stderr => Box::new(ConsoleInput::stdin_stderr()),
    }
}

/// Show the resolved columns of a table
fn columns_command(dsn: Option<&str>, table: &str, json: bool) -> Result<()> {
    let dsn = dsn.ok_or_else(|| MergeError::config("--dsn is required"))?;
    let mut store = open_store(dsn)?;
    let columns = SchemaResolver::resolve(&mut store, table)?;

    if json {
        println!("{}", JsonFormatter::format(&columns)?);
    } else {
        PrettyPrinter::print_columns(table, &columns);
    }
    Ok(())
}

/// Write a template configuration file
fn init_config_command(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(MergeError::config(format!(
            "'{}' already exists, use --force to overwrite",
            path.display()
        )));
    }

    let mut template = MergeConfig::new("table_a", "table_b", "table_c", vec!["id_field".to_string()]);
    template.dsn = "{TABMERGE_DB}".to_string();
    template.batch_size = Some(crate::DEFAULT_BATCH_SIZE as i64);
    template.write_to(path)?;

    println!("✅ Wrote template configuration to: {}", path.display());
    Ok(())
}
