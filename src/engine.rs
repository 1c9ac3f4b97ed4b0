//! Orchestration of a full merge run

use crate::assemble::{MergedRecord, RecordAssembler};
use crate::config::MergeConfig;
use crate::diff::DiffEngine;
use crate::error::Result;
use crate::index::KeyIndex;
use crate::loader::TableLoader;
use crate::policy::{ConflictPrompt, DecisionInput, ResolutionPolicy, Winner};
use crate::progress::ProgressReporter;
use crate::row::{display_value, Key, Row};
use crate::schema::{SchemaResolver, UnifiedSchema};
use crate::stats::{MergeReport, StatsCollector};
use crate::store::{RowStore, SchemaStore};
use crate::writer::BatchWriter;
use std::collections::HashSet;

/// Records produced by the matching passes, before they are written
#[derive(Debug)]
pub struct MatchOutcome {
    pub records: Vec<MergedRecord>,
    /// B rows dropped from matching because a later row had the same key
    pub duplicate_keys_b: usize,
}

/// Runs the merge of table A and table B into table C
pub struct Reconciler {
    config: MergeConfig,
    show_progress: bool,
}

impl Reconciler {
    pub fn new(config: MergeConfig) -> Self {
        Self {
            config,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Execute the whole run against `store`.
    ///
    /// `input` is only consulted under the interactive strategy. A failing
    /// batch aborts the run and leaves earlier batches in the output table.
    pub fn run<S>(&self, store: &mut S, input: Option<&mut dyn DecisionInput>) -> Result<MergeReport>
    where
        S: SchemaStore + RowStore + ?Sized,
    {
        self.config.validate()?;
        let mut stats = StatsCollector::start();
        let mut progress = if self.show_progress {
            ProgressReporter::new_for_merge()
        } else {
            ProgressReporter::new_minimal()
        };

        log::info!("Merge started at {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
        self.config.log_summary();

        let schema = SchemaResolver::unify(store, &self.config)?;
        log_schema(&schema);
        store.recreate_table(&self.config.table_c, &schema.output_defs())?;

        progress.start_load(&self.config.table_a);
        let rows_a = TableLoader::load(store, &self.config.table_a, &schema.fields_a())?;
        progress.start_load(&self.config.table_b);
        let rows_b = TableLoader::load(store, &self.config.table_b, &schema.fields_b())?;
        progress.finish_load(&format!("Loaded {} + {} rows", rows_a.len(), rows_b.len()));
        stats.loaded(rows_a.len(), rows_b.len());

        let mut policy = ResolutionPolicy::new(self.config.strategy, input);
        let outcome = self.match_rows(&schema, &rows_a, &rows_b, &mut policy, &mut stats, &mut progress);

        let fields = schema.all_output_fields();
        let writer = BatchWriter::new(&self.config.table_c, &fields, self.config.batch_size());
        let written = writer.write(store, &outcome.records, &mut progress)?;
        stats.written(written);

        let report = stats.finish();
        log::info!("Merge finished at {}", report.finished_at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S"));
        Ok(report)
    }

    /// Match A against B's index, then collect the B rows left unmatched
    pub fn match_rows(
        &self,
        schema: &UnifiedSchema,
        rows_a: &[Row],
        rows_b: &[Row],
        policy: &mut ResolutionPolicy<'_>,
        stats: &mut StatsCollector,
        progress: &mut ProgressReporter,
    ) -> MatchOutcome {
        let keys = &self.config.key_fields;
        let index_b = KeyIndex::build(rows_b, keys);
        if index_b.duplicates() > 0 {
            log::warn!(
                "Table '{}' has {} rows with duplicate keys; only the last row per key is used",
                self.config.table_b,
                index_b.duplicates()
            );
        }

        let diff_engine = DiffEngine::new(&schema.comparison_fields, &self.config.ignore_fields_b);
        let assembler = RecordAssembler::new(schema, &self.config.ignore_fields_b);
        let mut records = Vec::with_capacity(rows_a.len() + rows_b.len());
        let mut matched_b: HashSet<Key> = HashSet::new();

        log::info!("Comparing and merging rows...");
        progress.start_match(rows_a.len() as u64);
        for (i, row_a) in rows_a.iter().enumerate() {
            let key = row_a.key(keys);
            let record = match index_b.get(&key) {
                Some(row_b) => {
                    let record = self.merge_pair(&diff_engine, &assembler, row_a, row_b, &key, policy, stats, progress);
                    matched_b.insert(key);
                    record
                }
                None => {
                    stats.only_in_a();
                    assembler.only_in_a(row_a)
                }
            };
            records.push(record);
            progress.update_match(i as u64 + 1);
        }
        progress.finish_match("Matching complete");

        // Every row of B whose key never matched, duplicates included
        for row_b in rows_b {
            if !matched_b.contains(&row_b.key(keys)) {
                stats.only_in_b();
                records.push(assembler.only_in_b(row_b));
            }
        }

        MatchOutcome {
            records,
            duplicate_keys_b: index_b.duplicates(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn merge_pair(
        &self,
        diff_engine: &DiffEngine<'_>,
        assembler: &RecordAssembler<'_>,
        row_a: &Row,
        row_b: &Row,
        key: &Key,
        policy: &mut ResolutionPolicy<'_>,
        stats: &mut StatsCollector,
        progress: &ProgressReporter,
    ) -> MergedRecord {
        let diff = diff_engine.compare(row_a, row_b);
        if diff.is_exact_match() {
            stats.exact_match();
            return assembler.matched(row_a, &diff, None);
        }

        let n = stats.conflict();
        log::info!(
            "Conflict #{} on [{}] = [{}]: {} field(s) differ",
            n,
            self.config.key_fields.join(","),
            key,
            diff.fields.len()
        );
        for d in &diff.fields {
            log::debug!("  {} ({:?})", d.describe(), d.class);
        }
        for d in diff.auto_filled() {
            log::info!("  Auto-filled '{}' from B: {}", d.field, display_value(&d.b));
        }
        stats.auto_filled(diff.auto_filled().count());

        if !diff.has_contested() {
            log::info!("  All {} difference(s) resolved automatically", diff.auto_resolved_count());
            return assembler.matched(row_a, &diff, None);
        }

        let prompt = ConflictPrompt {
            key_fields: &self.config.key_fields,
            key,
            contested: diff.contested().collect(),
        };
        let resolution = progress.suspend(|| policy.resolve(&prompt));
        if resolution.warning.is_some() {
            stats.input_warning();
        }
        match resolution.winner {
            Winner::A => stats.resolved_to_a(),
            Winner::B => stats.resolved_to_b(),
        }
        log::info!(
            "  {} contested field(s) resolved toward table {:?}",
            prompt.contested.len(),
            resolution.winner
        );

        assembler.matched(row_a, &diff, Some(resolution.winner))
    }
}

fn log_schema(schema: &UnifiedSchema) {
    log::info!("A fields ({}): {}", schema.columns_a.len(), schema.fields_a().join(","));
    log::info!("B fields ({}): {}", schema.columns_b.len(), schema.fields_b().join(","));
    log::info!("Output fields ({}): {}", schema.output_fields.len(), schema.output_fields.join(","));
    log::info!(
        "Comparison fields ({}): {}",
        schema.comparison_fields.len(),
        schema.comparison_fields.join(",")
    );
}
