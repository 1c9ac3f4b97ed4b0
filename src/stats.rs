//! Run counters and the final merge report

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Counters gathered over one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeCounts {
    pub total_a: usize,
    pub total_b: usize,
    /// Records written to the output table
    pub total_c: usize,
    pub exact_match: usize,
    pub only_in_a: usize,
    pub only_in_b: usize,
    /// Matched entities with at least one differing field
    pub conflict: usize,
    /// Fields filled from B because A was NULL or empty
    pub null_auto_filled: usize,
    pub conflict_use_a: usize,
    pub conflict_use_b: usize,
    /// Interactive decisions that fell back to A after an input failure
    pub input_warnings: usize,
}

/// Final, immutable summary of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    #[serde(flatten)]
    pub counts: MergeCounts,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl MergeReport {
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Accumulates counters while the run progresses
#[derive(Debug)]
pub struct StatsCollector {
    counts: MergeCounts,
    started_at: DateTime<Utc>,
}

impl StatsCollector {
    pub fn start() -> Self {
        Self {
            counts: MergeCounts::default(),
            started_at: Utc::now(),
        }
    }

    pub fn loaded(&mut self, total_a: usize, total_b: usize) {
        self.counts.total_a = total_a;
        self.counts.total_b = total_b;
    }

    pub fn exact_match(&mut self) {
        self.counts.exact_match += 1;
    }

    pub fn only_in_a(&mut self) {
        self.counts.only_in_a += 1;
    }

    pub fn only_in_b(&mut self) {
        self.counts.only_in_b += 1;
    }

    /// Returns the running conflict number
    pub fn conflict(&mut self) -> usize {
        self.counts.conflict += 1;
        self.counts.conflict
    }

    pub fn auto_filled(&mut self, fields: usize) {
        self.counts.null_auto_filled += fields;
    }

    pub fn resolved_to_a(&mut self) {
        self.counts.conflict_use_a += 1;
    }

    pub fn resolved_to_b(&mut self) {
        self.counts.conflict_use_b += 1;
    }

    pub fn input_warning(&mut self) {
        self.counts.input_warnings += 1;
    }

    pub fn written(&mut self, total_c: usize) {
        self.counts.total_c = total_c;
    }

    pub fn counts(&self) -> &MergeCounts {
        &self.counts
    }

    pub fn finish(self) -> MergeReport {
        MergeReport {
            counts: self.counts,
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}
