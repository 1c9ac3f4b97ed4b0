//! # tabmerge
//!
//! Reconciles two relational tables with overlapping schemas into a third
//! table that records matches, field-level conflicts and rows found on only
//! one side, each tagged with its provenance.

pub mod assemble;
pub mod cli;
pub mod commands;
pub mod config;
pub mod diff;
pub mod engine;
pub mod error;
pub mod index;
pub mod loader;
pub mod output;
pub mod policy;
pub mod progress;
pub mod row;
pub mod schema;
pub mod stats;
pub mod store;
pub mod writer;

pub use config::{ConflictStrategy, MergeConfig};
pub use engine::Reconciler;
pub use error::{MergeError, Result};
pub use stats::{MergeCounts, MergeReport};
pub use store::DuckDbStore;

/// Default number of rows per insert statement
pub const DEFAULT_BATCH_SIZE: usize = 500;
