//! Debate graph normalization
//!
//! Migrates a debate-map node graph (categories, packages, questions, claims
//! and arguments, linked by untyped parent/child maps) into the canonical
//! model: Claim and Argument vertices connected by Inference, BaseClaim and
//! Premise edges.
//!
//! The run is a single-threaded two-pass batch:
//!
//! 1. **vertices** ([`Migration::run`] → pass 1): classify each node, split
//!    composite ones ([`split`]), write every Claim and Argument;
//! 2. **edges** (pass 2): walk each node's children, pick the edge kind from
//!    what parent and child resolved to, repair claim→claim citations and
//!    inferring arguments without a proposition, then write one linkage update
//!    per Argument.
//!
//! A child id that resolves to neither map after pass 1 aborts the run.

mod build;
mod error;
pub mod report;
mod resolve;
pub mod split;

pub use build::Migration;
pub use error::MigrateError;
pub use report::{MigrationReport, Notice};
pub use split::{split_multi_premise, split_placeholder, MultiPremiseSplit, PlaceholderSplit};

use cdmigrate_model::{IdAllocator, SourceGraph};
use cdmigrate_storage::DocumentStore;

/// Truncate the target collections and rebuild them from `graph`.
pub fn migrate(
    graph: SourceGraph,
    store: &mut dyn DocumentStore,
    ids: &mut dyn IdAllocator,
) -> Result<MigrationReport, MigrateError> {
    Migration::new(store, ids).run(graph)
}
