//! Diff engine for depsync.
//!
//! Pure functions over [`Registry`](depsync_types::Registry) snapshots. The
//! diff computed here is the only input the sync applier acts on.

mod diff;

pub use diff::{diff_registries, plan_sync};
