//! Embeddable core library for depsync.
//!
//! Provides a clap-free entry point that drives the whole reconciliation
//! pipeline through explicit stages.
//!
//! # Port traits
//!
//! External tools sit behind ports:
//! - [`CommandRunner`](depsync_core_runtime::CommandRunner): runs rewrite and
//!   listing transforms
//! - [`BuildInterpreter`](ports::BuildInterpreter): regenerates the staging tree
//! - [`RemoteStore`](depsync_remote::RemoteStore): probes the package store
//!
//! The [`adapters`] module provides the process-backed implementations.
//!
//! # Entry points
//!
//! - [`run_sync`](pipeline::run_sync): run every stage and return the report
//! - [`Pipeline`](pipeline::Pipeline): drive stages one at a time

pub mod adapters;
pub mod pipeline;
pub mod ports;
pub mod settings;

pub use pipeline::{Pipeline, Stage, SyncOutcome, ToolError, run_sync};
pub use ports::{BuildInterpreter, BuildRequest, Ports};
pub use settings::{Layout, SyncSettings, ToolSettings};

// Re-export so embedders don't need depsync-types directly.
pub use depsync_types::report::{SyncReport, ToolInfo};
