//! Runtime adapters shared by the depsync pipeline stages.
//!
//! - [`runner`]: the [`CommandRunner`] port and its process-backed adapter
//! - [`pool`]: a bounded worker pool for fanning out blocking jobs
//! - [`staging`]: the per-run staging directory

pub mod pool;
pub mod runner;
pub mod staging;

pub use pool::run_bounded;
pub use runner::{CommandOutput, CommandRunner, ExecError, ProcessRunner};
pub use staging::StagingArea;
