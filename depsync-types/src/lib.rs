//! Shared DTOs (schemas-as-code) for the depsync workspace.
//!
//! # Design constraints
//! - Registries and descriptors are immutable snapshots once built.
//! - Every collection that ends up in a report is ordered, so two runs over
//!   identical inputs serialize identically.
//! - Commands are kept structured ([`command::CommandSpec`]) and only turned
//!   into shell text when displayed.

pub mod command;
pub mod descriptor;
pub mod plan;
pub mod report;
pub mod rewrite;
pub mod upload;

pub use command::CommandSpec;
pub use descriptor::{DESCRIPTOR_FILE_NAME, PackageDescriptor, Registry};
pub use plan::{PackageDiff, SyncPlan};
pub use rewrite::{RewriteJob, RewriteOutcome, RewriteSummary};
pub use upload::{UploadCandidate, UploadCommand};

/// Schema identifiers.
pub mod schema {
    pub const DEPSYNC_REPORT_V1: &str = "depsync.report.v1";
}
