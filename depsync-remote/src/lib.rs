//! Remote package store probing.
//!
//! The store is only ever queried. Creation commands are rendered for a human
//! to run; nothing here uploads.

mod cipd;
mod probe;

use camino::Utf8Path;
use depsync_types::{PackageDescriptor, UploadCommand};

pub use cipd::CipdCli;
pub use probe::{DEFAULT_PROBE_CONCURRENCY, probe_all, upload_commands};

/// Port onto a content-addressed package store.
pub trait RemoteStore: Send + Sync {
    /// Whether the store already holds `descriptor.name` at `descriptor.tag`.
    fn exists(&self, descriptor: &PackageDescriptor) -> anyhow::Result<bool>;

    /// Idempotent create command for a package living in `package_dir`.
    fn creation_command(
        &self,
        package_dir: &Utf8Path,
        descriptor: &PackageDescriptor,
    ) -> UploadCommand;
}
