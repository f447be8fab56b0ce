//! Port traits abstracting external tools away from the pipeline.

use camino::Utf8PathBuf;
use depsync_core_runtime::CommandRunner;
use depsync_remote::RemoteStore;
use std::sync::Arc;

/// What the build interpreter is asked to do for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub staging_root: Utf8PathBuf,
    /// Build definition inside staging.
    pub build_file: Utf8PathBuf,
    /// Regenerated build file inside staging, formatted after the build.
    pub build_gn: Utf8PathBuf,
    pub debug: bool,
    pub skip_licenses: bool,
}

/// Regenerates the package set and control files inside staging.
pub trait BuildInterpreter: Send + Sync {
    fn build(&self, request: &BuildRequest) -> anyhow::Result<()>;
}

/// Every port the pipeline talks through.
#[derive(Clone)]
pub struct Ports {
    pub runner: Arc<dyn CommandRunner>,
    pub interpreter: Arc<dyn BuildInterpreter>,
    pub remote: Arc<dyn RemoteStore>,
}
