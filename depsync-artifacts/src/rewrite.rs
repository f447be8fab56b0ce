//! In-place platform rewrite of staged archives.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use depsync_core_runtime::{CommandRunner, run_bounded};
use depsync_types::{CommandSpec, RewriteJob, RewriteOutcome, RewriteSummary};
use std::sync::Arc;
use tracing::{debug, info};

/// Path substrings whose archives are never rewritten.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "android_arch_",
    "androidx_",
    "com_android_support_",
    "errorprone",
    "jetifier",
];

/// Printed by the transform when an archive needs no rewriting.
pub const NOOP_SENTINEL: &str = "You don't need to run Jetifier";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteConfig {
    /// Rewrite executable.
    pub command: Utf8PathBuf,
    /// Mapping config passed with `-c`.
    pub config_file: Utf8PathBuf,
    pub java_home: Option<Utf8PathBuf>,
    /// Exported to the transform as `ANDROID_DEPS`.
    pub libs_dir: Utf8PathBuf,
    pub exclude: Vec<String>,
    /// Cap on concurrent rewrites; `None` runs every job at once.
    pub concurrency: Option<usize>,
}

impl RewriteConfig {
    pub fn new(
        command: impl Into<Utf8PathBuf>,
        config_file: impl Into<Utf8PathBuf>,
        libs_dir: impl Into<Utf8PathBuf>,
    ) -> Self {
        Self {
            command: command.into(),
            config_file: config_file.into(),
            java_home: None,
            libs_dir: libs_dir.into(),
            exclude: DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect(),
            concurrency: None,
        }
    }

    /// Denylist match on the path below `libs_dir`, so the location of the
    /// staging dir itself never excludes anything.
    pub fn is_excluded(&self, archive: &Utf8Path) -> bool {
        let rel = archive.strip_prefix(&self.libs_dir).unwrap_or(archive);
        self.exclude.iter().any(|x| rel.as_str().contains(x.as_str()))
    }

    pub fn command_for(&self, archive: &Utf8Path) -> CommandSpec {
        let mut spec = CommandSpec::new(self.command.as_str())
            .arg("-c")
            .arg(self.config_file.as_str())
            .arg("-i")
            .arg(archive.as_str())
            .arg("-o")
            .arg(archive.as_str());
        if let Some(java_home) = &self.java_home {
            spec = spec.env("JAVA_HOME", java_home.as_str());
        }
        spec.env("ANDROID_DEPS", self.libs_dir.as_str())
    }
}

pub fn classify(output: &str) -> RewriteOutcome {
    if output.contains(NOOP_SENTINEL) {
        RewriteOutcome::Unchanged
    } else {
        RewriteOutcome::Rewritten
    }
}

/// Rewrite every non-excluded archive in place.
///
/// Any non-zero exit fails the batch with the command line, status and
/// output of the failing job.
pub async fn rewrite_all(
    runner: Arc<dyn CommandRunner>,
    config: &RewriteConfig,
    archives: Vec<Utf8PathBuf>,
) -> anyhow::Result<RewriteSummary> {
    let (excluded, targets): (Vec<_>, Vec<_>) =
        archives.into_iter().partition(|a| config.is_excluded(a));
    for path in &excluded {
        debug!(path = %path, "excluded from rewrite");
    }

    let limit = config.concurrency.unwrap_or(targets.len());
    let specs: Vec<(Utf8PathBuf, CommandSpec)> = targets
        .into_iter()
        .map(|path| {
            let spec = config.command_for(&path);
            (path, spec)
        })
        .collect();

    let jobs = run_bounded(specs, limit, move |(path, spec)| {
        let out = runner
            .run_checked(&spec)
            .with_context(|| format!("rewrite failed for {path}"))?;
        let outcome = classify(&out.output);
        if outcome == RewriteOutcome::Rewritten {
            info!(path = %path, "needed rewrite");
        }
        Ok(RewriteJob { path, outcome })
    })
    .await?;

    let summary = RewriteSummary { jobs, excluded };
    info!(
        "Jetify was needed for {} out of {} files",
        summary.rewritten_count(),
        summary.jobs.len()
    );
    Ok(summary)
}
