//! Sync applier for depsync plans.
//!
//! Responsibilities:
//! - Verify every staging source exists before the tracked tree is touched.
//! - Copy control files, remove every tracked package dir, copy every built
//!   package dir, in that order.
//! - Report what would change without touching disk in dry-run mode.

mod fsops;

pub use fsops::{copy_path, delete_dir};

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use depsync_types::SyncPlan;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    pub tracked_root: Utf8PathBuf,
    pub staging_root: Utf8PathBuf,
    /// Paths relative to both roots, copied staging → tracked first.
    pub control_files: Vec<Utf8PathBuf>,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplySummary {
    pub control_files: usize,
    pub removed_dirs: usize,
    pub copied_dirs: usize,
    pub dry_run: bool,
}

/// Make the tracked tree match the staging tree for everything in `plan`.
///
/// Every package dir of `plan.existing` is removed and every package dir of
/// `plan.build` is copied back, so unchanged packages are refreshed too and a
/// second application yields the same tree. A crash between the delete and
/// copy steps leaves the tracked tree partially synced; re-running repairs it.
pub fn apply_sync(plan: &SyncPlan, opts: &ApplyOptions) -> anyhow::Result<ApplySummary> {
    let control: Vec<(Utf8PathBuf, Utf8PathBuf)> = opts
        .control_files
        .iter()
        .map(|rel| (opts.staging_root.join(rel), opts.tracked_root.join(rel)))
        .collect();
    let packages: Vec<(Utf8PathBuf, Utf8PathBuf)> = plan
        .build
        .descriptors()
        .map(|d| (opts.staging_root.join(&d.path), opts.tracked_root.join(&d.path)))
        .collect();

    for (src, _) in control.iter().chain(&packages) {
        ensure_exists(src)?;
    }

    let stale: Vec<Utf8PathBuf> = plan
        .existing
        .descriptors()
        .map(|d| opts.tracked_root.join(&d.path))
        .collect();

    let mut summary = ApplySummary {
        dry_run: opts.dry_run,
        ..ApplySummary::default()
    };

    if opts.dry_run {
        summary.control_files = control.len();
        summary.removed_dirs = stale.iter().filter(|p| p.exists()).count();
        summary.copied_dirs = packages.len();
        info!(?summary, "dry run: tracked tree left untouched");
        return Ok(summary);
    }

    for (src, dst) in &control {
        copy_path(src, dst).with_context(|| format!("sync control file {dst}"))?;
        summary.control_files += 1;
    }

    for dir in &stale {
        if delete_dir(dir)? {
            summary.removed_dirs += 1;
        }
    }

    for (src, dst) in &packages {
        copy_path(src, dst).with_context(|| format!("sync package dir {dst}"))?;
        summary.copied_dirs += 1;
    }

    info!(
        control_files = summary.control_files,
        removed = summary.removed_dirs,
        copied = summary.copied_dirs,
        "tracked tree synced"
    );
    Ok(summary)
}

fn ensure_exists(src: &Utf8Path) -> anyhow::Result<()> {
    if !src.exists() {
        anyhow::bail!("staging source {src} does not exist");
    }
    debug!(path = %src, "staging source present");
    Ok(())
}
