//! The sync pipeline as an explicit, forward-only stage machine.
//!
//! Each stage method checks that it is the next stage, does its work through
//! the ports, and only then advances. Irreversible steps (archive rewrites,
//! the tracked-tree sync) come after the diff has been computed.

use crate::ports::{BuildRequest, Ports};
use crate::settings::SyncSettings;
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use depsync_apply::{ApplyOptions, ApplySummary, apply_sync, copy_path};
use depsync_artifacts::{
    ArchiveSet, RewriteConfig, find_archives, harvest_licenses, rewrite_all, write_archive_infos,
};
use depsync_core_runtime::StagingArea;
use depsync_domain::plan_sync;
use depsync_registry::scan_registry;
use depsync_remote::{probe_all, upload_commands};
use depsync_types::report::{InspectCounts, RewriteCounts, SyncReport, ToolInfo};
use depsync_types::{Registry, SyncPlan, UploadCandidate};
use std::fmt;
use tracing::{debug, info, warn};

/// Error type for pipeline results. Every variant maps to exit code 1.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("missing files from {root}: {}", join_paths(.missing))]
    Precondition {
        root: Utf8PathBuf,
        missing: Vec<Utf8PathBuf>,
    },

    #[error("stage {attempted} cannot run after {current}")]
    StageOrder { current: Stage, attempted: Stage },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ToolError {
    pub fn exit_code(&self) -> u8 {
        1
    }
}

fn join_paths(paths: &[Utf8PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Init,
    Prepared,
    Built,
    Parsed,
    Diffed,
    Rewritten,
    Inspected,
    Probed,
    Synced,
    Reported,
}

impl Stage {
    pub fn next(self) -> Option<Stage> {
        use Stage::*;
        Some(match self {
            Init => Prepared,
            Prepared => Built,
            Built => Parsed,
            Parsed => Diffed,
            Diffed => Rewritten,
            Rewritten => Inspected,
            Inspected => Probed,
            Probed => Synced,
            Synced => Reported,
            Reported => return None,
        })
    }

    fn label(self) -> &'static str {
        match self {
            Stage::Init => "init",
            Stage::Prepared => "prepare",
            Stage::Built => "build",
            Stage::Parsed => "parse",
            Stage::Diffed => "diff",
            Stage::Rewritten => "rewrite",
            Stage::Inspected => "inspect",
            Stage::Probed => "probe",
            Stage::Synced => "sync",
            Stage::Reported => "report",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of `run_sync`.
#[derive(Debug)]
pub struct SyncOutcome {
    pub report: SyncReport,
    pub plan: SyncPlan,
    pub apply: ApplySummary,
}

pub struct Pipeline<'a> {
    settings: &'a SyncSettings,
    ports: Ports,
    stage: Stage,

    staging: Option<StagingArea>,
    staging_root: Utf8PathBuf,
    registries: Option<(Registry, Registry)>,
    plan: Option<SyncPlan>,
    archives: ArchiveSet,
    candidates: Vec<UploadCandidate>,
    apply: ApplySummary,
    report: SyncReport,
}

impl<'a> Pipeline<'a> {
    pub fn new(settings: &'a SyncSettings, ports: Ports, tool: ToolInfo) -> Self {
        Self {
            settings,
            ports,
            stage: Stage::Init,
            staging: None,
            staging_root: Utf8PathBuf::new(),
            registries: None,
            plan: None,
            archives: ArchiveSet::default(),
            candidates: Vec::new(),
            apply: ApplySummary::default(),
            report: SyncReport::new(tool, settings.repo_root.as_str()),
        }
    }

    /// Enter at `Parsed` with registries already in hand, skipping preparation
    /// and the build. `staging_root` stands in for the provisioned staging dir.
    pub fn with_registries(
        settings: &'a SyncSettings,
        ports: Ports,
        tool: ToolInfo,
        staging_root: impl Into<Utf8PathBuf>,
        existing: Registry,
        build: Registry,
    ) -> Self {
        let mut pipeline = Self::new(settings, ports, tool);
        pipeline.staging_root = staging_root.into();
        pipeline.report.staging_dir = Some(pipeline.staging_root.to_string());
        pipeline.registries = Some((existing, build));
        pipeline.stage = Stage::Parsed;
        pipeline
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn staging_root(&self) -> &Utf8Path {
        &self.staging_root
    }

    pub fn plan(&self) -> Option<&SyncPlan> {
        self.plan.as_ref()
    }

    fn expect_next(&self, attempted: Stage) -> Result<(), ToolError> {
        if self.stage.next() == Some(attempted) {
            Ok(())
        } else {
            Err(ToolError::StageOrder {
                current: self.stage,
                attempted,
            })
        }
    }

    fn advance(&mut self, to: Stage) {
        debug!(from = %self.stage, to = %to, "stage complete");
        self.stage = to;
    }

    /// Check preconditions, provision staging and seed it with the inputs.
    pub fn prepare(&mut self) -> Result<(), ToolError> {
        self.expect_next(Stage::Prepared)?;
        let s = self.settings;

        if !s.repo_root.is_dir() {
            return Err(anyhow::anyhow!("not a directory: {}", s.repo_root).into());
        }
        let inputs = s.layout.required_inputs(s.ignore_licenses);
        let missing: Vec<Utf8PathBuf> = inputs
            .iter()
            .filter(|p| !s.repo_root.join(p).exists())
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(ToolError::Precondition {
                root: s.repo_root.clone(),
                missing,
            });
        }

        let staging = StagingArea::provision(s.build_dir.as_deref())?;
        info!(path = %staging.path(), "using build directory");
        for rel in &inputs {
            copy_path(&s.repo_root.join(rel), &staging.path().join(rel))
                .with_context(|| format!("seed staging with {rel}"))?;
        }

        self.staging_root = staging.path().to_path_buf();
        self.report.staging_dir = Some(self.staging_root.to_string());
        self.staging = Some(staging);
        self.advance(Stage::Prepared);
        Ok(())
    }

    pub fn build(&mut self) -> Result<(), ToolError> {
        self.expect_next(Stage::Built)?;
        let layout = &self.settings.layout;
        let request = BuildRequest {
            staging_root: self.staging_root.clone(),
            build_file: self.staging_root.join(layout.build_file()),
            build_gn: self.staging_root.join(layout.build_gn()),
            debug: self.settings.debug,
            skip_licenses: self.settings.ignore_licenses,
        };
        self.ports.interpreter.build(&request)?;
        self.advance(Stage::Built);
        Ok(())
    }

    /// Scan the tracked tree and the staging tree.
    pub fn parse(&mut self) -> Result<(), ToolError> {
        self.expect_next(Stage::Parsed)?;
        let libs = self.settings.layout.libs_subdir();
        let existing = scan_registry(&self.settings.repo_root, &libs)
            .context("scan tracked packages")?;
        let build = scan_registry(&self.staging_root, &libs).context("scan built packages")?;
        info!(
            existing = existing.len(),
            build = build.len(),
            "package registries scanned"
        );
        self.registries = Some((existing, build));
        self.advance(Stage::Parsed);
        Ok(())
    }

    pub fn diff(&mut self) -> Result<(), ToolError> {
        self.expect_next(Stage::Diffed)?;
        let (existing, build) = self
            .registries
            .take()
            .context("registries missing at diff stage")?;
        let plan = plan_sync(existing, build);
        info!(
            new = plan.diff.new.len(),
            updated = plan.diff.updated.len(),
            deleted = plan.diff.deleted.len(),
            "compared packages"
        );
        self.report.diff = plan.diff.clone();
        self.plan = Some(plan);
        self.advance(Stage::Diffed);
        Ok(())
    }

    pub async fn rewrite(&mut self) -> Result<(), ToolError> {
        self.expect_next(Stage::Rewritten)?;
        let s = self.settings;
        let libs_dir = self.staging_root.join(s.layout.libs_subdir());
        self.archives = find_archives(&libs_dir)?;

        let config = RewriteConfig {
            command: s.resolve(&s.tools.jetifier),
            config_file: s.resolve(&s.tools.jetifier_config),
            java_home: s.tools.java_home.as_deref().map(|p| s.resolve(p)),
            libs_dir,
            exclude: s.rewrite_exclude.clone(),
            concurrency: s.rewrite_concurrency,
        };
        let summary = rewrite_all(self.ports.runner.clone(), &config, self.archives.all()).await?;

        self.report.rewrite = RewriteCounts {
            total: summary.jobs.len() as u64,
            rewritten: summary.rewritten_count() as u64,
            excluded: summary.excluded.len() as u64,
        };
        self.advance(Stage::Rewritten);
        Ok(())
    }

    /// Metadata sidecars, then embedded licenses unless they are ignored.
    pub async fn inspect(&mut self) -> Result<(), ToolError> {
        self.expect_next(Stage::Inspected)?;
        let s = self.settings;
        let aar_tool = s.resolve(&s.tools.aar_tool);
        let infos =
            write_archive_infos(self.ports.runner.clone(), &aar_tool, &self.archives.aars).await?;

        let licenses = if s.ignore_licenses {
            0
        } else {
            info!("looking for embedded license files");
            harvest_licenses(&self.archives.aars)?
        };

        self.report.inspect = InspectCounts {
            infos_written: infos.len() as u64,
            licenses_merged: licenses as u64,
        };
        self.advance(Stage::Inspected);
        Ok(())
    }

    /// Probe the remote store for every built package.
    pub async fn probe(&mut self) -> Result<(), ToolError> {
        self.expect_next(Stage::Probed)?;
        let plan = self.plan.as_ref().context("plan missing at probe stage")?;
        let descriptors = plan.build.descriptors().cloned().collect::<Vec<_>>();
        info!(count = descriptors.len(), "querying remote packages");

        self.candidates = probe_all(
            self.ports.remote.clone(),
            descriptors,
            self.settings.probe_concurrency,
        )
        .await?;
        self.advance(Stage::Probed);
        Ok(())
    }

    /// Replace tracked packages and control files; a dry run only counts.
    pub fn sync(&mut self) -> Result<(), ToolError> {
        self.expect_next(Stage::Synced)?;
        let plan = self.plan.as_ref().context("plan missing at sync stage")?;
        let opts = ApplyOptions {
            tracked_root: self.settings.repo_root.clone(),
            staging_root: self.staging_root.clone(),
            control_files: self.settings.layout.control_files.clone(),
            dry_run: self.settings.dry_run,
        };
        self.apply = apply_sync(plan, &opts).context("sync tracked tree")?;
        self.report.synced = !self.settings.dry_run;
        self.report.dry_run = self.settings.dry_run;
        self.advance(Stage::Synced);
        Ok(())
    }

    /// Upload commands point at the tracked tree after a sync. A dry run left
    /// the tracked tree stale, so they point at staging instead, and are
    /// withheld when staging is about to be removed.
    pub fn report(&mut self) -> Result<SyncReport, ToolError> {
        self.expect_next(Stage::Reported)?;
        let ephemeral = self.staging.as_ref().is_some_and(StagingArea::is_ephemeral);
        if self.settings.dry_run && ephemeral {
            self.report.uploads_withheld = self
                .candidates
                .iter()
                .filter(|c| !c.exists_remotely)
                .map(|c| c.descriptor.name.clone())
                .collect();
            if !self.report.uploads_withheld.is_empty() {
                warn!(
                    count = self.report.uploads_withheld.len(),
                    "dry run without --build-dir: upload commands withheld"
                );
            }
        } else {
            let package_root = if self.settings.dry_run {
                &self.staging_root
            } else {
                &self.settings.repo_root
            };
            let commands = upload_commands(
                self.ports.remote.as_ref(),
                &self.candidates,
                package_root,
                &self.settings.display_base,
            );
            self.report.upload_commands = commands.iter().map(|c| c.render()).collect();
        }
        self.report.run.finish();
        info!("all done");
        self.advance(Stage::Reported);
        Ok(self.report.clone())
    }

    fn into_outcome(mut self, report: SyncReport) -> Result<SyncOutcome, ToolError> {
        let plan = self.plan.take().context("plan missing after report")?;
        Ok(SyncOutcome {
            report,
            plan,
            apply: self.apply,
        })
    }
}

/// Run every stage in order. An ephemeral staging dir is removed on return,
/// whether the run succeeded or not.
pub async fn run_sync(
    settings: &SyncSettings,
    ports: Ports,
    tool: ToolInfo,
) -> Result<SyncOutcome, ToolError> {
    let mut pipeline = Pipeline::new(settings, ports, tool);
    pipeline.prepare()?;
    pipeline.build()?;
    pipeline.parse()?;
    pipeline.diff()?;
    pipeline.rewrite().await?;
    pipeline.inspect().await?;
    pipeline.probe().await?;
    pipeline.sync()?;
    let report = pipeline.report()?;
    pipeline.into_outcome(report)
}
