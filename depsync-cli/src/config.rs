//! Configuration file loading for depsync.
//!
//! Discovers and loads `depsync.toml` from the repository root.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use depsync_core::{Layout, SyncSettings, ToolSettings};
use fs_err as fs;
use serde::Deserialize;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "depsync.toml";

/// Top-level configuration from depsync.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DepsyncConfig {
    pub layout: LayoutConfig,
    pub tools: ToolsConfig,
    pub rewrite: RewriteConfig,
    pub remote: RemoteConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Dependency directory relative to the repo root.
    pub deps_subdir: Option<Utf8PathBuf>,

    /// Replaces the default control file list.
    pub control_files: Option<Vec<Utf8PathBuf>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    pub gradle_wrapper: Option<Utf8PathBuf>,
    pub gn: Option<String>,
    /// Skip `gn format` on the regenerated build file.
    pub skip_gn_format: bool,
    pub jetifier: Option<Utf8PathBuf>,
    pub jetifier_config: Option<Utf8PathBuf>,
    pub java_home: Option<Utf8PathBuf>,
    pub aar_tool: Option<Utf8PathBuf>,
    pub cipd: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RewriteConfig {
    /// Extra path substrings excluded from rewriting, on top of the defaults.
    pub exclude: Vec<String>,

    /// Cap on concurrent rewrites (default: all at once).
    pub concurrency: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemoteConfig {
    pub probe_concurrency: Option<usize>,
}

/// Discover the depsync.toml config file.
///
/// Returns `None` if no config file is found.
pub fn discover_config(repo_root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = repo_root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

pub fn load_config(path: &Utf8Path) -> anyhow::Result<DepsyncConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

pub fn parse_config(contents: &str) -> anyhow::Result<DepsyncConfig> {
    let config: DepsyncConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from repo root, or return default if not found.
pub fn load_or_default(repo_root: &Utf8Path) -> anyhow::Result<DepsyncConfig> {
    match discover_config(repo_root) {
        Some(path) => load_config(&path),
        None => Ok(DepsyncConfig::default()),
    }
}

/// Values taken from the `sync` command line.
#[derive(Debug, Clone, Default)]
pub struct SyncOverrides {
    pub build_dir: Option<Utf8PathBuf>,
    pub ignore_licenses: bool,
    pub dry_run: bool,
    pub debug: bool,
    pub exclude: Vec<String>,
    pub probe_concurrency: Option<usize>,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: DepsyncConfig,
}

impl ConfigMerger {
    pub fn new(config: DepsyncConfig) -> Self {
        Self { config }
    }

    /// Produce pipeline settings.
    ///
    /// CLI `exclude` extends the config list, which extends the defaults.
    /// CLI `probe_concurrency` overrides the config value.
    pub fn merge_sync_args(
        self,
        repo_root: Utf8PathBuf,
        display_base: Utf8PathBuf,
        cli: SyncOverrides,
    ) -> SyncSettings {
        let defaults = SyncSettings::default();

        let mut layout = match &self.config.layout.deps_subdir {
            Some(subdir) => Layout::for_subdir(subdir.clone()),
            None => Layout::default(),
        };
        if let Some(control_files) = self.config.layout.control_files {
            layout.control_files = control_files;
        }

        let t = self.config.tools;
        let base = ToolSettings::default();
        let tools = ToolSettings {
            gradle_wrapper: t.gradle_wrapper.unwrap_or(base.gradle_wrapper),
            gn: if t.skip_gn_format {
                None
            } else {
                t.gn.or(base.gn)
            },
            jetifier: t.jetifier.unwrap_or(base.jetifier),
            jetifier_config: t.jetifier_config.unwrap_or(base.jetifier_config),
            java_home: t.java_home.or(base.java_home),
            aar_tool: t.aar_tool.unwrap_or(base.aar_tool),
            cipd: t.cipd.unwrap_or(base.cipd),
        };

        let mut rewrite_exclude = defaults.rewrite_exclude;
        for pattern in self.config.rewrite.exclude.iter().chain(&cli.exclude) {
            if !rewrite_exclude.contains(pattern) {
                rewrite_exclude.push(pattern.clone());
            }
        }

        SyncSettings {
            repo_root,
            build_dir: cli.build_dir,
            display_base,
            ignore_licenses: cli.ignore_licenses,
            dry_run: cli.dry_run,
            debug: cli.debug,
            layout,
            tools,
            rewrite_exclude,
            rewrite_concurrency: self.config.rewrite.concurrency,
            probe_concurrency: cli
                .probe_concurrency
                .or(self.config.remote.probe_concurrency)
                .unwrap_or(defaults.probe_concurrency),
        }
    }
}
