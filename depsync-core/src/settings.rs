//! Clap-free settings for the sync pipeline.

use camino::{Utf8Path, Utf8PathBuf};
use depsync_artifacts::rewrite::DEFAULT_EXCLUDES;
use depsync_remote::DEFAULT_PROBE_CONCURRENCY;

pub const DEFAULT_DEPS_SUBDIR: &str = "third_party/android_deps";

/// Where things live relative to the repository root (and, mirrored, the
/// staging root).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub deps_subdir: Utf8PathBuf,
    /// Files regenerated by the build and copied back on sync.
    pub control_files: Vec<Utf8PathBuf>,
    /// Copied into staging before the build; never synced back.
    pub build_inputs: Vec<Utf8PathBuf>,
    /// Seeded like a build input unless licenses are ignored.
    pub licenses_dir: Utf8PathBuf,
}

impl Layout {
    pub fn for_subdir(deps_subdir: impl Into<Utf8PathBuf>) -> Self {
        let deps: Utf8PathBuf = deps_subdir.into();
        Self {
            control_files: vec![
                Utf8PathBuf::from("DEPS"),
                deps.join("BUILD.gn"),
                deps.join("additional_readme_paths.json"),
            ],
            build_inputs: vec![deps.join("build.gradle"), deps.join("buildSrc")],
            licenses_dir: deps.join("licenses"),
            deps_subdir: deps,
        }
    }

    pub fn libs_subdir(&self) -> Utf8PathBuf {
        self.deps_subdir.join("libs")
    }

    pub fn build_file(&self) -> Utf8PathBuf {
        self.deps_subdir.join("build.gradle")
    }

    pub fn build_gn(&self) -> Utf8PathBuf {
        self.deps_subdir.join("BUILD.gn")
    }

    /// Everything that must exist in the tracked tree before a run, which is
    /// also everything seeded into staging.
    pub fn required_inputs(&self, ignore_licenses: bool) -> Vec<Utf8PathBuf> {
        let mut paths = self.control_files.clone();
        paths.extend(self.build_inputs.iter().cloned());
        if !ignore_licenses {
            paths.push(self.licenses_dir.clone());
        }
        paths
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::for_subdir(DEFAULT_DEPS_SUBDIR)
    }
}

/// External tool locations. Relative paths resolve against the repo root;
/// bare program names (`cipd`, `gn`) are looked up on `PATH`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSettings {
    pub gradle_wrapper: Utf8PathBuf,
    /// Formatter for the regenerated BUILD.gn; `None` skips formatting.
    pub gn: Option<String>,
    pub jetifier: Utf8PathBuf,
    pub jetifier_config: Utf8PathBuf,
    pub java_home: Option<Utf8PathBuf>,
    pub aar_tool: Utf8PathBuf,
    pub cipd: String,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            gradle_wrapper: Utf8PathBuf::from("third_party/gradle_wrapper/gradlew"),
            gn: Some("gn".to_string()),
            jetifier: Utf8PathBuf::from("third_party/jetifier_standalone/bin/jetifier-standalone"),
            jetifier_config: Utf8PathBuf::from(
                "third_party/jetifier_standalone/config/ignore_R.config",
            ),
            java_home: Some(Utf8PathBuf::from("third_party/jdk/current")),
            aar_tool: Utf8PathBuf::from("build/android/gyp/aar.py"),
            cipd: "cipd".to_string(),
        }
    }
}

/// Settings for one sync run.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// Tracked tree (source of record).
    pub repo_root: Utf8PathBuf,
    /// Persistent staging dir; a temporary one is used when unset.
    pub build_dir: Option<Utf8PathBuf>,
    /// Upload commands show package dirs relative to this directory.
    pub display_base: Utf8PathBuf,

    pub ignore_licenses: bool,
    pub dry_run: bool,
    /// Pass `--debug` to the build interpreter.
    pub debug: bool,

    pub layout: Layout,
    pub tools: ToolSettings,

    // Rewrite
    pub rewrite_exclude: Vec<String>,
    pub rewrite_concurrency: Option<usize>,

    // Remote
    pub probe_concurrency: usize,
}

impl SyncSettings {
    pub fn resolve(&self, path: &Utf8Path) -> Utf8PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.repo_root.join(path)
        }
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            repo_root: Utf8PathBuf::from("."),
            build_dir: None,
            display_base: Utf8PathBuf::from("."),
            ignore_licenses: false,
            dry_run: false,
            debug: false,
            layout: Layout::default(),
            tools: ToolSettings::default(),
            rewrite_exclude: DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect(),
            rewrite_concurrency: None,
            probe_concurrency: DEFAULT_PROBE_CONCURRENCY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_paths() {
        let layout = Layout::default();
        assert_eq!(layout.libs_subdir(), "third_party/android_deps/libs");
        assert_eq!(
            layout.control_files,
            vec![
                Utf8PathBuf::from("DEPS"),
                "third_party/android_deps/BUILD.gn".into(),
                "third_party/android_deps/additional_readme_paths.json".into(),
            ]
        );
    }

    #[test]
    fn licenses_dir_is_required_unless_ignored() {
        let layout = Layout::default();
        assert!(layout.required_inputs(false).contains(&layout.licenses_dir));
        assert!(!layout.required_inputs(true).contains(&layout.licenses_dir));
    }

    #[test]
    fn relative_tool_paths_resolve_against_repo_root() {
        let settings = SyncSettings {
            repo_root: "/src".into(),
            ..SyncSettings::default()
        };
        assert_eq!(
            settings.resolve(&settings.tools.aar_tool),
            "/src/build/android/gyp/aar.py"
        );
        assert_eq!(settings.resolve(Utf8Path::new("/opt/jdk")), "/opt/jdk");
    }
}
