use camino::{Utf8Path, Utf8PathBuf};
use depsync_apply::{ApplyOptions, ApplySummary, apply_sync};
use depsync_domain::plan_sync;
use depsync_registry::scan_registry;
use depsync_types::SyncPlan;
use fs_err as fs;
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use tempfile::TempDir;

const LIBS: &str = "third_party/android_deps/libs";

struct Trees {
    _temp: TempDir,
    tracked: Utf8PathBuf,
    staging: Utf8PathBuf,
}

fn write(path: &Utf8Path, contents: &str) {
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, contents).expect("write");
}

fn package(root: &Utf8Path, dir: &str, tag: &str, extra: &[(&str, &str)]) {
    let pkg = root.join(LIBS).join(dir);
    write(
        &pkg.join("cipd.yaml"),
        &format!("# cipd create --pkg-def cipd.yaml -tag {tag}\npackage: pkg/{dir}\n"),
    );
    for (name, contents) in extra {
        write(&pkg.join(name), contents);
    }
}

/// tracked: A@1, B@1 (+ a stray local file in B); staging: A@1, C@1, DEPS rewritten.
fn trees() -> Trees {
    let temp = TempDir::new().expect("temp");
    let base = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
    let tracked = base.join("src");
    let staging = base.join("build");

    write(&tracked.join("DEPS"), "deps = { old }\n");
    package(&tracked, "a", "1", &[("a.jar", "A1")]);
    package(&tracked, "b", "1", &[("b.jar", "B1"), ("local.txt", "stray")]);

    write(&staging.join("DEPS"), "deps = { new }\n");
    package(&staging, "a", "1", &[("a.jar", "A1")]);
    package(&staging, "c", "1", &[("c.jar", "C1"), ("sub/LICENSE", "MIT")]);

    Trees {
        _temp: temp,
        tracked,
        staging,
    }
}

fn plan(t: &Trees) -> SyncPlan {
    let libs = Utf8Path::new(LIBS);
    plan_sync(
        scan_registry(&t.tracked, libs).expect("tracked"),
        scan_registry(&t.staging, libs).expect("staging"),
    )
}

fn options(t: &Trees, dry_run: bool) -> ApplyOptions {
    ApplyOptions {
        tracked_root: t.tracked.clone(),
        staging_root: t.staging.clone(),
        control_files: vec!["DEPS".into()],
        dry_run,
    }
}

fn snapshot(root: &Utf8Path) -> BTreeMap<String, String> {
    walkdir::WalkDir::new(root)
        .into_iter()
        .map(|e| e.expect("walk"))
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e
                .path()
                .strip_prefix(root)
                .expect("prefix")
                .to_string_lossy()
                .into_owned();
            (rel, fs::read_to_string(e.path()).expect("read"))
        })
        .collect()
}

#[test]
fn sync_replaces_packages_and_control_files() {
    let t = trees();
    let plan = plan(&t);
    assert_eq!(plan.diff.new, vec!["pkg/c"]);
    assert_eq!(plan.diff.deleted, vec!["pkg/b"]);

    let summary = apply_sync(&plan, &options(&t, false)).expect("apply");
    assert_eq!(
        summary,
        ApplySummary {
            control_files: 1,
            removed_dirs: 2,
            copied_dirs: 2,
            dry_run: false,
        }
    );

    let libs = t.tracked.join(LIBS);
    assert_eq!(fs::read_to_string(t.tracked.join("DEPS")).expect("DEPS"), "deps = { new }\n");
    assert!(!libs.join("b").exists());
    assert_eq!(fs::read_to_string(libs.join("c/sub/LICENSE")).expect("license"), "MIT");
    assert_eq!(fs::read_to_string(libs.join("a/a.jar")).expect("a"), "A1");
}

#[test]
fn applying_twice_is_idempotent() {
    let t = trees();
    let first_plan = plan(&t);
    apply_sync(&first_plan, &options(&t, false)).expect("first");
    let after_first = snapshot(&t.tracked);

    let second_plan = plan(&t);
    assert!(second_plan.diff.is_noop());
    apply_sync(&second_plan, &options(&t, false)).expect("second");
    assert_eq!(snapshot(&t.tracked), after_first);
}

#[test]
fn tracked_tree_matches_staging_for_managed_paths() {
    let t = trees();
    apply_sync(&plan(&t), &options(&t, false)).expect("apply");

    let tracked_libs = snapshot(&t.tracked.join(LIBS));
    let staging_libs = snapshot(&t.staging.join(LIBS));
    assert_eq!(tracked_libs, staging_libs);
}

#[test]
fn dry_run_leaves_tracked_tree_untouched() {
    let t = trees();
    let before = snapshot(&t.tracked);

    let summary = apply_sync(&plan(&t), &options(&t, true)).expect("dry run");
    assert!(summary.dry_run);
    assert_eq!(summary.control_files, 1);
    assert_eq!(summary.removed_dirs, 2);
    assert_eq!(summary.copied_dirs, 2);
    assert_eq!(snapshot(&t.tracked), before);
}

#[test]
fn missing_staging_source_fails_before_mutation() {
    let t = trees();
    let before = snapshot(&t.tracked);
    let mut opts = options(&t, false);
    opts.control_files.push("third_party/android_deps/BUILD.gn".into());

    let err = apply_sync(&plan(&t), &opts).expect_err("missing control file");
    assert!(err.to_string().contains("BUILD.gn"), "{err}");
    assert_eq!(snapshot(&t.tracked), before);
}
