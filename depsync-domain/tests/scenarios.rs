use camino::{Utf8Path, Utf8PathBuf};
use depsync_domain::{diff_registries, plan_sync};
use depsync_registry::scan_registry;
use depsync_types::{PackageDescriptor, Registry};
use pretty_assertions::assert_eq;

fn registry(pkgs: &[(&str, &str)]) -> Registry {
    Registry::from_descriptors(
        "/repo",
        pkgs.iter()
            .map(|(name, tag)| PackageDescriptor::new(format!("libs/{name}"), *name, *tag)),
    )
}

fn fixture(name: &str) -> Utf8PathBuf {
    Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("tests")
        .join("fixtures")
        .join("registry")
        .join(name)
}

#[test]
fn added_and_removed_packages() {
    let existing = registry(&[("A", "1"), ("B", "1")]);
    let build = registry(&[("A", "1"), ("C", "1")]);

    let diff = diff_registries(&existing, &build);
    assert_eq!(diff.new, vec!["C"]);
    assert_eq!(diff.deleted, vec!["B"]);
    assert!(diff.updated.is_empty());
    assert_eq!(diff.unchanged, vec!["A"]);
}

#[test]
fn tag_change_is_an_update() {
    let diff = diff_registries(&registry(&[("A", "1")]), &registry(&[("A", "2")]));
    assert_eq!(diff.updated, vec!["A"]);
    assert!(diff.new.is_empty());
    assert!(diff.deleted.is_empty());
    assert!(!diff.is_noop());
}

#[test]
fn moved_package_with_same_tag_is_unchanged() {
    let existing = Registry::from_descriptors(
        "/repo",
        [PackageDescriptor::new("libs/old", "A", "1")],
    );
    let build = Registry::from_descriptors(
        "/repo",
        [PackageDescriptor::new("libs/new", "A", "1")],
    );
    let diff = diff_registries(&existing, &build);
    assert_eq!(diff.unchanged, vec!["A"]);
    assert!(diff.is_noop());
}

#[test]
fn diff_of_fixture_trees() {
    let libs = Utf8Path::new("third_party/android_deps/libs");
    let tracked = scan_registry(&fixture("tracked"), libs).expect("tracked");
    let staging = scan_registry(&fixture("staging"), libs).expect("staging");

    let plan = plan_sync(tracked, staging);
    let prefix = "chromium/third_party/android_deps/libs/";
    let strip = |v: &[String]| -> Vec<String> {
        v.iter()
            .map(|n| n.trim_start_matches(prefix).to_string())
            .collect()
    };

    assert_eq!(strip(&plan.diff.new), vec!["org_checkerframework_checker_qual"]);
    assert_eq!(strip(&plan.diff.updated), vec!["com_google_guava_guava"]);
    assert_eq!(strip(&plan.diff.deleted), vec!["javax_inject_javax_inject"]);
    assert_eq!(strip(&plan.diff.unchanged), vec!["com_squareup_okio_okio"]);
    assert_eq!(plan.diff.total(), 4);
}
