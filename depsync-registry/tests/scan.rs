use camino::{Utf8Path, Utf8PathBuf};
use depsync_registry::{DescriptorError, RegistryError, scan_registry};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

const LIBS: &str = "third_party/android_deps/libs";

fn fixture(name: &str) -> Utf8PathBuf {
    Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("tests")
        .join("fixtures")
        .join("registry")
        .join(name)
}

fn temp_root() -> (TempDir, Utf8PathBuf) {
    let temp = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
    (temp, root)
}

fn write_descriptor(root: &Utf8Path, dir: &str, name: &str, tag: &str) {
    let pkg = root.join(LIBS).join(dir);
    fs::create_dir_all(&pkg).expect("mkdir");
    fs::write(
        pkg.join("cipd.yaml"),
        format!("# cipd create --pkg-def cipd.yaml -tag {tag}\npackage: {name}\n"),
    )
    .expect("write descriptor");
}

#[test]
fn scans_fixture_tree() {
    let root = fixture("tracked");
    let registry = scan_registry(&root, Utf8Path::new(LIBS)).expect("scan");

    let names: Vec<&str> = registry.names().collect();
    assert_eq!(
        names,
        vec![
            "chromium/third_party/android_deps/libs/com_google_guava_guava",
            "chromium/third_party/android_deps/libs/com_squareup_okio_okio",
            "chromium/third_party/android_deps/libs/javax_inject_javax_inject",
        ]
    );

    let guava = registry
        .get("chromium/third_party/android_deps/libs/com_google_guava_guava")
        .expect("guava");
    assert_eq!(guava.tag, "version:30.1-jre-cr0");
    assert_eq!(
        guava.path,
        Utf8PathBuf::from("third_party/android_deps/libs/com_google_guava_guava")
    );
}

#[test]
fn paths_are_relative_to_root_so_trees_compare() {
    let tracked = scan_registry(&fixture("tracked"), Utf8Path::new(LIBS)).expect("tracked");
    let staging = scan_registry(&fixture("staging"), Utf8Path::new(LIBS)).expect("staging");

    let okio = "chromium/third_party/android_deps/libs/com_squareup_okio_okio";
    assert_eq!(tracked.get(okio), staging.get(okio));
    assert_ne!(tracked.root(), staging.root());
}

#[test]
fn missing_subdir_is_an_empty_registry() {
    let (_temp, root) = temp_root();
    let registry = scan_registry(&root, Utf8Path::new(LIBS)).expect("scan");
    assert!(registry.is_empty());
}

#[test]
fn nested_descriptors_are_found() {
    let (_temp, root) = temp_root();
    write_descriptor(&root, "group/artifact", "pkg/nested", "1");
    write_descriptor(&root, "flat", "pkg/flat", "2");

    let registry = scan_registry(&root, Utf8Path::new(LIBS)).expect("scan");
    assert_eq!(registry.len(), 2);
    assert_eq!(
        registry.get("pkg/nested").map(|d| d.path.as_str()),
        Some("third_party/android_deps/libs/group/artifact")
    );
}

#[test]
fn malformed_descriptor_aborts_scan() {
    let (_temp, root) = temp_root();
    write_descriptor(&root, "good", "pkg/good", "1");
    let bad = root.join(LIBS).join("bad");
    fs::create_dir_all(&bad).expect("mkdir");
    fs::write(bad.join("cipd.yaml"), "package: pkg/bad\n").expect("write");

    let err = scan_registry(&root, Utf8Path::new(LIBS)).expect_err("malformed");
    match err {
        RegistryError::Descriptor(DescriptorError::Invalid { path, missing }) => {
            assert!(path.ends_with("bad/cipd.yaml"), "{path}");
            assert_eq!(missing, "package tag");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn duplicate_package_names_are_rejected() {
    let (_temp, root) = temp_root();
    write_descriptor(&root, "a", "pkg/same", "1");
    write_descriptor(&root, "b", "pkg/same", "2");

    let err = scan_registry(&root, Utf8Path::new(LIBS)).expect_err("duplicate");
    let msg = err.to_string();
    assert!(msg.contains("pkg/same"), "{msg}");
    assert!(msg.contains("libs/a/cipd.yaml"), "{msg}");
    assert!(msg.contains("libs/b/cipd.yaml"), "{msg}");
}

#[test]
fn root_with_glob_metacharacters_is_escaped() {
    let (_temp, base) = temp_root();
    let root = base.join("src[1]");
    write_descriptor(&root, "x", "pkg/x", "1");

    let registry = scan_registry(&root, Utf8Path::new(LIBS)).expect("scan");
    assert!(registry.contains("pkg/x"));
}
