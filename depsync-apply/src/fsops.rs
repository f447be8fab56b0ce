use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use tracing::debug;
use walkdir::WalkDir;

/// Copy a file or directory so that `dst` ends up an exact replica of `src`.
///
/// An existing directory at `dst` is removed first; parents are created.
pub fn copy_path(src: &Utf8Path, dst: &Utf8Path) -> anyhow::Result<()> {
    debug!(src = %src, dst = %dst, "copy");
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }

    if !src.is_dir() {
        fs::copy(src, dst)?;
        return Ok(());
    }

    delete_dir(dst)?;
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walk {src}"))?;
        let path = Utf8PathBuf::from_path_buf(entry.path().to_path_buf())
            .map_err(|p| anyhow::anyhow!("non-UTF-8 path: {}", p.display()))?;
        let rel = path
            .strip_prefix(src)
            .with_context(|| format!("{path} escaped {src}"))?;
        let target = dst.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(&path, &target)?;
        }
    }
    Ok(())
}

/// Recursively delete `dir` if present. Returns whether anything was removed.
pub fn delete_dir(dir: &Utf8Path) -> anyhow::Result<bool> {
    if !dir.exists() {
        return Ok(false);
    }
    debug!(path = %dir, "rmdir");
    fs::remove_dir_all(dir)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn root() -> (TempDir, Utf8PathBuf) {
        let temp = TempDir::new().unwrap();
        let path = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        (temp, path)
    }

    #[test]
    fn copy_dir_replaces_destination_exactly() {
        let (_t, r) = root();
        fs::create_dir_all(r.join("src/nested")).unwrap();
        fs::write(r.join("src/a.txt"), "a").unwrap();
        fs::write(r.join("src/nested/b.txt"), "b").unwrap();
        fs::create_dir_all(r.join("out/pkg")).unwrap();
        fs::write(r.join("out/pkg/stale.txt"), "old").unwrap();

        copy_path(&r.join("src"), &r.join("out/pkg")).unwrap();

        assert_eq!(fs::read_to_string(r.join("out/pkg/a.txt")).unwrap(), "a");
        assert_eq!(fs::read_to_string(r.join("out/pkg/nested/b.txt")).unwrap(), "b");
        assert!(!r.join("out/pkg/stale.txt").exists());
    }

    #[test]
    fn copy_file_creates_parents_and_overwrites() {
        let (_t, r) = root();
        fs::write(r.join("DEPS"), "new").unwrap();
        copy_path(&r.join("DEPS"), &r.join("tracked/DEPS")).unwrap();
        fs::write(r.join("DEPS"), "newer").unwrap();
        copy_path(&r.join("DEPS"), &r.join("tracked/DEPS")).unwrap();
        assert_eq!(fs::read_to_string(r.join("tracked/DEPS")).unwrap(), "newer");
    }

    #[test]
    fn delete_missing_dir_is_a_noop() {
        let (_t, r) = root();
        assert!(!delete_dir(&r.join("nope")).unwrap());
    }
}
