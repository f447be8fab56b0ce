//! Per-run staging directory.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use tempfile::TempDir;
use tracing::{debug, info};

/// Scratch tree the build interpreter populates.
///
/// A caller-supplied directory is created when missing and always left in
/// place. Without one, a temporary directory is created and removed when the
/// area is dropped, on success and on failure alike.
#[derive(Debug)]
pub struct StagingArea {
    path: Utf8PathBuf,
    temp: Option<TempDir>,
}

impl StagingArea {
    pub fn provision(dir: Option<&Utf8Path>) -> anyhow::Result<Self> {
        match dir {
            Some(dir) => {
                fs::create_dir_all(dir).with_context(|| format!("create staging dir {dir}"))?;
                info!(path = %dir, "using persistent staging dir");
                Ok(Self {
                    path: dir.to_path_buf(),
                    temp: None,
                })
            }
            None => {
                let temp = tempfile::Builder::new()
                    .prefix("depsync-")
                    .tempdir()
                    .context("create temporary staging dir")?;
                let path = Utf8PathBuf::from_path_buf(temp.path().to_path_buf())
                    .map_err(|p| anyhow::anyhow!("non-UTF-8 temp dir: {}", p.display()))?;
                debug!(path = %path, "created ephemeral staging dir");
                Ok(Self {
                    path,
                    temp: Some(temp),
                })
            }
        }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn is_ephemeral(&self) -> bool {
        self.temp.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ephemeral_dir_is_removed_on_drop() {
        let staging = StagingArea::provision(None).unwrap();
        let path = staging.path().to_path_buf();
        assert!(staging.is_ephemeral());
        assert!(path.is_dir());
        assert!(path.file_name().unwrap().starts_with("depsync-"));

        drop(staging);
        assert!(!path.exists());
    }

    #[test]
    fn supplied_dir_is_created_and_kept() {
        let temp = TempDir::new().unwrap();
        let dir = Utf8PathBuf::from_path_buf(temp.path().join("build")).unwrap();

        let staging = StagingArea::provision(Some(&dir)).unwrap();
        assert!(!staging.is_ephemeral());
        assert_eq!(staging.path(), dir.as_path());
        fs::write(dir.join("marker"), "x").unwrap();

        drop(staging);
        assert!(dir.join("marker").exists());
    }
}
