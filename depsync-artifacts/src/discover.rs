use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use glob::{Pattern, glob};
use tracing::debug;

/// Archives found under one libs dir, each list sorted by path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveSet {
    pub aars: Vec<Utf8PathBuf>,
    pub jars: Vec<Utf8PathBuf>,
}

impl ArchiveSet {
    /// `.aar` files first, then `.jar` files.
    pub fn all(&self) -> Vec<Utf8PathBuf> {
        self.aars.iter().chain(&self.jars).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.aars.len() + self.jars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Recursively collect `*.aar` and `*.jar` files below `libs_dir`.
pub fn find_archives(libs_dir: &Utf8Path) -> anyhow::Result<ArchiveSet> {
    let set = ArchiveSet {
        aars: find_by_extension(libs_dir, "aar")?,
        jars: find_by_extension(libs_dir, "jar")?,
    };
    debug!(dir = %libs_dir, aars = set.aars.len(), jars = set.jars.len(), "found archives");
    Ok(set)
}

fn find_by_extension(dir: &Utf8Path, ext: &str) -> anyhow::Result<Vec<Utf8PathBuf>> {
    let pattern = format!("{}/**/*.{ext}", Pattern::escape(dir.as_str()));
    let mut found = Vec::new();
    for entry in glob(&pattern).with_context(|| format!("bad glob pattern {pattern}"))? {
        let path = entry.with_context(|| format!("scan {dir}"))?;
        let path = Utf8PathBuf::from_path_buf(path)
            .map_err(|p| anyhow::anyhow!("non-UTF-8 archive path: {}", p.display()))?;
        if path.is_file() {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}
