use crate::parse::{DescriptorError, read_descriptor};
use camino::{Utf8Path, Utf8PathBuf};
use depsync_types::{DESCRIPTOR_FILE_NAME, Registry};
use glob::{Pattern, glob};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    #[error("package {name} is declared twice: {first} and {second}")]
    Duplicate {
        name: String,
        first: Utf8PathBuf,
        second: Utf8PathBuf,
    },

    #[error("scan {pattern}: {message}")]
    Glob { pattern: String, message: String },

    #[error("non-UTF-8 path under registry root: {path}")]
    NonUtf8 { path: String },
}

/// Scan `root/subdir` recursively for descriptor files.
///
/// Package paths in the returned registry are relative to `root`, so trees
/// scanned from different physical locations compare by relative layout.
/// A missing `subdir` yields an empty registry.
pub fn scan_registry(root: &Utf8Path, subdir: &Utf8Path) -> Result<Registry, RegistryError> {
    let base = root.join(subdir);
    let pattern = format!("{}/**/{}", Pattern::escape(base.as_str()), DESCRIPTOR_FILE_NAME);

    debug!(pattern = %pattern, "scanning for package descriptors");

    let glob_err = |message: String| RegistryError::Glob {
        pattern: pattern.clone(),
        message,
    };

    let mut files = Vec::new();
    for entry in glob(&pattern).map_err(|e| glob_err(e.to_string()))? {
        let path = entry.map_err(|e| glob_err(e.to_string()))?;
        let path = Utf8PathBuf::from_path_buf(path).map_err(|p| RegistryError::NonUtf8 {
            path: p.to_string_lossy().to_string(),
        })?;
        files.push(path);
    }
    // Deterministic order matters: duplicate reports must name the same pair every run.
    files.sort();

    let mut registry = Registry::new(root);
    for file in files {
        let descriptor = read_descriptor(root, &file)?;
        if let Some(first) = registry.get(&descriptor.name) {
            return Err(RegistryError::Duplicate {
                name: descriptor.name.clone(),
                first: first.descriptor_file(),
                second: descriptor.descriptor_file(),
            });
        }
        debug!(name = %descriptor.name, tag = %descriptor.tag, path = %descriptor.path, "found package");
        registry.insert(descriptor);
    }

    debug!(root = %root, packages = registry.len(), "registry scanned");
    Ok(registry)
}
