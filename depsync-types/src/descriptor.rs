use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// File name of the per-package descriptor written by the build interpreter.
pub const DESCRIPTOR_FILE_NAME: &str = "cipd.yaml";

/// One package as described by its `cipd.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDescriptor {
    /// Package directory (the one holding the descriptor), relative to the
    /// registry root.
    pub path: Utf8PathBuf,
    pub name: String,
    pub tag: String,
}

impl PackageDescriptor {
    pub fn new(
        path: impl Into<Utf8PathBuf>,
        name: impl Into<String>,
        tag: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            tag: tag.into(),
        }
    }

    /// Descriptor file location, relative to the registry root.
    pub fn descriptor_file(&self) -> Utf8PathBuf {
        self.path.join(DESCRIPTOR_FILE_NAME)
    }
}

/// Point-in-time mapping of package name to descriptor for one tree.
///
/// Keyed by name in a `BTreeMap`, so iteration is always lexicographic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    root: Utf8PathBuf,
    packages: BTreeMap<String, PackageDescriptor>,
}

impl Registry {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            root: root.into(),
            packages: BTreeMap::new(),
        }
    }

    /// Build a registry from descriptors. Later duplicates replace earlier ones;
    /// scanners that must reject duplicates use [`Registry::insert`] instead.
    pub fn from_descriptors(
        root: impl Into<Utf8PathBuf>,
        descriptors: impl IntoIterator<Item = PackageDescriptor>,
    ) -> Self {
        let mut registry = Self::new(root);
        for d in descriptors {
            registry.insert(d);
        }
        registry
    }

    /// Insert a descriptor while the registry is being assembled.
    ///
    /// Returns the descriptor previously registered under the same name.
    pub fn insert(&mut self, descriptor: PackageDescriptor) -> Option<PackageDescriptor> {
        self.packages.insert(descriptor.name.clone(), descriptor)
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn get(&self, name: &str) -> Option<&PackageDescriptor> {
        self.packages.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &PackageDescriptor> {
        self.packages.values()
    }

    /// Absolute location of a package directory under this registry's root.
    pub fn package_dir(&self, descriptor: &PackageDescriptor) -> Utf8PathBuf {
        self.root.join(&descriptor.path)
    }
}
