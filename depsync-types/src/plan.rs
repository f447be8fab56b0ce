use crate::descriptor::Registry;
use serde::{Deserialize, Serialize};

/// Classification of every package name across two registries.
///
/// Each list is sorted lexicographically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDiff {
    #[serde(default)]
    pub new: Vec<String>,

    #[serde(default)]
    pub updated: Vec<String>,

    #[serde(default)]
    pub deleted: Vec<String>,

    #[serde(default)]
    pub unchanged: Vec<String>,
}

impl PackageDiff {
    /// True when nothing was added, updated or removed.
    pub fn is_noop(&self) -> bool {
        self.new.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }

    /// Number of distinct names the diff accounts for.
    pub fn total(&self) -> usize {
        self.new.len() + self.updated.len() + self.deleted.len() + self.unchanged.len()
    }
}

/// The single plan handed to the sync applier.
///
/// Computed once from two registries and never recomputed mid-apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncPlan {
    pub diff: PackageDiff,
    /// Registry of record (tracked tree).
    pub existing: Registry,
    /// Freshly generated registry (staging tree).
    pub build: Registry,
}
