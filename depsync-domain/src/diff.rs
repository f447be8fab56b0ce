use depsync_types::{PackageDiff, Registry, SyncPlan};
use tracing::debug;

/// Classify every name in `existing ∪ build`.
///
/// - new: only in `build`
/// - deleted: only in `existing`
/// - updated: in both with differing tags
/// - unchanged: in both with equal tags
///
/// Both registries iterate in name order, so every list comes out sorted.
pub fn diff_registries(existing: &Registry, build: &Registry) -> PackageDiff {
    let mut diff = PackageDiff::default();

    for descriptor in existing.descriptors() {
        match build.get(&descriptor.name) {
            None => diff.deleted.push(descriptor.name.clone()),
            Some(built) if built.tag != descriptor.tag => {
                diff.updated.push(descriptor.name.clone())
            }
            Some(_) => diff.unchanged.push(descriptor.name.clone()),
        }
    }

    diff.new = build
        .names()
        .filter(|name| !existing.contains(name))
        .map(str::to_string)
        .collect();

    debug!(
        new = diff.new.len(),
        updated = diff.updated.len(),
        deleted = diff.deleted.len(),
        unchanged = diff.unchanged.len(),
        "computed package diff"
    );
    diff
}

/// Compute the diff and freeze it together with the registries it came from.
pub fn plan_sync(existing: Registry, build: Registry) -> SyncPlan {
    let diff = diff_registries(&existing, &build);
    SyncPlan {
        diff,
        existing,
        build,
    }
}
