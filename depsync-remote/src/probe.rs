use crate::RemoteStore;
use camino::{Utf8Path, Utf8PathBuf};
use depsync_core_runtime::run_bounded;
use depsync_types::{PackageDescriptor, UploadCandidate, UploadCommand};
use std::sync::Arc;
use tracing::{debug, info};

/// Concurrent describe calls in flight against the remote store.
pub const DEFAULT_PROBE_CONCURRENCY: usize = 80;

/// Ask the store about every descriptor; candidates come back in name order.
///
/// Fails fast on the first probe that cannot be performed at all.
pub async fn probe_all(
    store: Arc<dyn RemoteStore>,
    mut descriptors: Vec<PackageDescriptor>,
    concurrency: usize,
) -> anyhow::Result<Vec<UploadCandidate>> {
    descriptors.sort_by(|a, b| a.name.cmp(&b.name));
    let total = descriptors.len();

    let candidates = run_bounded(descriptors, concurrency, move |descriptor| {
        let exists_remotely = store.exists(&descriptor)?;
        Ok(UploadCandidate {
            descriptor,
            exists_remotely,
        })
    })
    .await?;

    let missing = candidates.iter().filter(|c| !c.exists_remotely).count();
    info!(probed = total, missing, "remote store probed");
    Ok(candidates)
}

/// One creation command per candidate the store does not have yet.
///
/// Package dirs live under `package_root`, which must hold the built
/// contents, and are shown relative to `display_base` when they are below
/// it, absolute otherwise.
pub fn upload_commands(
    store: &dyn RemoteStore,
    candidates: &[UploadCandidate],
    package_root: &Utf8Path,
    display_base: &Utf8Path,
) -> Vec<UploadCommand> {
    candidates
        .iter()
        .filter(|c| !c.exists_remotely)
        .map(|c| {
            let dir = display_dir(package_root.join(&c.descriptor.path), display_base);
            debug!(package = %c.descriptor.name, dir = %dir, "needs upload");
            store.creation_command(&dir, &c.descriptor)
        })
        .collect()
}

fn display_dir(dir: Utf8PathBuf, base: &Utf8Path) -> Utf8PathBuf {
    match dir.strip_prefix(base) {
        Ok(rel) if rel.as_str().is_empty() => Utf8PathBuf::from("."),
        Ok(rel) => rel.to_path_buf(),
        Err(_) => dir,
    }
}
