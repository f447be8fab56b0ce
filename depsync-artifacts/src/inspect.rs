//! Metadata sidecars and embedded license harvesting for `.aar` files.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use depsync_core_runtime::{CommandRunner, run_bounded};
use depsync_types::CommandSpec;
use fs_err as fs;
use std::io::{Read, Write};
use std::sync::Arc;
use tracing::debug;

/// Zip entry appended to the package LICENSE when present.
pub const EMBEDDED_LICENSE_ENTRY: &str = "third_party_licenses.txt";
pub const LICENSE_FILE_NAME: &str = "LICENSE";

/// `<dir>/<basename(dir)>.info` for an archive living in `<dir>`.
pub fn info_path_for(aar: &Utf8Path) -> anyhow::Result<Utf8PathBuf> {
    let dir = aar
        .parent()
        .with_context(|| format!("archive {aar} has no parent directory"))?;
    let stem = dir
        .file_name()
        .with_context(|| format!("archive dir {dir} has no name"))?;
    Ok(dir.join(format!("{stem}.info")))
}

pub fn list_command(tool: &Utf8Path, aar: &Utf8Path, info: &Utf8Path) -> CommandSpec {
    CommandSpec::new(tool.as_str())
        .arg("list")
        .arg(aar.as_str())
        .arg("--output")
        .arg(info.as_str())
}

/// Generate the `.info` sidecar for every archive, all at once.
///
/// Returns the sidecar paths in input order.
pub async fn write_archive_infos(
    runner: Arc<dyn CommandRunner>,
    tool: &Utf8Path,
    aars: &[Utf8PathBuf],
) -> anyhow::Result<Vec<Utf8PathBuf>> {
    let mut specs = Vec::with_capacity(aars.len());
    for aar in aars {
        let info = info_path_for(aar)?;
        debug!(info = %info, "generating archive info");
        specs.push((info.clone(), list_command(tool, aar, &info)));
    }

    let limit = specs.len();
    run_bounded(specs, limit, move |(info, spec)| {
        runner
            .run_checked(&spec)
            .with_context(|| format!("generate {info}"))?;
        Ok(info)
    })
    .await
}

/// Append the embedded license of `aar`, if any, to the LICENSE next to it.
///
/// The LICENSE file is created when missing and never truncated, so running
/// this twice appends the text twice. Returns whether anything was appended.
pub fn harvest_license(aar: &Utf8Path) -> anyhow::Result<bool> {
    let file = fs::File::open(aar)?;
    let mut archive =
        zip::ZipArchive::new(file).with_context(|| format!("open {aar} as zip archive"))?;

    let mut text = Vec::new();
    match archive.by_name(EMBEDDED_LICENSE_ENTRY) {
        Ok(mut entry) => {
            entry
                .read_to_end(&mut text)
                .with_context(|| format!("read {EMBEDDED_LICENSE_ENTRY} from {aar}"))?;
        }
        Err(zip::result::ZipError::FileNotFound) => return Ok(false),
        Err(e) => return Err(e).with_context(|| format!("read {aar}")),
    }

    let dir = aar
        .parent()
        .with_context(|| format!("archive {aar} has no parent directory"))?;
    let license = dir.join(LICENSE_FILE_NAME);
    let mut out = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&license)?;
    out.write_all(&text)?;

    debug!(license = %license, bytes = text.len(), "appended embedded license");
    Ok(true)
}

/// Harvest every archive in order; returns how many licenses were appended.
pub fn harvest_licenses(aars: &[Utf8PathBuf]) -> anyhow::Result<usize> {
    let mut merged = 0;
    for aar in aars {
        if harvest_license(aar)? {
            merged += 1;
        }
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_sidecar_is_named_after_its_directory() {
        let info = info_path_for(Utf8Path::new("/s/libs/com_google_foo/foo-1.0.aar")).unwrap();
        assert_eq!(info, Utf8PathBuf::from("/s/libs/com_google_foo/com_google_foo.info"));
    }

    #[test]
    fn list_command_shape() {
        let spec = list_command(
            Utf8Path::new("/b/aar.py"),
            Utf8Path::new("/l/p/p.aar"),
            Utf8Path::new("/l/p/p.info"),
        );
        assert_eq!(spec.display(), "/b/aar.py list /l/p/p.aar --output /l/p/p.info");
    }
}
