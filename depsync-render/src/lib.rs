//! Rendering helpers (plain text) for the end-of-run report.

use depsync_types::report::SyncReport;

pub const CUT_HERE: &str = "-------------------- cut here ------------------------";

pub fn render_package_list(names: &[String], label: &str) -> String {
    let mut out = format!("  {} {} packages:\n", names.len(), label);
    for name in names {
        out.push_str(&format!("    - {name}\n"));
    }
    out
}

/// Package lists (new, updated, deleted; each only when non-empty), then either
/// the upload block or the all-up-to-date line.
pub fn render_report(report: &SyncReport) -> String {
    let mut out = String::new();

    for (names, label) in [
        (&report.diff.new, "new"),
        (&report.diff.updated, "updated"),
        (&report.diff.deleted, "deleted"),
    ] {
        if !names.is_empty() {
            out.push_str(&render_package_list(names, label));
        }
    }

    if !report.uploads_withheld.is_empty() {
        out.push_str(&render_package_list(&report.uploads_withheld, "unuploaded"));
        out.push_str(
            "Upload commands withheld: the dry run kept no built packages. \
             Pass --build-dir to keep them.\n",
        );
    } else if report.upload_commands.is_empty() {
        out.push_str("Done. All packages were already up-to-date on CIPD\n");
    } else {
        out.push_str("Run the following to upload CIPD packages:\n");
        out.push_str(CUT_HERE);
        out.push('\n');
        for cmd in &report.upload_commands {
            out.push_str(cmd);
            out.push('\n');
        }
        out.push_str(CUT_HERE);
        out.push('\n');
    }

    if report.dry_run {
        out.push_str("Dry run: the tracked tree was left untouched.\n");
    }

    out
}
