use crate::plan::PackageDiff;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    pub schema: String,
    pub tool: ToolInfo,
    pub run: RunInfo,
    pub repo_root: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staging_dir: Option<String>,

    #[serde(default)]
    pub diff: PackageDiff,

    #[serde(default)]
    pub rewrite: RewriteCounts,

    #[serde(default)]
    pub inspect: InspectCounts,

    /// Rendered upload commands, in package-name order.
    #[serde(default)]
    pub upload_commands: Vec<String>,

    /// Packages missing remotely whose commands were not printed because a
    /// dry run left no directory holding their built contents.
    #[serde(default)]
    pub uploads_withheld: Vec<String>,

    /// Whether the tracked tree was modified (false for dry runs).
    pub synced: bool,

    #[serde(default)]
    pub dry_run: bool,
}

impl SyncReport {
    pub fn new(tool: ToolInfo, repo_root: impl Into<String>) -> Self {
        Self {
            schema: crate::schema::DEPSYNC_REPORT_V1.to_string(),
            tool,
            run: RunInfo::start(),
            repo_root: repo_root.into(),
            staging_dir: None,
            diff: PackageDiff::default(),
            rewrite: RewriteCounts::default(),
            inspect: InspectCounts::default(),
            upload_commands: Vec::new(),
            uploads_withheld: Vec::new(),
            synced: false,
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunInfo {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

impl RunInfo {
    pub fn start() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    pub fn finish(&mut self) {
        self.ended_at = Some(Utc::now());
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteCounts {
    pub total: u64,
    pub rewritten: u64,
    pub excluded: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectCounts {
    pub infos_written: u64,
    pub licenses_merged: u64,
}
