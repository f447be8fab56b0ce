use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewriteOutcome {
    /// The transform reported there was nothing to rewrite.
    Unchanged,
    /// The archive was rewritten in place.
    Rewritten,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteJob {
    pub path: Utf8PathBuf,
    pub outcome: RewriteOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteSummary {
    #[serde(default)]
    pub jobs: Vec<RewriteJob>,

    /// Archives skipped by the exclusion denylist.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded: Vec<Utf8PathBuf>,
}

impl RewriteSummary {
    pub fn rewritten_count(&self) -> usize {
        self.jobs
            .iter()
            .filter(|j| j.outcome == RewriteOutcome::Rewritten)
            .count()
    }
}
