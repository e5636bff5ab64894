//! Typed GitLab REST records. Only the fields the statistics need are kept;
//! timestamps stay as strings so that parse failures surface from the window
//! filter as `MalformedTimestamp`.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Group {
    pub id: u64,
    pub full_path: String,
}

/// Entry of a group's project listing.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ProjectSummary {
    pub id: u64,
    pub name: String,
    pub path_with_namespace: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ProjectDetail {
    pub id: u64,
    pub path_with_namespace: String,
    #[serde(default)]
    pub repository_access_level: Option<String>,
}

impl ProjectDetail {
    #[must_use]
    pub fn repository_disabled(&self) -> bool {
        self.repository_access_level.as_deref() == Some("disabled")
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CommitSummary {
    pub id: String,
    pub short_id: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
pub struct CommitStats {
    pub additions: u64,
    pub deletions: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CommitDetail {
    pub id: String,
    pub stats: CommitStats,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct MergeRequest {
    pub iid: u64,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PipelineSummary {
    pub id: u64,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PipelineDetail {
    pub id: u64,
    /// Seconds; null while running or when the pipeline never started.
    #[serde(default)]
    pub duration: Option<f64>,
}

impl PipelineDetail {
    /// Whole seconds, with a missing duration counted as zero.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn duration_secs(&self) -> u64 {
        self.duration.map_or(0, |d| d.max(0.0) as u64)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TagCommit {
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub commit: TagCommit,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Release {
    pub tag_name: String,
    pub created_at: String,
}
