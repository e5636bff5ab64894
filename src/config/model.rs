use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{GitlabStatsError, Result};

/// Contents of a config file: instance name to instance settings, in file order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Config {
    pub instances: IndexMap<String, InstanceConfig>,
}

impl Config {
    /// Instance names in the order they appear in the file.
    #[must_use]
    pub fn instance_names(&self) -> Vec<String> {
        self.instances.keys().cloned().collect()
    }

    /// Look up an instance by name.
    ///
    /// # Errors
    /// Returns a configuration error listing the known instances.
    pub fn instance(&self, name: &str) -> Result<&InstanceConfig> {
        self.instances.get(name).ok_or_else(|| {
            GitlabStatsError::Config(format!(
                "Unknown instance '{name}'. Available instances: {}",
                self.instance_names().join(", ")
            ))
        })
    }
}

/// Settings for one GitLab instance.
///
/// Every field is optional at the serde level so that YAML entries written as
/// `include_path:` (null) are accepted; [`crate::config::RunConfig::resolve`]
/// applies defaults and reports what is genuinely missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstanceConfig {
    /// Base URL, e.g. `https://gitlab.example.com`.
    #[serde(default)]
    pub url_root: Option<String>,

    /// Personal access token. Falls back to `GITLAB_TOKEN`.
    #[serde(default)]
    pub token: Option<String>,

    /// Keep only groups whose full path contains this substring.
    #[serde(default)]
    pub include_path: Option<String>,

    /// Drop groups whose full path contains this substring.
    #[serde(default)]
    pub exclude_path: Option<String>,

    /// Group full paths whose commits are counted without line stats.
    #[serde(default)]
    pub commit_stats_exclude_groups: Option<Vec<String>>,

    /// Project full paths whose commits are counted without line stats.
    #[serde(default)]
    pub commit_stats_exclude_projects: Option<Vec<String>>,

    /// Calendar year mode. Values <= 0 fall back to `stats_from`/`stats_to`.
    #[serde(default)]
    pub stats_year: Option<i32>,

    #[serde(default)]
    pub stats_from: Option<String>,

    #[serde(default)]
    pub stats_to: Option<String>,

    /// Resume cursor: lowest project id to process.
    #[serde(default)]
    pub from_project_id: Option<u64>,

    /// Directory for the CSV report (default `out`).
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Per-request timeout (default 30).
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Retries for transient API failures (default 3).
    #[serde(default)]
    pub max_retries: Option<u32>,
}
