use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};

use crate::api::RetryPolicy;
use crate::report::WriteMode;
use crate::window::{TimeWindow, parse_timestamp};
use crate::{GitlabStatsError, Result};

use super::InstanceConfig;

pub const DEFAULT_OUTPUT_DIR: &str = "out";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
const RETRY_BASE_DELAY: Duration = Duration::from_secs(2);

/// How the statistics window was configured. Drives the output file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsPeriod {
    Year(i32),
    Range { from: String, to: String },
}

/// Fully resolved settings for one run. Built once, then only read.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub instance: String,
    pub url_root: String,
    pub token: String,
    pub include_path: String,
    pub exclude_path: String,
    pub commit_stats_exclude_groups: BTreeSet<String>,
    pub commit_stats_exclude_projects: BTreeSet<String>,
    pub period: StatsPeriod,
    pub window: TimeWindow,
    pub resume_from_project_id: u64,
    pub output_dir: PathBuf,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

/// Check if a string is an http(s) URL.
#[must_use]
pub fn is_http_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Parse a configured bound. A bare `YYYY-MM-DD` means the start of that day
/// (for `from`) or its last second (for `to`), in UTC.
fn parse_bound(field: &str, value: &str, end_of_day: bool) -> Result<DateTime<FixedOffset>> {
    if let Ok(date) = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
        let time = if end_of_day {
            NaiveTime::from_hms_opt(23, 59, 59)
        } else {
            NaiveTime::from_hms_opt(0, 0, 0)
        };
        if let Some(time) = time {
            return Ok(date.and_time(time).and_utc().fixed_offset());
        }
    }
    parse_timestamp(value).map_err(|e| GitlabStatsError::Config(format!("Invalid {field}: {e}")))
}

fn year_window(year: i32) -> Result<TimeWindow> {
    let from = parse_timestamp(&format!("{year:04}-01-01T00:00:00Z"))
        .map_err(|e| GitlabStatsError::Config(format!("Invalid stats_year {year}: {e}")))?;
    let to = parse_timestamp(&format!("{year:04}-12-31T23:59:59Z"))
        .map_err(|e| GitlabStatsError::Config(format!("Invalid stats_year {year}: {e}")))?;
    TimeWindow::new(from, to)
}

fn required<'a>(instance: &str, field: &str, value: Option<&'a String>) -> Result<&'a str> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            GitlabStatsError::Config(format!("Instance '{instance}' is missing '{field}'"))
        })
}

impl RunConfig {
    /// Resolve raw instance settings into a run configuration.
    ///
    /// `env_token` is used when the instance has no `token` of its own.
    ///
    /// # Errors
    /// Returns a configuration error for a missing URL or token, an invalid or
    /// inverted date range, or a missing period.
    pub fn resolve(instance: &str, raw: &InstanceConfig, env_token: Option<String>) -> Result<Self> {
        let url_root = required(instance, "url_root", raw.url_root.as_ref())?;
        if !is_http_url(url_root) {
            return Err(GitlabStatsError::Config(format!(
                "Instance '{instance}': url_root must start with http:// or https://, got '{url_root}'"
            )));
        }

        let token = raw
            .token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .or(env_token)
            .ok_or_else(|| {
                GitlabStatsError::Config(format!(
                    "Instance '{instance}' has no token and GITLAB_TOKEN is not set"
                ))
            })?;

        let (period, window) = match raw.stats_year {
            Some(year) if year > 0 => (StatsPeriod::Year(year), year_window(year)?),
            _ => {
                let from = required(instance, "stats_from", raw.stats_from.as_ref())?;
                let to = required(instance, "stats_to", raw.stats_to.as_ref())?;
                let window = TimeWindow::new(
                    parse_bound("stats_from", from, false)?,
                    parse_bound("stats_to", to, true)?,
                )?;
                let period = StatsPeriod::Range {
                    from: from.to_string(),
                    to: to.to_string(),
                };
                (period, window)
            }
        };

        Ok(Self {
            instance: instance.to_string(),
            url_root: url_root.trim_end_matches('/').to_string(),
            token,
            include_path: raw.include_path.clone().unwrap_or_default(),
            exclude_path: raw.exclude_path.clone().unwrap_or_default(),
            commit_stats_exclude_groups: raw
                .commit_stats_exclude_groups
                .iter()
                .flatten()
                .cloned()
                .collect(),
            commit_stats_exclude_projects: raw
                .commit_stats_exclude_projects
                .iter()
                .flatten()
                .cloned()
                .collect(),
            period,
            window,
            resume_from_project_id: raw.from_project_id.unwrap_or(0),
            output_dir: raw
                .output_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            request_timeout: Duration::from_secs(
                raw.request_timeout_secs
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
            retry: RetryPolicy {
                max_retries: raw.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
                base_delay: RETRY_BASE_DELAY,
            },
        })
    }

    #[must_use]
    pub const fn is_resume(&self) -> bool {
        self.resume_from_project_id > 0
    }

    #[must_use]
    pub const fn write_mode(&self) -> WriteMode {
        if self.is_resume() {
            WriteMode::Append
        } else {
            WriteMode::Truncate
        }
    }

    /// `gitlab-stats-<instance>-<year>.csv` or
    /// `gitlab-stats-<instance>-from-<from>-to-<to>.csv`.
    #[must_use]
    pub fn output_file_name(&self) -> String {
        match &self.period {
            StatsPeriod::Year(year) => format!("gitlab-stats-{}-{year}.csv", self.instance),
            StatsPeriod::Range { from, to } => {
                format!("gitlab-stats-{}-from-{from}-to-{to}.csv", self.instance)
            }
        }
    }

    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(self.output_file_name())
    }

    /// Whether line stats are fetched for commits of this project, and if not,
    /// which exclusion list says so.
    #[must_use]
    pub fn line_stats_exclusion(
        &self,
        project_path: &str,
        group_path: &str,
    ) -> Option<LineStatsExclusion> {
        if self.commit_stats_exclude_groups.contains(group_path) {
            Some(LineStatsExclusion::Group(group_path.to_string()))
        } else if self.commit_stats_exclude_projects.contains(project_path) {
            Some(LineStatsExclusion::Project(project_path.to_string()))
        } else {
            None
        }
    }
}

/// Reason commits of a project are counted without fetching line stats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineStatsExclusion {
    Group(String),
    Project(String),
}

impl std::fmt::Display for LineStatsExclusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Group(path) => write!(f, "group {path} is on the commit stats exclusion list"),
            Self::Project(path) => {
                write!(f, "project {path} is on the commit stats exclusion list")
            }
        }
    }
}

#[cfg(test)]
#[path = "resolve_tests.rs"]
mod tests;
