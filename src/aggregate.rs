//! Per-project statistics over the configured time window.

use tracing::info;

use crate::Result;
use crate::api::GitlabApi;
use crate::config::RunConfig;
use crate::hierarchy::ProjectRef;

/// Counters for one project. Only built once every counter is complete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectStats {
    pub project_id: u64,
    pub commits: u64,
    pub commits_additions: u64,
    pub commits_deletions: u64,
    pub merged_mrs: u64,
    pub pipelines: u64,
    pub pipelines_duration: u64,
    pub tags: u64,
    pub releases: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Project id is below the resume cursor; nothing was fetched.
    BeforeResumeCursor { cursor: u64 },
    /// Repository access level is `disabled`.
    RepositoryDisabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectOutcome {
    Counted(ProjectStats),
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct CommitTotals {
    commits: u64,
    additions: u64,
    deletions: u64,
}

/// Computes [`ProjectStats`] for projects one at a time.
pub struct Aggregator<'a, A: GitlabApi> {
    api: &'a A,
    config: &'a RunConfig,
}

impl<'a, A: GitlabApi> Aggregator<'a, A> {
    #[must_use]
    pub const fn new(api: &'a A, config: &'a RunConfig) -> Self {
        Self { api, config }
    }

    /// Collect all counters for `project`, or report why it is skipped.
    ///
    /// # Errors
    /// Upstream failures and malformed timestamps abort the project; no
    /// partial stats are returned.
    pub fn aggregate(&self, project: &ProjectRef) -> Result<ProjectOutcome> {
        let cursor = self.config.resume_from_project_id;
        if cursor > 0 && project.id < cursor {
            info!(
                "Skipping project {} id {} because threshold is set to {cursor}",
                project.path_with_namespace, project.id
            );
            return Ok(ProjectOutcome::Skipped(SkipReason::BeforeResumeCursor {
                cursor,
            }));
        }

        info!(
            "Getting details of project {} (id {})",
            project.path_with_namespace, project.id
        );
        let detail = self.api.project(project.id)?;
        if detail.repository_disabled() {
            info!(
                "Repository access level of {} is 'disabled', skipping",
                project.path_with_namespace
            );
            return Ok(ProjectOutcome::Skipped(SkipReason::RepositoryDisabled));
        }

        let commits = self.count_commits(project)?;
        let merged_mrs = self.count_merged_mrs(project.id)?;
        let (pipelines, pipelines_duration) = self.count_pipelines(project.id)?;
        let tags = self.count_tags(project.id)?;
        let releases = self.count_releases(project.id)?;

        Ok(ProjectOutcome::Counted(ProjectStats {
            project_id: project.id,
            commits: commits.commits,
            commits_additions: commits.additions,
            commits_deletions: commits.deletions,
            merged_mrs,
            pipelines,
            pipelines_duration,
            tags,
            releases,
        }))
    }

    /// The `since` filter only bounds the lower edge server-side, so every
    /// commit is checked against the full window again.
    fn count_commits(&self, project: &ProjectRef) -> Result<CommitTotals> {
        let window = &self.config.window;
        let exclusion = self
            .config
            .line_stats_exclusion(&project.path_with_namespace, project.group_path());
        if let Some(reason) = &exclusion {
            info!(
                "Skipping commit stats extraction for project {} because {reason}",
                project.path_with_namespace
            );
        }

        let mut totals = CommitTotals::default();
        for commit in self.api.commits_since(project.id, &window.since_param()) {
            let commit = commit?;
            if !window.contains(&commit.created_at)? {
                continue;
            }
            totals.commits += 1;
            if exclusion.is_some() {
                continue;
            }
            let detail = self.api.commit(project.id, &commit.id)?;
            totals.additions += detail.stats.additions;
            totals.deletions += detail.stats.deletions;
        }
        Ok(totals)
    }

    /// Merged MRs are windowed by creation time, not merge time.
    fn count_merged_mrs(&self, project_id: u64) -> Result<u64> {
        let mut count = 0;
        for mr in self.api.merged_merge_requests(project_id) {
            if self.config.window.contains(&mr?.created_at)? {
                count += 1;
            }
        }
        Ok(count)
    }

    fn count_pipelines(&self, project_id: u64) -> Result<(u64, u64)> {
        let (mut count, mut duration) = (0, 0);
        for pipeline in self.api.pipelines(project_id) {
            let pipeline = pipeline?;
            if self.config.window.contains(&pipeline.created_at)? {
                count += 1;
                duration += self.api.pipeline(project_id, pipeline.id)?.duration_secs();
            }
        }
        Ok((count, duration))
    }

    fn count_tags(&self, project_id: u64) -> Result<u64> {
        let mut count = 0;
        for tag in self.api.tags(project_id) {
            if self.config.window.contains(&tag?.commit.created_at)? {
                count += 1;
            }
        }
        Ok(count)
    }

    fn count_releases(&self, project_id: u64) -> Result<u64> {
        let mut count = 0;
        for release in self.api.releases(project_id) {
            if self.config.window.contains(&release?.created_at)? {
                count += 1;
            }
        }
        Ok(count)
    }
}

#[cfg(test)]
#[path = "aggregate_tests.rs"]
mod tests;
