//! In-memory [`GitlabApi`] used by the pipeline tests.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use super::model::{
    CommitDetail, CommitStats, CommitSummary, Group, MergeRequest, PipelineDetail,
    PipelineSummary, ProjectDetail, ProjectSummary, Release, Tag, TagCommit,
};
use super::{GitlabApi, Records};
use crate::config::{InstanceConfig, RunConfig};
use crate::{GitlabStatsError, Result};

#[derive(Default)]
pub struct FakeGitlab {
    groups: Vec<Group>,
    group_projects: HashMap<u64, Vec<ProjectSummary>>,
    projects: HashMap<u64, ProjectDetail>,
    commits: HashMap<u64, Vec<CommitSummary>>,
    commit_stats: HashMap<(u64, String), CommitStats>,
    merge_requests: HashMap<u64, Vec<MergeRequest>>,
    pipelines: HashMap<u64, Vec<PipelineSummary>>,
    pipeline_durations: HashMap<(u64, u64), Option<f64>>,
    tags: HashMap<u64, Vec<Tag>>,
    releases: HashMap<u64, Vec<Release>>,
    failing_projects: HashSet<u64>,
    calls: RefCell<Vec<String>>,
}

fn records<T: Clone + 'static>(items: Option<&Vec<T>>) -> Records<'static, T> {
    Box::new(items.cloned().unwrap_or_default().into_iter().map(Ok))
}

impl FakeGitlab {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(mut self, id: u64, full_path: &str) -> Self {
        self.groups.push(Group {
            id,
            full_path: full_path.to_string(),
        });
        self
    }

    /// Lists `project_id` under `group_id` and registers an enabled project detail.
    pub fn with_group_project(mut self, group_id: u64, project_id: u64, path: &str) -> Self {
        let name = path.rsplit('/').next().unwrap_or(path).to_string();
        self.group_projects
            .entry(group_id)
            .or_default()
            .push(ProjectSummary {
                id: project_id,
                name,
                path_with_namespace: path.to_string(),
            });
        self.projects
            .entry(project_id)
            .or_insert_with(|| ProjectDetail {
                id: project_id,
                path_with_namespace: path.to_string(),
                repository_access_level: Some("enabled".to_string()),
            });
        self
    }

    pub fn with_repository_disabled(mut self, project_id: u64) -> Self {
        if let Some(detail) = self.projects.get_mut(&project_id) {
            detail.repository_access_level = Some("disabled".to_string());
        }
        self
    }

    pub fn with_commit(
        mut self,
        project_id: u64,
        sha: &str,
        created_at: &str,
        additions: u64,
        deletions: u64,
    ) -> Self {
        self.commits
            .entry(project_id)
            .or_default()
            .push(CommitSummary {
                id: sha.to_string(),
                short_id: sha.chars().take(8).collect(),
                created_at: created_at.to_string(),
            });
        self.commit_stats.insert(
            (project_id, sha.to_string()),
            CommitStats {
                additions,
                deletions,
            },
        );
        self
    }

    pub fn with_merge_request(mut self, project_id: u64, iid: u64, created_at: &str) -> Self {
        self.merge_requests
            .entry(project_id)
            .or_default()
            .push(MergeRequest {
                iid,
                created_at: created_at.to_string(),
            });
        self
    }

    pub fn with_pipeline(
        mut self,
        project_id: u64,
        pipeline_id: u64,
        created_at: &str,
        duration: Option<f64>,
    ) -> Self {
        self.pipelines
            .entry(project_id)
            .or_default()
            .push(PipelineSummary {
                id: pipeline_id,
                created_at: created_at.to_string(),
            });
        self.pipeline_durations
            .insert((project_id, pipeline_id), duration);
        self
    }

    pub fn with_tag(mut self, project_id: u64, name: &str, commit_created_at: &str) -> Self {
        self.tags.entry(project_id).or_default().push(Tag {
            name: name.to_string(),
            commit: TagCommit {
                created_at: commit_created_at.to_string(),
            },
        });
        self
    }

    pub fn with_release(mut self, project_id: u64, tag_name: &str, created_at: &str) -> Self {
        self.releases
            .entry(project_id)
            .or_default()
            .push(Release {
                tag_name: tag_name.to_string(),
                created_at: created_at.to_string(),
            });
        self
    }

    /// Makes the project detail fetch fail with a retryable upstream error.
    pub fn with_failing_project(mut self, project_id: u64) -> Self {
        self.failing_projects.insert(project_id);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn not_found(what: String) -> GitlabStatsError {
        GitlabStatsError::Upstream {
            url: what,
            status: Some(404),
            message: "HTTP 404".to_string(),
            retryable: false,
        }
    }
}

impl GitlabApi for FakeGitlab {
    fn groups(&self) -> Records<'_, Group> {
        self.record("groups".to_string());
        records(Some(&self.groups))
    }

    fn group_projects(&self, group_id: u64) -> Records<'_, ProjectSummary> {
        self.record(format!("group_projects:{group_id}"));
        records(self.group_projects.get(&group_id))
    }

    fn project(&self, project_id: u64) -> Result<ProjectDetail> {
        self.record(format!("project:{project_id}"));
        if self.failing_projects.contains(&project_id) {
            return Err(GitlabStatsError::Upstream {
                url: format!("/projects/{project_id}"),
                status: Some(503),
                message: "HTTP 503".to_string(),
                retryable: true,
            });
        }
        self.projects
            .get(&project_id)
            .cloned()
            .ok_or_else(|| Self::not_found(format!("/projects/{project_id}")))
    }

    fn commits_since(&self, project_id: u64, since: &str) -> Records<'_, CommitSummary> {
        self.record(format!("commits:{project_id}:{since}"));
        records(self.commits.get(&project_id))
    }

    fn commit(&self, project_id: u64, sha: &str) -> Result<CommitDetail> {
        self.record(format!("commit:{project_id}:{sha}"));
        self.commit_stats
            .get(&(project_id, sha.to_string()))
            .map(|stats| CommitDetail {
                id: sha.to_string(),
                stats: *stats,
            })
            .ok_or_else(|| Self::not_found(format!("/projects/{project_id}/commits/{sha}")))
    }

    fn merged_merge_requests(&self, project_id: u64) -> Records<'_, MergeRequest> {
        self.record(format!("merge_requests:{project_id}"));
        records(self.merge_requests.get(&project_id))
    }

    fn pipelines(&self, project_id: u64) -> Records<'_, PipelineSummary> {
        self.record(format!("pipelines:{project_id}"));
        records(self.pipelines.get(&project_id))
    }

    fn pipeline(&self, project_id: u64, pipeline_id: u64) -> Result<PipelineDetail> {
        self.record(format!("pipeline:{project_id}:{pipeline_id}"));
        self.pipeline_durations
            .get(&(project_id, pipeline_id))
            .map(|duration| PipelineDetail {
                id: pipeline_id,
                duration: *duration,
            })
            .ok_or_else(|| {
                Self::not_found(format!("/projects/{project_id}/pipelines/{pipeline_id}"))
            })
    }

    fn tags(&self, project_id: u64) -> Records<'_, Tag> {
        self.record(format!("tags:{project_id}"));
        records(self.tags.get(&project_id))
    }

    fn releases(&self, project_id: u64) -> Records<'_, Release> {
        self.record(format!("releases:{project_id}"));
        records(self.releases.get(&project_id))
    }
}

/// Year-2024 run config for `test`, adjusted by `customize`.
pub fn test_config(customize: impl FnOnce(&mut InstanceConfig)) -> RunConfig {
    let mut raw = InstanceConfig {
        url_root: Some("https://gitlab.example.com".to_string()),
        token: Some("glpat-test".to_string()),
        stats_year: Some(2024),
        ..InstanceConfig::default()
    };
    customize(&mut raw);
    RunConfig::resolve("test", &raw, None).expect("valid test config")
}
