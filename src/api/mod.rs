//! GitLab REST access: typed records, lazily paginated listings and the
//! [`GitlabApi`] seam the statistics pipeline is written against.

mod client;
mod http;
pub mod model;

#[cfg(test)]
pub mod fake;

pub use client::{GitlabClient, Pages, RetryPolicy};
pub use http::{
    HttpClient, HttpResponse, NEXT_PAGE_HEADER, ReqwestClient, check_status, is_retryable_status,
    parse_next_page,
};
pub use model::{
    CommitDetail, CommitStats, CommitSummary, Group, MergeRequest, PipelineDetail,
    PipelineSummary, ProjectDetail, ProjectSummary, Release, Tag, TagCommit,
};

use crate::Result;

/// Finite, single-pass sequence of records fetched page by page.
pub type Records<'a, T> = Box<dyn Iterator<Item = Result<T>> + 'a>;

/// The upstream operations the statistics pipeline consumes.
pub trait GitlabApi {
    /// All groups visible to the token.
    fn groups(&self) -> Records<'_, Group>;

    /// Projects listed directly under a group.
    fn group_projects(&self, group_id: u64) -> Records<'_, ProjectSummary>;

    /// # Errors
    /// Returns an upstream error if the request fails.
    fn project(&self, project_id: u64) -> Result<ProjectDetail>;

    /// Commits created at or after `since` (RFC 3339).
    fn commits_since(&self, project_id: u64, since: &str) -> Records<'_, CommitSummary>;

    /// # Errors
    /// Returns an upstream error if the request fails.
    fn commit(&self, project_id: u64, sha: &str) -> Result<CommitDetail>;

    /// Merged merge requests, ordered by update time.
    fn merged_merge_requests(&self, project_id: u64) -> Records<'_, MergeRequest>;

    fn pipelines(&self, project_id: u64) -> Records<'_, PipelineSummary>;

    /// # Errors
    /// Returns an upstream error if the request fails.
    fn pipeline(&self, project_id: u64, pipeline_id: u64) -> Result<PipelineDetail>;

    fn tags(&self, project_id: u64) -> Records<'_, Tag>;

    fn releases(&self, project_id: u64) -> Records<'_, Release>;
}
