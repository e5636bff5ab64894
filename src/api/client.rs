use std::thread;
use std::time::Duration;

use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{GitlabStatsError, Result};

use super::http::{HttpClient, HttpResponse, ReqwestClient};
use super::model::{
    CommitDetail, CommitSummary, Group, MergeRequest, PipelineDetail, PipelineSummary,
    ProjectDetail, ProjectSummary, Release, Tag,
};
use super::{GitlabApi, Records};

const API_PREFIX: &str = "/api/v4";
const PER_PAGE: &str = "100";

/// Retry behaviour for transient upstream failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    /// Exponential backoff: `base_delay * 2^attempt`, attempt counted from 0.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt.min(16)))
    }
}

/// Blocking GitLab REST client over an injectable [`HttpClient`].
#[derive(Debug)]
pub struct GitlabClient<H: HttpClient = ReqwestClient> {
    http: H,
    api_root: String,
    retry: RetryPolicy,
}

impl GitlabClient<ReqwestClient> {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn connect(
        url_root: &str,
        token: &str,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self> {
        Ok(Self::with_http(
            ReqwestClient::new(token, timeout)?,
            url_root,
            retry,
        ))
    }
}

impl<H: HttpClient> GitlabClient<H> {
    #[must_use]
    pub fn with_http(http: H, url_root: &str, retry: RetryPolicy) -> Self {
        Self {
            http,
            api_root: format!("{}{API_PREFIX}", url_root.trim_end_matches('/')),
            retry,
        }
    }

    fn url(&self, path: &str, query: &[(String, String)]) -> Result<String> {
        let raw = format!("{}{path}", self.api_root);
        let url = if query.is_empty() {
            Url::parse(&raw)
        } else {
            Url::parse_with_params(&raw, query)
        };
        url.map(String::from)
            .map_err(|e| GitlabStatsError::Config(format!("Invalid API URL '{raw}': {e}")))
    }

    fn get_with_retry(&self, url: &str) -> Result<HttpResponse> {
        let mut attempt = 0;
        loop {
            debug!("GET {url}");
            match self.http.get(url) {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempt < self.retry.max_retries => {
                    let delay = self.retry.delay_for(attempt);
                    attempt += 1;
                    warn!(
                        "{e}; retrying in {}s (attempt {attempt} of {})",
                        delay.as_secs(),
                        self.retry.max_retries
                    );
                    thread::sleep(delay);
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn decode<T: DeserializeOwned>(url: &str, body: &str) -> Result<T> {
        serde_json::from_str(body).map_err(|source| GitlabStatsError::Decode {
            url: url.to_string(),
            source,
        })
    }

    fn get_one<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path, &[])?;
        let response = self.get_with_retry(&url)?;
        Self::decode(&url, &response.body)
    }

    fn fetch_page<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
        page: u32,
    ) -> Result<(Vec<T>, Option<u32>)> {
        let mut params = query.to_vec();
        params.push(("per_page".to_string(), PER_PAGE.to_string()));
        params.push(("page".to_string(), page.to_string()));
        let url = self.url(path, &params)?;
        let response = self.get_with_retry(&url)?;
        let items = Self::decode(&url, &response.body)?;
        Ok((items, response.next_page))
    }

    fn paginate<T: DeserializeOwned>(&self, path: String, query: &[(&str, &str)]) -> Pages<'_, T, H> {
        Pages {
            client: self,
            path,
            query: query
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            next_page: Some(1),
            buffer: Vec::new().into_iter(),
        }
    }
}

/// Lazy, single-pass iterator over every page of a listing endpoint.
/// Stops after the first error.
pub struct Pages<'a, T, H: HttpClient> {
    client: &'a GitlabClient<H>,
    path: String,
    query: Vec<(String, String)>,
    next_page: Option<u32>,
    buffer: std::vec::IntoIter<T>,
}

impl<T: DeserializeOwned, H: HttpClient> Iterator for Pages<'_, T, H> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffer.next() {
                return Some(Ok(item));
            }
            let page = self.next_page.take()?;
            match self.client.fetch_page(&self.path, &self.query, page) {
                Ok((items, next)) => {
                    self.buffer = items.into_iter();
                    self.next_page = next;
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

impl<H: HttpClient> GitlabApi for GitlabClient<H> {
    fn groups(&self) -> Records<'_, Group> {
        Box::new(self.paginate("/groups".to_string(), &[]))
    }

    fn group_projects(&self, group_id: u64) -> Records<'_, ProjectSummary> {
        Box::new(self.paginate(format!("/groups/{group_id}/projects"), &[]))
    }

    fn project(&self, project_id: u64) -> Result<ProjectDetail> {
        self.get_one(&format!("/projects/{project_id}"))
    }

    fn commits_since(&self, project_id: u64, since: &str) -> Records<'_, CommitSummary> {
        Box::new(self.paginate(
            format!("/projects/{project_id}/repository/commits"),
            &[("since", since)],
        ))
    }

    fn commit(&self, project_id: u64, sha: &str) -> Result<CommitDetail> {
        self.get_one(&format!("/projects/{project_id}/repository/commits/{sha}"))
    }

    fn merged_merge_requests(&self, project_id: u64) -> Records<'_, MergeRequest> {
        Box::new(self.paginate(
            format!("/projects/{project_id}/merge_requests"),
            &[("state", "merged"), ("order_by", "updated_at")],
        ))
    }

    fn pipelines(&self, project_id: u64) -> Records<'_, PipelineSummary> {
        Box::new(self.paginate(format!("/projects/{project_id}/pipelines"), &[]))
    }

    fn pipeline(&self, project_id: u64, pipeline_id: u64) -> Result<PipelineDetail> {
        self.get_one(&format!("/projects/{project_id}/pipelines/{pipeline_id}"))
    }

    fn tags(&self, project_id: u64) -> Records<'_, Tag> {
        Box::new(self.paginate(format!("/projects/{project_id}/repository/tags"), &[]))
    }

    fn releases(&self, project_id: u64) -> Records<'_, Release> {
        Box::new(self.paginate(format!("/projects/{project_id}/releases"), &[]))
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
