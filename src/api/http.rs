use std::time::Duration;

use crate::error::{GitlabStatsError, Result};

/// Header carrying the next page number on paginated GitLab responses.
pub const NEXT_PAGE_HEADER: &str = "x-next-page";
const TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// Successful response body plus pagination info.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub body: String,
    pub next_page: Option<u32>,
}

/// HTTP client abstraction for dependency injection.
pub trait HttpClient {
    /// Perform a GET request.
    ///
    /// # Errors
    /// Returns [`GitlabStatsError::Upstream`] for transport failures and
    /// non-2xx statuses, with `retryable` set for transient ones.
    fn get(&self, url: &str) -> Result<HttpResponse>;
}

/// Production HTTP client using reqwest.
///
/// This implementation cannot be unit tested without a real HTTP server,
/// so it is excluded from coverage measurement.
#[derive(Debug)]
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
    token: String,
}

impl ReqwestClient {
    /// # Errors
    /// Returns an error if the underlying client cannot be built.
    pub fn new(token: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("gitlab-stats/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GitlabStatsError::Config(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            token: token.to_string(),
        })
    }
}

#[cfg(not(tarpaulin_include))]
impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> Result<HttpResponse> {
        let response = self
            .client
            .get(url)
            .header(TOKEN_HEADER, self.token.as_str())
            .send()
            .map_err(|e| transport_error(url, &e))?;

        let status = response.status().as_u16();
        let next_page = parse_next_page(
            response
                .headers()
                .get(NEXT_PAGE_HEADER)
                .and_then(|v| v.to_str().ok()),
        );
        let body = response.text().map_err(|e| transport_error(url, &e))?;
        check_status(url, status, &body)?;

        Ok(HttpResponse { body, next_page })
    }
}

fn transport_error(url: &str, e: &reqwest::Error) -> GitlabStatsError {
    let message = if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        format!("connection failed: {e}")
    } else {
        e.to_string()
    };
    GitlabStatsError::Upstream {
        url: url.to_string(),
        status: e.status().map(|s| s.as_u16()),
        message,
        retryable: e.is_timeout() || e.is_connect() || e.is_request(),
    }
}

/// Rate limiting and server errors are worth retrying; other client errors
/// (bad token, missing project) are not.
#[must_use]
pub const fn is_retryable_status(status: u16) -> bool {
    status == 429 || status >= 500
}

/// Map a non-2xx status to an upstream error.
///
/// # Errors
/// Returns [`GitlabStatsError::Upstream`] unless `status` is 2xx.
pub fn check_status(url: &str, status: u16, body: &str) -> Result<()> {
    if (200..300).contains(&status) {
        return Ok(());
    }
    let detail = body.trim();
    let message = if detail.is_empty() {
        format!("HTTP {status}")
    } else {
        format!("HTTP {status}: {}", truncate(detail, 200))
    };
    Err(GitlabStatsError::Upstream {
        url: url.to_string(),
        status: Some(status),
        message,
        retryable: is_retryable_status(status),
    })
}

fn truncate(s: &str, max_chars: usize) -> &str {
    s.char_indices().nth(max_chars).map_or(s, |(idx, _)| &s[..idx])
}

/// Parse the `X-Next-Page` header; GitLab sends an empty value on the last page.
#[must_use]
pub fn parse_next_page(value: Option<&str>) -> Option<u32> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse().ok())
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
