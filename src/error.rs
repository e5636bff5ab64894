use std::path::PathBuf;

use thiserror::Error;

use crate::{EXIT_CONFIG_ERROR, EXIT_RUN_FAILED};

#[derive(Error, Debug)]
pub enum GitlabStatsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed timestamp '{value}': {reason}")]
    MalformedTimestamp { value: String, reason: String },

    /// A GitLab API request failed. `retryable` marks transient failures
    /// (timeouts, connection errors, HTTP 429 and 5xx).
    #[error("Upstream request failed for {url}: {message}")]
    Upstream {
        url: String,
        status: Option<u16>,
        message: String,
        retryable: bool,
    },

    #[error("Unexpected response body from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl GitlabStatsError {
    /// Short category name, shown in the failure log line of a run.
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::Config(_) | Self::TomlParse(_) | Self::YamlParse(_) => "Config",
            Self::FileRead { .. } => "FileRead",
            Self::MalformedTimestamp { .. } => "MalformedTimestamp",
            Self::Upstream { .. } | Self::Decode { .. } => "Upstream",
            Self::Io(_) | Self::Csv(_) => "IO",
        }
    }

    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Upstream { retryable: true, .. })
    }

    /// Process exit code for a run that ended with this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::FileRead { .. } | Self::TomlParse(_) | Self::YamlParse(_) => {
                EXIT_CONFIG_ERROR
            }
            _ => EXIT_RUN_FAILED,
        }
    }
}

pub type Result<T> = std::result::Result<T, GitlabStatsError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
