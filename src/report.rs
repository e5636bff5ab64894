//! CSV report output.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use crate::{GitlabStatsError, Result};
use crate::aggregate::ProjectStats;
use crate::config::RunConfig;
use crate::hierarchy::ProjectRef;

/// Column order of every report row.
pub const REPORT_COLUMNS: [&str; 14] = [
    "stats_from",
    "stats_to",
    "gl_instance",
    "project_id",
    "project_name",
    "project_path",
    "commits",
    "commits_additions",
    "commits_deletions",
    "mrs",
    "releases",
    "tags",
    "pipelines",
    "pipelines_duration",
];

/// Whether the report file is recreated or extended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Truncate and write the header.
    Truncate,
    /// Append rows after existing content, no header.
    Append,
}

/// One report row. Field order matches [`REPORT_COLUMNS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputRow {
    pub stats_from: String,
    pub stats_to: String,
    pub gl_instance: String,
    pub project_id: u64,
    pub project_name: String,
    pub project_path: String,
    pub commits: u64,
    pub commits_additions: u64,
    pub commits_deletions: u64,
    pub mrs: u64,
    pub releases: u64,
    pub tags: u64,
    pub pipelines: u64,
    pub pipelines_duration: u64,
}

impl OutputRow {
    #[must_use]
    pub fn new(config: &RunConfig, project: &ProjectRef, stats: &ProjectStats) -> Self {
        let (stats_from, stats_to) = config.window.report_dates();
        Self {
            stats_from,
            stats_to,
            gl_instance: config.instance.clone(),
            project_id: project.id,
            project_name: project.name.clone(),
            project_path: project.path_with_namespace.clone(),
            commits: stats.commits,
            commits_additions: stats.commits_additions,
            commits_deletions: stats.commits_deletions,
            mrs: stats.merged_mrs,
            releases: stats.releases,
            tags: stats.tags,
            pipelines: stats.pipelines,
            pipelines_duration: stats.pipelines_duration,
        }
    }
}

/// Row-at-a-time CSV writer; every row is flushed as soon as it is written.
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
    rows_written: usize,
}

impl ReportWriter<File> {
    /// Open `path` in the given mode, creating parent directories.
    ///
    /// # Errors
    /// Returns an error if the directory or file cannot be created, or the
    /// header cannot be written.
    pub fn create(path: &Path, mode: WriteMode) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = match mode {
            WriteMode::Truncate => File::create(path)?,
            WriteMode::Append => OpenOptions::new().create(true).append(true).open(path)?,
        };
        Self::from_writer(file, mode)
    }
}

impl<W: Write> ReportWriter<W> {
    /// # Errors
    /// Returns an error if the header cannot be written.
    pub fn from_writer(inner: W, mode: WriteMode) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(inner);
        if mode == WriteMode::Truncate {
            writer.write_record(REPORT_COLUMNS)?;
            writer.flush()?;
        }
        Ok(Self {
            writer,
            rows_written: 0,
        })
    }

    /// # Errors
    /// Returns an error if the row cannot be serialized or flushed.
    pub fn write_row(&mut self, row: &OutputRow) -> Result<()> {
        self.writer.serialize(row)?;
        self.writer.flush()?;
        self.rows_written += 1;
        Ok(())
    }

    #[must_use]
    pub const fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flush and return the underlying writer.
    ///
    /// # Errors
    /// Returns an error if the final flush fails.
    pub fn into_inner(self) -> Result<W> {
        self.writer.into_inner().map_err(|e| {
            let err = e.error();
            GitlabStatsError::Io(io::Error::new(err.kind(), err.to_string()))
        })
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
