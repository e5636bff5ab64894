//! One statistics run: enumerate, aggregate, write.

use std::io::Write;

use tracing::{error, info, warn};

use crate::Result;
use crate::aggregate::{Aggregator, ProjectOutcome, SkipReason};
use crate::api::{GitlabApi, GitlabClient};
use crate::config::{RunConfig, StatsPeriod};
use crate::hierarchy::enumerate_projects;
use crate::output::ProjectProgress;
use crate::report::{OutputRow, ReportWriter, WriteMode};

/// What a finished run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub projects_found: usize,
    pub rows_written: usize,
    pub skipped_before_cursor: usize,
    pub skipped_disabled: usize,
}

/// Run the statistics pipeline against `api`, writing rows to `report`.
///
/// Projects are processed in ascending id order. On failure the error is
/// returned after logging the project id to resume from; rows already
/// written stay in the report.
///
/// # Errors
/// Returns the first upstream, timestamp or output error.
pub fn run<A: GitlabApi, W: Write>(
    api: &A,
    config: &RunConfig,
    report: &mut ReportWriter<W>,
    progress_enabled: bool,
) -> Result<RunSummary> {
    let projects = enumerate_projects(api, config)?;
    if projects.is_empty() {
        warn!(
            "No projects found for instance {} (include_path '{}', exclude_path '{}')",
            config.instance, config.include_path, config.exclude_path
        );
    }
    let progress = ProjectProgress::new(projects.len() as u64, progress_enabled);
    let aggregator = Aggregator::new(api, config);

    let mut summary = RunSummary {
        projects_found: projects.len(),
        ..RunSummary::default()
    };

    for project in projects.iter() {
        progress.start_project(&project.path_with_namespace);
        let outcome = aggregator.aggregate(project).inspect_err(|e| {
            let done = progress.position();
            progress.finish();
            error!(
                "Stopped at project {} (id {}) after {done} of {} projects ({} error): {e}. \
                 Set from_project_id to {} to resume",
                project.path_with_namespace,
                project.id,
                summary.projects_found,
                e.error_type(),
                project.id
            );
        })?;

        match outcome {
            ProjectOutcome::Counted(stats) => {
                report.write_row(&OutputRow::new(config, project, &stats))?;
                summary.rows_written += 1;
            }
            ProjectOutcome::Skipped(SkipReason::BeforeResumeCursor { .. }) => {
                summary.skipped_before_cursor += 1;
            }
            ProjectOutcome::Skipped(SkipReason::RepositoryDisabled) => {
                summary.skipped_disabled += 1;
            }
        }
        progress.inc();
    }

    progress.finish();
    Ok(summary)
}

fn log_run_start(config: &RunConfig) {
    info!("Instance {}", config.instance);
    match &config.period {
        StatsPeriod::Year(year) => info!("Stats for year {year}"),
        StatsPeriod::Range { from, to } => info!("Stats for period from {from} to {to}"),
    }
    let path = config.output_path();
    match config.write_mode() {
        WriteMode::Append => info!(
            "Appending to {}, starting from project id {}",
            path.display(),
            config.resume_from_project_id
        ),
        WriteMode::Truncate => info!("Overwriting file {}", path.display()),
    }
}

/// Open the report for `config`, connect to GitLab and run the pipeline.
///
/// # Errors
/// Returns an error if the report cannot be opened, the client cannot be
/// built, or the run fails.
pub fn execute(config: &RunConfig, progress_enabled: bool) -> Result<RunSummary> {
    log_run_start(config);
    let mut report = ReportWriter::create(&config.output_path(), config.write_mode())?;
    let client = GitlabClient::connect(
        &config.url_root,
        &config.token,
        config.request_timeout,
        config.retry,
    )?;
    let summary = run(&client, config, &mut report, progress_enabled)?;
    info!(
        "Done: {} rows written, {} projects skipped (disabled repository), {} below resume cursor",
        summary.rows_written, summary.skipped_disabled, summary.skipped_before_cursor
    );
    Ok(summary)
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
