use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "gitlab-stats")]
#[command(author, version, about = "Collect per-project activity statistics from GitLab")]
#[command(long_about = "Walks every group of a configured GitLab instance and writes one CSV \
    row per project with commit, merge request, pipeline, tag and release counts for the \
    configured period.\n\n\
    Exit codes:\n  \
    0 - Run finished (or Quit was chosen)\n  \
    1 - Run failed (upstream, timestamp or output error)\n  \
    2 - Configuration error or no instance selectable")]
pub struct Cli {
    /// Instance name from the config file (prompted for when omitted)
    pub instance: Option<String>,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for the CSV report (overrides config)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Resume from this project id, appending to the existing report
    #[arg(long, value_name = "ID")]
    pub from_project_id: Option<u64>,

    /// Show a progress bar over the project list
    #[arg(long)]
    pub progress: bool,

    /// Increase output verbosity (-v, -vv for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
