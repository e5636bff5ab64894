use std::io::IsTerminal;

use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar over the projects of a run.
///
/// The bar is drawn only when enabled and stderr is a TTY; otherwise every
/// call is a no-op.
#[derive(Clone)]
pub struct ProjectProgress {
    progress_bar: ProgressBar,
}

impl ProjectProgress {
    /// Creates a progress bar for `total` projects.
    ///
    /// The progress bar outputs to stderr, next to the log lines.
    #[must_use]
    pub fn new(total: u64, enabled: bool) -> Self {
        let is_tty = std::io::stderr().is_terminal();
        Self::new_with_visibility(total, enabled && is_tty)
    }

    /// A bar that never draws.
    #[must_use]
    pub fn hidden() -> Self {
        Self::new_with_visibility(0, false)
    }

    fn new_with_visibility(total: u64, visible: bool) -> Self {
        let progress_bar = if visible {
            Self::create_visible_progress_bar(total)
        } else {
            ProgressBar::hidden()
        };
        Self { progress_bar }
    }

    fn create_visible_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} Projects [{bar:40.cyan/blue}] {pos}/{len} {wide_msg}")
            .map_or_else(|_| ProgressStyle::default_bar(), |s| s.progress_chars("█▓░"));
        pb.set_style(style);
        pb
    }

    /// Shows the project currently being processed.
    pub fn start_project(&self, path: &str) {
        self.progress_bar.set_message(path.to_string());
    }

    /// Marks one project as done (counted or skipped).
    pub fn inc(&self) {
        self.progress_bar.inc(1);
    }

    #[must_use]
    pub fn position(&self) -> u64 {
        self.progress_bar.position()
    }

    /// Finishes the progress bar and clears it from the terminal.
    pub fn finish(&self) {
        self.progress_bar.finish_and_clear();
    }
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
