#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Creates an `assert_cmd` Command for the gitlab-stats binary.
///
/// `GITLAB_TOKEN` and `RUST_LOG` are cleared so the host environment cannot
/// leak into a test.
#[macro_export]
macro_rules! gitlab_stats {
    () => {{
        let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("gitlab-stats"));
        cmd.env_remove("GITLAB_TOKEN").env_remove("RUST_LOG");
        cmd
    }};
}

/// An instance that cannot be reached and is not retried.
pub const UNREACHABLE_INSTANCE: &str = "\
offline:
  url_root: http://127.0.0.1:1
  token: glpat-test
  stats_year: 2024
  max_retries: 0
  request_timeout_secs: 2
";

/// Creates a temporary directory with test fixtures for integration tests.
pub struct TestFixture {
    pub dir: TempDir,
}

impl TestFixture {
    /// Creates a new test fixture with an empty temp directory.
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Creates a file with the given content in the temp directory.
    pub fn create_file(&self, relative_path: &str, content: &str) {
        let path = self.dir.path().join(relative_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(&path, content).expect("Failed to write file");
    }

    /// Returns the path to the temp directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes `config.yaml` in the temp directory.
    pub fn create_config(&self, content: &str) {
        self.create_file("config.yaml", content);
    }

    /// Path of the default report for `instance` and `year`.
    pub fn report_path(&self, instance: &str, year: i32) -> PathBuf {
        self.path()
            .join("out")
            .join(format!("gitlab-stats-{instance}-{year}.csv"))
    }

    pub fn read(&self, path: &Path) -> String {
        fs::read_to_string(path).expect("Failed to read file")
    }

    /// A command running in the fixture directory with an isolated user config dir.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = gitlab_stats!();
        cmd.current_dir(self.path())
            .env("HOME", self.path())
            .env("XDG_CONFIG_HOME", self.path().join(".config"))
            .write_stdin("");
        cmd
    }
}
