use std::path::{Path, PathBuf};

use crate::error::{GitlabStatsError, Result};

use super::Config;

/// Trait for loading configuration from various sources.
pub trait ConfigLoader {
    /// Load configuration from the default locations.
    ///
    /// # Errors
    /// Returns an error if no config file is found or it cannot be parsed.
    fn load(&self) -> Result<Config>;

    /// Load configuration from a specific path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    fn load_from_path(&self, path: &Path) -> Result<Config>;
}

/// File names probed in the current directory and in the user config directory.
const CONFIG_FILE_NAMES: &[&str] = &["config.yaml", "config.yml", "config.toml"];

/// Syntax of a config file, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// YAML unless the extension is `.toml`.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Yaml,
        }
    }
}

/// Trait for filesystem operations (for testability).
pub trait FileSystem {
    /// Read file contents as a string.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read.
    fn read_to_string(&self, path: &Path) -> std::io::Result<String>;

    /// Check if a path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Get the current working directory.
    ///
    /// # Errors
    /// Returns an error if the current directory cannot be determined.
    fn current_dir(&self) -> std::io::Result<PathBuf>;

    /// Platform-specific configuration directory for gitlab-stats:
    /// - Linux: `~/.config/gitlab-stats`
    /// - macOS: `~/Library/Application Support/gitlab-stats`
    /// - Windows: `%APPDATA%\gitlab-stats`
    fn config_dir(&self) -> Option<PathBuf>;
}

/// Real filesystem implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn current_dir(&self) -> std::io::Result<PathBuf> {
        std::env::current_dir()
    }

    fn config_dir(&self) -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "gitlab-stats")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }
}

/// Loads configuration from the filesystem.
///
/// Search order:
/// 1. `config.yaml`, `config.yml`, `config.toml` in the current directory
/// 2. The same names in the user config directory
#[derive(Debug)]
pub struct FileConfigLoader<F: FileSystem = RealFileSystem> {
    fs: F,
}

impl Default for FileConfigLoader<RealFileSystem> {
    fn default() -> Self {
        Self::new()
    }
}

impl FileConfigLoader<RealFileSystem> {
    #[must_use]
    pub const fn new() -> Self {
        Self { fs: RealFileSystem }
    }
}

impl<F: FileSystem> FileConfigLoader<F> {
    #[must_use]
    pub const fn with_fs(fs: F) -> Self {
        Self { fs }
    }

    fn candidate_paths(&self) -> Vec<PathBuf> {
        let dirs = [self.fs.current_dir().ok(), self.fs.config_dir()];
        dirs.into_iter()
            .flatten()
            .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
            .collect()
    }

    /// Parse config text in the given syntax.
    ///
    /// # Errors
    /// Returns a parse error for invalid syntax, or a configuration error when
    /// the file defines no instances.
    pub fn parse_config(content: &str, format: ConfigFormat) -> Result<Config> {
        let config: Config = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Toml => toml::from_str(content)?,
        };
        if config.instances.is_empty() {
            return Err(GitlabStatsError::Config(
                "Config file defines no instances".to_string(),
            ));
        }
        Ok(config)
    }
}

impl<F: FileSystem> ConfigLoader for FileConfigLoader<F> {
    fn load(&self) -> Result<Config> {
        let candidates = self.candidate_paths();
        let found = candidates.iter().find(|path| self.fs.exists(path));
        match found {
            Some(path) => self.load_from_path(path),
            None => Err(GitlabStatsError::Config(format!(
                "No config file found. Looked for: {}",
                candidates
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }

    fn load_from_path(&self, path: &Path) -> Result<Config> {
        let content =
            self.fs
                .read_to_string(path)
                .map_err(|source| GitlabStatsError::FileRead {
                    path: path.to_path_buf(),
                    source,
                })?;
        Self::parse_config(&content, ConfigFormat::from_path(path))
    }
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
