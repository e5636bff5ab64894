pub mod aggregate;
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod hierarchy;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod select;
pub mod window;

pub use error::{GitlabStatsError, Result};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_RUN_FAILED: i32 = 1;
pub const EXIT_CONFIG_ERROR: i32 = 2;

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
