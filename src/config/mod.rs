mod loader;
mod model;
mod resolve;

pub use loader::{ConfigFormat, ConfigLoader, FileConfigLoader, FileSystem, RealFileSystem};
pub use model::{Config, InstanceConfig};
pub use resolve::{
    DEFAULT_MAX_RETRIES, DEFAULT_OUTPUT_DIR, DEFAULT_REQUEST_TIMEOUT_SECS, LineStatsExclusion,
    RunConfig, StatsPeriod, is_http_url,
};
