use super::RequestsLoggingLevel;
use crate::recommend::DEFAULT_TOP_N;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    /// Directory served under `/static`, if any.
    pub assets_dir: Option<PathBuf>,
    pub asset_cache_age_sec: usize,
    pub default_top_n: usize,
    pub max_top_n: usize,
    pub image_relay_timeout_sec: u64,
    /// Largest upstream body the image relay passes through.
    pub image_relay_max_bytes: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 5000,
            assets_dir: None,
            asset_cache_age_sec: 3600,
            default_top_n: DEFAULT_TOP_N,
            max_top_n: 20,
            image_relay_timeout_sec: 10,
            image_relay_max_bytes: 10 * 1024 * 1024,
        }
    }
}
