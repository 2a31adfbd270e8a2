mod file_config;

pub use file_config::{FileConfig, ImageRelayConfig, RecommendConfig};

use crate::recommend::DEFAULT_TOP_N;
use crate::server::{RequestsLoggingLevel, ServerConfig};
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

pub const DEFAULT_MAX_TOP_N: usize = 20;
pub const DEFAULT_IMAGE_RELAY_TIMEOUT_SEC: u64 = 10;
pub const DEFAULT_IMAGE_RELAY_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub catalog_path: Option<PathBuf>,
    pub assets_dir: Option<PathBuf>,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub asset_cache_age_sec: usize,
    pub default_top_n: usize,
    pub max_top_n: usize,
    pub image_relay_timeout_sec: u64,
    pub image_relay_max_bytes: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            assets_dir: None,
            port: 5000,
            metrics_port: 9091,
            logging_level: RequestsLoggingLevel::default(),
            asset_cache_age_sec: 3600,
            default_top_n: DEFAULT_TOP_N,
            max_top_n: DEFAULT_MAX_TOP_N,
            image_relay_timeout_sec: DEFAULT_IMAGE_RELAY_TIMEOUT_SEC,
            image_relay_max_bytes: DEFAULT_IMAGE_RELAY_MAX_BYTES,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub catalog_path: PathBuf,
    pub assets_dir: Option<PathBuf>,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub asset_cache_age_sec: usize,
    pub default_top_n: usize,
    pub max_top_n: usize,
    pub image_relay_timeout_sec: u64,
    pub image_relay_max_bytes: u64,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let catalog_path = file
            .catalog_path
            .map(PathBuf::from)
            .or_else(|| cli.catalog_path.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("catalog_path must be specified on the command line or in config file")
            })?;

        if !catalog_path.exists() {
            bail!("Prepared catalog does not exist: {:?}", catalog_path);
        }
        if !catalog_path.is_file() {
            bail!("catalog_path is not a file: {:?}", catalog_path);
        }

        let assets_dir = file
            .assets_dir
            .map(PathBuf::from)
            .or_else(|| cli.assets_dir.clone());
        if let Some(dir) = assets_dir.as_ref() {
            if !dir.is_dir() {
                bail!("assets_dir is not a directory: {:?}", dir);
            }
        }

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);
        if port == metrics_port {
            bail!("port and metrics_port must differ (both {})", port);
        }

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let asset_cache_age_sec = file
            .asset_cache_age_sec
            .unwrap_or(cli.asset_cache_age_sec);

        let recommend = file.recommend.unwrap_or_default();
        let default_top_n = recommend.default_top_n.unwrap_or(cli.default_top_n);
        let max_top_n = recommend.max_top_n.unwrap_or(cli.max_top_n);
        if max_top_n == 0 {
            bail!("max_top_n must be at least 1");
        }
        if default_top_n == 0 || default_top_n > max_top_n {
            bail!(
                "default_top_n must be between 1 and max_top_n ({}), got {}",
                max_top_n,
                default_top_n
            );
        }

        let image_relay = file.image_relay.unwrap_or_default();
        let image_relay_timeout_sec = image_relay
            .timeout_sec
            .unwrap_or(cli.image_relay_timeout_sec);
        let image_relay_max_bytes = image_relay
            .max_bytes
            .unwrap_or(cli.image_relay_max_bytes);
        if image_relay_max_bytes == 0 {
            bail!("image_relay max_bytes must be at least 1");
        }

        Ok(Self {
            catalog_path,
            assets_dir,
            port,
            metrics_port,
            logging_level,
            asset_cache_age_sec,
            default_top_n,
            max_top_n,
            image_relay_timeout_sec,
            image_relay_max_bytes,
        })
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            port: self.port,
            assets_dir: self.assets_dir.clone(),
            asset_cache_age_sec: self.asset_cache_age_sec,
            default_top_n: self.default_top_n,
            max_top_n: self.max_top_n,
            image_relay_timeout_sec: self.image_relay_timeout_sec,
            image_relay_max_bytes: self.image_relay_max_bytes,
        }
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
