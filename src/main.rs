use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use iem_recommender::assets::{AssetKeys, AssetResolver, LocalAssetResolver};
use iem_recommender::catalog::load_catalog;
use iem_recommender::config::{
    AppConfig, CliConfig, FileConfig, DEFAULT_IMAGE_RELAY_MAX_BYTES,
    DEFAULT_IMAGE_RELAY_TIMEOUT_SEC, DEFAULT_MAX_TOP_N,
};
use iem_recommender::recommend::{RecommendationEngine, DEFAULT_TOP_N};
use iem_recommender::server::{metrics, run_server, RequestsLoggingLevel};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the prepared catalog JSON written by cli-prepare.
    #[clap(value_parser = parse_path)]
    pub catalog_path: Option<PathBuf>,

    /// Optional TOML config file, its values override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory with product images and tuning diagrams, served under /static.
    #[clap(long, value_parser = parse_path)]
    pub assets_dir: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 5000)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// The maximum age of static assets in the cache in seconds.
    #[clap(long, default_value_t = 3600)]
    pub asset_cache_age_sec: usize,

    /// Recommendations returned when the request does not ask for a count.
    #[clap(long, default_value_t = DEFAULT_TOP_N)]
    pub default_top_n: usize,

    /// Largest number of recommendations a request may ask for.
    #[clap(long, default_value_t = DEFAULT_MAX_TOP_N)]
    pub max_top_n: usize,

    /// Timeout in seconds for upstream image fetches.
    #[clap(long, default_value_t = DEFAULT_IMAGE_RELAY_TIMEOUT_SEC)]
    pub image_relay_timeout_sec: u64,

    /// Largest upstream image, in bytes, the relay passes through.
    #[clap(long, default_value_t = DEFAULT_IMAGE_RELAY_MAX_BYTES)]
    pub image_relay_max_bytes: u64,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            catalog_path: self.catalog_path.clone(),
            assets_dir: self.assets_dir.clone(),
            port: self.port,
            metrics_port: self.metrics_port,
            logging_level: self.logging_level.clone(),
            asset_cache_age_sec: self.asset_cache_age_sec,
            default_top_n: self.default_top_n,
            max_top_n: self.max_top_n,
            image_relay_timeout_sec: self.image_relay_timeout_sec,
            image_relay_max_bytes: self.image_relay_max_bytes,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match cli_args.config.as_ref() {
        Some(path) => {
            info!("Reading config file {:?}...", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    let catalog = load_catalog(&config.catalog_path)?;

    let assets: Arc<dyn AssetResolver> = match config.assets_dir.as_ref() {
        Some(dir) => Arc::new(LocalAssetResolver::new(dir.clone())),
        None => Arc::new(AssetKeys),
    };
    let engine = Arc::new(RecommendationEngine::new(catalog, assets));

    info!("Initializing metrics...");
    metrics::init_metrics();
    metrics::init_catalog_metrics(engine.products().len(), engine.genres().len());

    info!("Ready to serve at port {}!", config.port);
    info!("Metrics available at port {}!", config.metrics_port);
    run_server(config.server_config(), engine, config.metrics_port).await
}
