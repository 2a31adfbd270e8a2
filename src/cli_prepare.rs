use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use iem_recommender::assets::AssetKeys;
use iem_recommender::catalog::{prepare, Preparation, RawCatalog};
use iem_recommender::recommend::formatter::format_price;
use iem_recommender::recommend::normalizer::FEATURE_NAMES;
use iem_recommender::recommend::{
    BudgetBracket, RecommendationEngine, SoundCharacter, UserQuery,
};

const DEFAULT_OUTPUT: &str = "models/prepared_catalog.json";
const SAMPLE_TOP_N: usize = 3;

/// Diagnostic queries run against the whole catalog after preparation.
const SAMPLE_QUERIES: [(&str, &str, SoundCharacter); 3] = [
    ("< 500k", "Pop", SoundCharacter::BassHeavy),
    ("1jt-2jt", "Jazz", SoundCharacter::Detailed),
    ("> 2jt", "Campuran", SoundCharacter::Balanced),
];

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

/// Prepares a raw IEM catalog for the recommendation server.
#[derive(Parser, Debug)]
struct CliArgs {
    /// Raw catalog: a CSV file with a header row, or a JSON array of product rows.
    #[clap(value_parser = parse_path)]
    pub raw_catalog: PathBuf,

    /// Where to write the prepared catalog.
    #[clap(short, long, value_parser = parse_path, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Validate and report without writing anything.
    #[clap(long)]
    pub check_only: bool,

    /// Run the diagnostic queries against the whole prepared catalog.
    #[clap(long)]
    pub sample_queries: bool,
}

fn print_report(preparation: &Preparation, raw_rows: usize) {
    let catalog = &preparation.catalog;

    println!("Rows read: {}", raw_rows);
    println!("Products kept: {}", catalog.len());
    if !preparation.problems.is_empty() {
        println!("Rows excluded: {}", preparation.problems.len());
        for problem in preparation.problems.iter() {
            println!("  - {}", problem);
        }
    }

    println!("Genre codebook:");
    for (code, genre) in catalog.genres.genres().iter().enumerate() {
        println!("  {} -> {}", genre, code);
    }

    println!("Normalization:");
    for (name, stats) in FEATURE_NAMES.iter().zip(catalog.normalization.dimensions.iter()) {
        println!("  {:<12} mean={:.4} std={:.4}", name, stats.mean, stats.std);
    }
}

fn run_sample_queries(preparation: &Preparation) {
    let engine = RecommendationEngine::new(preparation.catalog.clone(), Arc::new(AssetKeys));

    for (i, (budget, genre, character)) in SAMPLE_QUERIES.iter().enumerate() {
        let query = UserQuery {
            budget: BudgetBracket::parse(budget),
            genre: genre.to_string(),
            sound_character: *character,
            top_n: SAMPLE_TOP_N,
        };
        let encoding = engine.encode_genre(genre);
        let query_vector = engine
            .normalization()
            .normalize(&engine.query_features(&query, encoding));

        println!("\n--- Sample query {} ---", i + 1);
        println!(
            "Budget={}, Genre={}{}, Character={}",
            budget,
            genre,
            if encoding.is_fallback() { " (unknown)" } else { "" },
            character.label()
        );

        for (rank, neighbor) in preparation
            .index
            .search(&query_vector, SAMPLE_TOP_N)
            .iter()
            .enumerate()
        {
            let product = &engine.products()[neighbor.index];
            println!("{}. {} ({})", rank + 1, product.name, product.brand);
            println!(
                "   {} | {} | bass {} mid {} treble {} | distance {:.4}",
                format_price(product.price),
                product.tuning,
                product.bass,
                product.mid,
                product.treble,
                neighbor.distance
            );
        }
    }
}

fn main() -> Result<()> {
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

    info!("Reading raw catalog from {:?}...", cli_args.raw_catalog);
    let raw = RawCatalog::load(&cli_args.raw_catalog)
        .with_context(|| format!("Could not read raw catalog {:?}", cli_args.raw_catalog))?;
    let preparation = prepare(&raw).context("Catalog preparation failed")?;

    print_report(&preparation, raw.len());

    if cli_args.sample_queries {
        run_sample_queries(&preparation);
    }

    if cli_args.check_only {
        info!("Check only, nothing written");
        return Ok(());
    }

    preparation
        .catalog
        .save(&cli_args.output)
        .with_context(|| format!("Could not write prepared catalog to {:?}", cli_args.output))?;
    info!("Prepared catalog written to {:?}", cli_args.output);
    Ok(())
}
