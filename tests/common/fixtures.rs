//! Test fixture creation for the catalog and the assets directory

use super::constants::*;
use anyhow::Result;
use iem_recommender::catalog::{prepare, RawCatalog};
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Smallest valid PNG header, enough for content sniffing
pub const TEST_IMAGE_BYTES: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
];

#[allow(clippy::too_many_arguments)]
fn product(
    name: &str,
    brand: &str,
    price: u64,
    bass: u8,
    mid: u8,
    treble: u8,
    tuning: &str,
    genre: &str,
) -> Value {
    json!({
        "name": name,
        "brand": brand,
        "price": price,
        "bass": bass,
        "mid": mid,
        "treble": treble,
        "soundstage": 3,
        "tuning": tuning,
        "genre": genre,
        "driver_type": "Dynamic",
    })
}

/// Raw catalog rows: three products under 500k, one in 500k-1jt, two in
/// 1jt-2jt and none above 2jt.
pub fn raw_catalog_rows() -> Value {
    json!([
        product(BASSHEAD_POP_NAME, "KZ", 250_000, 5, 3, 3, "V-Shaped", "Pop"),
        product(BRIGHT_POP_NAME, "Tin HiFi", 400_000, 2, 3, 5, "Bright", "Pop"),
        product(NEUTRAL_ROCK_NAME, "Moondrop", 450_000, 3, 4, 3, "Neutral", "Rock"),
        product(MID_JAZZ_NAME, "Tangzu", 800_000, 3, 4, 3, "Balanced", "Jazz"),
        product(DETAIL_JAZZ_NAME, "Letshuoer", 1_500_000, 2, 3, 5, "Neutral-Bright", "Jazz"),
        product(UPPER_EDM_NAME, "Simgot", 1_900_000, 5, 3, 3, "V-Shaped", "EDM"),
    ])
}

/// Runs preparation on the fixture rows and writes the prepared catalog.
/// Returns (temp_dir, prepared_catalog_path)
pub fn create_test_catalog() -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let raw = RawCatalog::from_json_str(&raw_catalog_rows().to_string())?;
    let preparation = prepare(&raw)?;

    let path = dir.path().join("models").join("prepared_catalog.json");
    preparation.catalog.save(&path)?;

    Ok((dir, path))
}

/// Creates an assets directory holding one product image and one tuning diagram.
/// Returns (temp_dir, assets_root)
pub fn create_test_assets() -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let root = dir.path().to_path_buf();

    fs::create_dir_all(root.join("images/IEM"))?;
    fs::create_dir_all(root.join("images/Tuning"))?;
    fs::write(root.join("images/IEM/Bass_Cannon.png"), TEST_IMAGE_BYTES)?;
    fs::write(root.join("images/Tuning/V Shape.png"), TEST_IMAGE_BYTES)?;

    Ok((dir, root))
}
