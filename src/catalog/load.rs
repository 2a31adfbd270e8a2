use super::PreparedCatalog;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Loads and validates the prepared catalog, logging a short summary.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<PreparedCatalog> {
    let path = path.as_ref();
    info!("Loading prepared catalog from {}...", path.display());

    let catalog = PreparedCatalog::load(path)
        .with_context(|| format!("Could not load prepared catalog at {}", path.display()))?;

    info!(
        "Catalog has:\n{} products\n{} genres ({})",
        catalog.len(),
        catalog.genres.len(),
        catalog.genres.genres().join(", ")
    );
    Ok(catalog)
}
