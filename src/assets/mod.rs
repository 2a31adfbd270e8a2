//! Resolution of product images and tuning diagrams to displayable references.

use crate::catalog::{Product, Tuning};
use std::path::PathBuf;

pub const PRODUCT_IMAGES_DIR: &str = "images/IEM";
pub const TUNING_DIAGRAMS_DIR: &str = "images/Tuning";
const PLACEHOLDER_BASE_URL: &str = "https://via.placeholder.com/300x200/667eea/ffffff";

pub trait AssetResolver: Send + Sync {
    fn product_image(&self, product: &Product) -> String;

    fn tuning_diagram(&self, tuning_label: &str) -> String {
        format!(
            "{}/{}",
            TUNING_DIAGRAMS_DIR,
            Tuning::diagram_for_label(tuning_label)
        )
    }
}

/// Bare asset keys, resolved by whoever serves the static files.
pub struct AssetKeys;

impl AssetResolver for AssetKeys {
    fn product_image(&self, product: &Product) -> String {
        format!("{}/{}.png", PRODUCT_IMAGES_DIR, product.name)
    }
}

/// Looks for product images in a local assets directory and falls back to a
/// generated placeholder.
pub struct LocalAssetResolver {
    root: PathBuf,
}

fn sanitize_image_name(name: &str) -> String {
    name.replace(' ', "_").replace('+', "Plus")
}

pub fn placeholder_url(product: &Product) -> String {
    let text = format!("{} {}", product.brand, product.name);
    format!(
        "{}?text={}",
        PLACEHOLDER_BASE_URL,
        urlencoding::encode(&text)
    )
}

impl LocalAssetResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn candidates(product: &Product) -> Vec<String> {
        let sanitized = sanitize_image_name(&product.name);
        let mut names = vec![format!("{}.jpg", sanitized), format!("{}.png", sanitized)];
        if sanitized != product.name {
            names.push(format!("{}.jpg", product.name));
            names.push(format!("{}.png", product.name));
        }
        names
    }
}

impl AssetResolver for LocalAssetResolver {
    fn product_image(&self, product: &Product) -> String {
        for file_name in Self::candidates(product) {
            let relative = format!("{}/{}", PRODUCT_IMAGES_DIR, file_name);
            if self.root.join(&relative).is_file() {
                return relative;
            }
        }
        placeholder_url(product)
    }
}
