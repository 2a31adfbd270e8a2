use super::prepare::feature_vector;
use super::product::Product;
use super::validation::DataValidationError;
use crate::recommend::encoder::GenreCodebook;
use crate::recommend::normalizer::{FeatureVector, NormalizationParameters};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

pub const PREPARED_CATALOG_VERSION: u32 = 1;

/// A catalog row together with its encoded genre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedProduct {
    #[serde(flatten)]
    pub product: Product,
    pub genre_code: usize,
}

/// Output of the preparation job, read once by the server at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedCatalog {
    pub version: u32,
    pub genres: GenreCodebook,
    pub normalization: NormalizationParameters,
    pub products: Vec<PreparedProduct>,
}

impl PreparedCatalog {
    pub fn new(
        genres: GenreCodebook,
        normalization: NormalizationParameters,
        products: Vec<PreparedProduct>,
    ) -> PreparedCatalog {
        PreparedCatalog {
            version: PREPARED_CATALOG_VERSION,
            genres,
            normalization,
            products,
        }
    }

    pub fn from_json_str(json: &str) -> Result<PreparedCatalog, DataValidationError> {
        let catalog: PreparedCatalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<PreparedCatalog, DataValidationError> {
        let text = std::fs::read_to_string(path)?;
        PreparedCatalog::from_json_str(&text)
    }

    pub fn save(&self, path: &Path) -> Result<(), DataValidationError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Checks that the artifacts are consistent with each other.
    pub fn validate(&self) -> Result<(), DataValidationError> {
        if self.version != PREPARED_CATALOG_VERSION {
            return Err(DataValidationError::UnsupportedVersion {
                found: self.version,
                expected: PREPARED_CATALOG_VERSION,
            });
        }
        if self.products.is_empty() {
            return Err(DataValidationError::EmptyCatalog);
        }
        if let Some((dimension, reason)) = self.normalization.find_invalid_dimension() {
            return Err(DataValidationError::InvalidNormalization { dimension, reason });
        }

        let mut names = HashSet::new();
        for prepared in self.products.iter() {
            let product = &prepared.product;
            if !names.insert(product.name.as_str()) {
                return Err(DataValidationError::DuplicateName(product.name.clone()));
            }
            let encoding = self.genres.encode(&product.genre);
            if encoding.is_fallback() {
                return Err(DataValidationError::UnknownGenre {
                    product: product.name.clone(),
                    genre: product.genre.clone(),
                });
            }
            if encoding.code() != prepared.genre_code {
                return Err(DataValidationError::GenreCodeMismatch {
                    product: product.name.clone(),
                    found: prepared.genre_code,
                    expected: encoding.code(),
                });
            }
        }
        Ok(())
    }

    /// Raw (not normalized) feature vectors, in catalog order.
    pub fn feature_vectors(&self) -> Vec<FeatureVector> {
        self.products
            .iter()
            .map(|p| feature_vector(&p.product, p.genre_code))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
