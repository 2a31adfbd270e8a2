//! The request pipeline: budget filter, encode and normalize, match, format.

use super::budget::{self, BudgetSelection};
use super::encoder::{GenreCodebook, GenreEncoding};
use super::formatter::{format_recommendations, RecommendationRecord};
use super::matcher::NeighborIndex;
use super::normalizer::{FeatureVector, NormalizationParameters};
use super::query::UserQuery;
use crate::assets::AssetResolver;
use crate::catalog::{PreparedCatalog, Product};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum RecommendationOutcome {
    Matches {
        recommendations: Vec<RecommendationRecord>,
        /// The requested genre was unknown and the fallback code was used.
        genre_fallback: bool,
    },
    /// No product is priced within the requested budget.
    NoMatch,
}

/// Immutable matching context, built once at startup and shared by all requests.
pub struct RecommendationEngine {
    genres: GenreCodebook,
    normalization: NormalizationParameters,
    products: Vec<Product>,
    index: NeighborIndex,
    assets: Arc<dyn AssetResolver>,
}

impl RecommendationEngine {
    pub fn new(catalog: PreparedCatalog, assets: Arc<dyn AssetResolver>) -> RecommendationEngine {
        let normalized = catalog
            .feature_vectors()
            .iter()
            .map(|v| catalog.normalization.normalize(v))
            .collect();
        let PreparedCatalog {
            genres,
            normalization,
            products,
            ..
        } = catalog;

        RecommendationEngine {
            genres,
            normalization,
            products: products.into_iter().map(|p| p.product).collect(),
            index: NeighborIndex::new(normalized),
            assets,
        }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn genres(&self) -> &GenreCodebook {
        &self.genres
    }

    pub fn normalization(&self) -> &NormalizationParameters {
        &self.normalization
    }

    pub fn encode_genre(&self, genre: &str) -> GenreEncoding {
        let encoding = self.genres.encode(genre);
        if encoding.is_fallback() {
            warn!(
                "Genre '{}' is not in the codebook, matching with genre code {} instead",
                genre,
                encoding.code()
            );
        }
        encoding
    }

    /// Query vector before normalization.
    pub fn query_features(&self, query: &UserQuery, encoding: GenreEncoding) -> FeatureVector {
        let archetype = query.sound_character.archetype();
        [
            query.budget.reference_price() as f64,
            archetype.bass as f64,
            archetype.mid as f64,
            archetype.treble as f64,
            encoding.code() as f64,
        ]
    }

    pub fn recommend(&self, query: &UserQuery) -> RecommendationOutcome {
        let candidates = match budget::filter(&self.products, query.budget) {
            BudgetSelection::Candidates(indices) => indices,
            BudgetSelection::Empty => {
                debug!("No products in budget {}", query.budget.label());
                return RecommendationOutcome::NoMatch;
            }
        };

        let encoding = self.encode_genre(&query.genre);
        let query_vector = self
            .normalization
            .normalize(&self.query_features(query, encoding));

        let neighbors = self
            .index
            .search_among(&query_vector, query.top_n, &candidates);
        debug!(
            "Matched {} of {} candidates in budget {}",
            neighbors.len(),
            candidates.len(),
            query.budget.label()
        );

        RecommendationOutcome::Matches {
            recommendations: format_recommendations(
                &neighbors,
                &self.products,
                self.assets.as_ref(),
            ),
            genre_fallback: encoding.is_fallback(),
        }
    }
}
