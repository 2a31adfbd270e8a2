use super::matcher::Neighbor;
use crate::assets::AssetResolver;
use crate::catalog::Product;
use serde::{Deserialize, Serialize};

/// Smallest score ever displayed, so very distant matches never show as 0.
const MIN_MATCH_SCORE: f64 = 0.1;

/// One ranked, user-facing recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub rank: usize,
    pub name: String,
    pub brand: String,
    pub price: u64,
    pub price_formatted: String,
    pub tuning: String,
    pub bass: u8,
    pub mid: u8,
    pub treble: u8,
    pub soundstage: u8,
    pub genre: String,
    pub driver_type: String,
    pub distance: f64,
    pub match_score: f64,
    pub iem_image: String,
    pub tuning_image: String,
}

/// `100 / (1 + distance)` rounded to one decimal.
pub fn match_score(distance: f64) -> f64 {
    let raw = 100.0 / (1.0 + distance.max(0.0));
    ((raw * 10.0).round() / 10.0).max(MIN_MATCH_SCORE)
}

/// Rupiah with comma thousands separators, e.g. `Rp 1,250,000`.
pub fn format_price(price: u64) -> String {
    let digits = price.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("Rp {}", grouped)
}

pub fn format_recommendations(
    neighbors: &[Neighbor],
    catalog: &[Product],
    assets: &dyn AssetResolver,
) -> Vec<RecommendationRecord> {
    neighbors
        .iter()
        .filter_map(|neighbor| catalog.get(neighbor.index).map(|p| (neighbor, p)))
        .enumerate()
        .map(|(position, (neighbor, product))| RecommendationRecord {
            rank: position + 1,
            name: product.name.clone(),
            brand: product.brand.clone(),
            price: product.price,
            price_formatted: format_price(product.price),
            tuning: product.tuning.clone(),
            bass: product.bass,
            mid: product.mid,
            treble: product.treble,
            soundstage: product.soundstage,
            genre: product.genre.clone(),
            driver_type: product.driver_type.clone(),
            distance: neighbor.distance,
            match_score: match_score(neighbor.distance),
            iem_image: assets.product_image(product),
            tuning_image: assets.tuning_diagram(&product.tuning),
        })
        .collect()
}
