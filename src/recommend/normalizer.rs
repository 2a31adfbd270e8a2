//! Standard-score scaling of feature vectors.
//!
//! Parameters are fitted once over the whole prepared catalog and then applied
//! unchanged to catalog vectors and query vectors, so both live in the same
//! coordinate space.

use serde::{Deserialize, Serialize};

/// Number of feature dimensions: price, bass, mid, treble, genre code.
pub const FEATURE_DIMS: usize = 5;

pub const FEATURE_NAMES: [&str; FEATURE_DIMS] = ["price", "bass", "mid", "treble", "genre_code"];

pub type FeatureVector = [f64; FEATURE_DIMS];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionStats {
    pub mean: f64,
    pub std: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationParameters {
    pub dimensions: [DimensionStats; FEATURE_DIMS],
}

impl NormalizationParameters {
    /// Population mean and standard deviation per dimension.
    ///
    /// An empty input yields zero means and zero deviations, which normalize
    /// everything to the origin.
    pub fn fit(vectors: &[FeatureVector]) -> NormalizationParameters {
        let mut dimensions = [DimensionStats { mean: 0.0, std: 0.0 }; FEATURE_DIMS];
        if vectors.is_empty() {
            return NormalizationParameters { dimensions };
        }
        let n = vectors.len() as f64;

        for (dim, stats) in dimensions.iter_mut().enumerate() {
            let mean = vectors.iter().map(|v| v[dim]).sum::<f64>() / n;
            let variance = vectors
                .iter()
                .map(|v| {
                    let delta = v[dim] - mean;
                    delta * delta
                })
                .sum::<f64>()
                / n;
            *stats = DimensionStats {
                mean,
                std: variance.sqrt(),
            };
        }

        NormalizationParameters { dimensions }
    }

    /// `(x - mean) / std`, with 0 for dimensions whose std is zero.
    pub fn normalize(&self, vector: &FeatureVector) -> FeatureVector {
        let mut out = [0.0; FEATURE_DIMS];
        for (dim, stats) in self.dimensions.iter().enumerate() {
            out[dim] = if stats.std > 0.0 {
                (vector[dim] - stats.mean) / stats.std
            } else {
                0.0
            };
        }
        out
    }

    /// Inverse of [`normalize`](Self::normalize). Zero-std dimensions map back to their mean.
    pub fn denormalize(&self, vector: &FeatureVector) -> FeatureVector {
        let mut out = [0.0; FEATURE_DIMS];
        for (dim, stats) in self.dimensions.iter().enumerate() {
            out[dim] = vector[dim] * stats.std + stats.mean;
        }
        out
    }

    /// Returns the name of the first dimension with unusable statistics, and why.
    pub fn find_invalid_dimension(&self) -> Option<(&'static str, String)> {
        self.dimensions
            .iter()
            .zip(FEATURE_NAMES)
            .find_map(|(stats, name)| {
                if !stats.mean.is_finite() {
                    Some((name, format!("mean is {}", stats.mean)))
                } else if !stats.std.is_finite() || stats.std < 0.0 {
                    Some((name, format!("std is {}", stats.std)))
                } else {
                    None
                }
            })
    }
}
