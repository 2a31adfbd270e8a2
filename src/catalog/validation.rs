//! Validation for catalog rows and prepared catalog artifacts.
//!
//! Row-level issues are reported as [`LoadProblem`]s and only exclude the
//! offending row. Table-level issues are [`DataValidationError`]s and are fatal.

use super::product::{Product, RawProduct};
use std::fmt;
use thiserror::Error;

/// Columns every row of the raw catalog must carry.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "name",
    "brand",
    "price",
    "bass",
    "mid",
    "treble",
    "soundstage",
    "tuning",
    "genre",
];

/// Columns holding numbers. CSV cells in these columns are parsed as numbers.
pub const NUMERIC_COLUMNS: [&str; 5] = ["price", "bass", "mid", "treble", "soundstage"];

/// Ratings are on a small positive scale.
pub const MAX_RATING: f64 = 10.0;

/// Fatal catalog errors. The service must not start serving with any of these.
#[derive(Debug, Error)]
pub enum DataValidationError {
    #[error("Catalog has no usable rows")]
    EmptyCatalog,

    #[error("Required column '{0}' is missing from the catalog")]
    MissingColumn(&'static str),

    #[error("Unsupported prepared catalog version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("Product '{product}' has genre '{genre}' which is not in the genre codebook")]
    UnknownGenre { product: String, genre: String },

    #[error("Product '{product}' has genre code {found}, codebook says {expected}")]
    GenreCodeMismatch {
        product: String,
        found: usize,
        expected: usize,
    },

    #[error("Invalid normalization parameters for dimension '{dimension}': {reason}")]
    InvalidNormalization {
        dimension: &'static str,
        reason: String,
    },

    #[error("Duplicate product name '{0}'")]
    DuplicateName(String),

    #[error("Malformed catalog file: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Malformed CSV catalog: {0}")]
    MalformedCsv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A non-fatal issue found while preparing the catalog. The row is excluded.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadProblem {
    MissingField { row: usize, field: &'static str },
    BlankField { row: usize, field: &'static str },
    NegativePrice { row: usize, value: f64 },
    RatingOutOfRange { row: usize, field: &'static str, value: f64 },
    NonIntegerValue { row: usize, field: &'static str, value: f64 },
    DuplicateName { row: usize, name: String },
    MalformedRow { row: usize, reason: String },
}

impl fmt::Display for LoadProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadProblem::MissingField { row, field } => {
                write!(f, "Row {}: field '{}' is missing", row, field)
            }
            LoadProblem::BlankField { row, field } => {
                write!(f, "Row {}: field '{}' is blank", row, field)
            }
            LoadProblem::NegativePrice { row, value } => {
                write!(f, "Row {}: price must be non-negative, got {}", row, value)
            }
            LoadProblem::RatingOutOfRange { row, field, value } => {
                write!(
                    f,
                    "Row {}: rating '{}' must be between 1 and {}, got {}",
                    row, field, MAX_RATING, value
                )
            }
            LoadProblem::NonIntegerValue { row, field, value } => {
                write!(f, "Row {}: '{}' must be a whole number, got {}", row, field, value)
            }
            LoadProblem::DuplicateName { row, name } => {
                write!(f, "Row {}: product name '{}' already used", row, name)
            }
            LoadProblem::MalformedRow { row, reason } => {
                write!(f, "Row {}: {}", row, reason)
            }
        }
    }
}

fn required_text(row: usize, field: &'static str, value: Option<String>) -> Result<String, LoadProblem> {
    let value = value.ok_or(LoadProblem::MissingField { row, field })?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LoadProblem::BlankField { row, field });
    }
    Ok(trimmed.to_owned())
}

fn required_rating(row: usize, field: &'static str, value: Option<f64>) -> Result<u8, LoadProblem> {
    let value = value.ok_or(LoadProblem::MissingField { row, field })?;
    if !value.is_finite() || value < 1.0 || value > MAX_RATING {
        return Err(LoadProblem::RatingOutOfRange { row, field, value });
    }
    if value.fract() != 0.0 {
        return Err(LoadProblem::NonIntegerValue { row, field, value });
    }
    Ok(value as u8)
}

/// Turn a raw row into a [`Product`], or report why it can't be used.
pub fn validate_raw_product(row: usize, raw: RawProduct) -> Result<Product, LoadProblem> {
    let name = required_text(row, "name", raw.name)?;
    let brand = required_text(row, "brand", raw.brand)?;

    let price = raw.price.ok_or(LoadProblem::MissingField { row, field: "price" })?;
    if !price.is_finite() || price < 0.0 {
        return Err(LoadProblem::NegativePrice { row, value: price });
    }
    if price.fract() != 0.0 {
        return Err(LoadProblem::NonIntegerValue {
            row,
            field: "price",
            value: price,
        });
    }

    let bass = required_rating(row, "bass", raw.bass)?;
    let mid = required_rating(row, "mid", raw.mid)?;
    let treble = required_rating(row, "treble", raw.treble)?;
    let soundstage = required_rating(row, "soundstage", raw.soundstage)?;
    let tuning = required_text(row, "tuning", raw.tuning)?;
    let genre = required_text(row, "genre", raw.genre)?;

    Ok(Product {
        name,
        brand,
        price: price as u64,
        bass,
        mid,
        treble,
        soundstage,
        tuning,
        genre,
        driver_type: raw.driver_type.unwrap_or_default().trim().to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_valid_raw() -> RawProduct {
        RawProduct {
            name: Some("Moondrop Chu II".to_string()),
            brand: Some("Moondrop".to_string()),
            price: Some(300000.0),
            bass: Some(3.0),
            mid: Some(4.0),
            treble: Some(3.0),
            soundstage: Some(3.0),
            tuning: Some("Neutral".to_string()),
            genre: Some("Pop".to_string()),
            driver_type: Some("Dynamic".to_string()),
        }
    }

    #[test]
    fn test_valid_row() {
        let product = validate_raw_product(0, make_valid_raw()).unwrap();
        assert_eq!(product.name, "Moondrop Chu II");
        assert_eq!(product.price, 300000);
        assert_eq!(product.mid, 4);
        assert_eq!(product.driver_type, "Dynamic");
    }

    #[test]
    fn test_missing_driver_type_is_fine() {
        let mut raw = make_valid_raw();
        raw.driver_type = None;
        let product = validate_raw_product(0, raw).unwrap();
        assert_eq!(product.driver_type, "");
    }

    #[test]
    fn test_missing_required_field() {
        let mut raw = make_valid_raw();
        raw.treble = None;
        assert_eq!(
            validate_raw_product(4, raw),
            Err(LoadProblem::MissingField {
                row: 4,
                field: "treble"
            })
        );
    }

    #[test]
    fn test_blank_name() {
        let mut raw = make_valid_raw();
        raw.name = Some("   ".to_string());
        assert_eq!(
            validate_raw_product(1, raw),
            Err(LoadProblem::BlankField {
                row: 1,
                field: "name"
            })
        );
    }

    #[test]
    fn test_negative_price() {
        let mut raw = make_valid_raw();
        raw.price = Some(-1.0);
        assert!(matches!(
            validate_raw_product(0, raw),
            Err(LoadProblem::NegativePrice { .. })
        ));
    }

    #[test]
    fn test_rating_out_of_range() {
        let mut raw = make_valid_raw();
        raw.bass = Some(0.0);
        assert!(matches!(
            validate_raw_product(0, raw),
            Err(LoadProblem::RatingOutOfRange { field: "bass", .. })
        ));
    }

    #[test]
    fn test_fractional_rating_is_rejected() {
        let mut raw = make_valid_raw();
        raw.bass = Some(3.5);
        raw.mid = Some(2.4);
        assert_eq!(
            validate_raw_product(3, raw),
            Err(LoadProblem::NonIntegerValue {
                row: 3,
                field: "bass",
                value: 3.5
            })
        );

        let mut raw = make_valid_raw();
        raw.mid = Some(2.4);
        assert!(matches!(
            validate_raw_product(0, raw),
            Err(LoadProblem::NonIntegerValue { field: "mid", .. })
        ));
    }

    #[test]
    fn test_fractional_price_is_rejected() {
        let mut raw = make_valid_raw();
        raw.price = Some(299999.5);
        assert_eq!(
            validate_raw_product(0, raw),
            Err(LoadProblem::NonIntegerValue {
                row: 0,
                field: "price",
                value: 299999.5
            })
        );
    }

    #[test]
    fn test_whole_floats_are_kept() {
        let mut raw = make_valid_raw();
        raw.price = Some(450000.0);
        raw.treble = Some(5.0);
        let product = validate_raw_product(0, raw).unwrap();
        assert_eq!(product.price, 450000);
        assert_eq!(product.treble, 5);
    }

    #[test]
    fn test_problem_display() {
        let problem = LoadProblem::MissingField {
            row: 2,
            field: "genre",
        };
        assert_eq!(problem.to_string(), "Row 2: field 'genre' is missing");
    }
}
