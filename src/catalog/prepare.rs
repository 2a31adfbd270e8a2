//! Offline preparation: raw table in, frozen codebook, normalization
//! parameters and augmented catalog out.

use super::product::{Product, RawProduct};
use super::store::{PreparedCatalog, PreparedProduct};
use super::validation::{
    validate_raw_product, DataValidationError, LoadProblem, NUMERIC_COLUMNS, REQUIRED_COLUMNS,
};
use crate::recommend::encoder::GenreCodebook;
use crate::recommend::matcher::NeighborIndex;
use crate::recommend::normalizer::{FeatureVector, NormalizationParameters};
use serde_json::{Map, Number, Value};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// A raw row, or the reason it could not be read at all.
type RawRow = Result<Map<String, Value>, String>;

/// The raw catalog table, read from a CSV file with a header row or from a
/// JSON array of row objects.
#[derive(Debug, Clone, Default)]
pub struct RawCatalog {
    columns: HashSet<String>,
    rows: Vec<RawRow>,
}

impl RawCatalog {
    pub fn from_json_str(json: &str) -> Result<RawCatalog, DataValidationError> {
        let rows: Vec<Map<String, Value>> = serde_json::from_str(json)?;
        let columns: HashSet<String> = rows.iter().flat_map(|row| row.keys().cloned()).collect();
        Ok(RawCatalog {
            columns,
            rows: rows.into_iter().map(Ok).collect(),
        })
    }

    /// Reads a CSV table. Columns come from the header row. Empty cells count
    /// as missing, short records just miss their trailing fields.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<RawCatalog, DataValidationError> {
        let reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        RawCatalog::from_csv(reader)
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<RawCatalog, DataValidationError> {
        let headers = reader.headers()?.clone();
        let columns: HashSet<String> = headers.iter().map(str::to_owned).collect();

        let rows: Vec<RawRow> = reader
            .records()
            .map(|record| {
                let record = record.map_err(|err| err.to_string())?;
                Ok(headers
                    .iter()
                    .zip(record.iter())
                    .filter(|(_, cell)| !cell.is_empty())
                    .map(|(column, cell)| (column.to_owned(), csv_cell_value(column, cell)))
                    .collect())
            })
            .collect();

        Ok(RawCatalog { columns, rows })
    }

    /// Picks the format from the file extension: `.csv` is CSV, anything else JSON.
    pub fn load(path: &Path) -> Result<RawCatalog, DataValidationError> {
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

        if is_csv {
            let reader = csv::ReaderBuilder::new()
                .flexible(true)
                .trim(csv::Trim::All)
                .from_path(path)?;
            return RawCatalog::from_csv(reader);
        }

        let text = std::fs::read_to_string(path)?;
        RawCatalog::from_json_str(&text)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn has_column(&self, column: &str) -> bool {
        self.columns.contains(column)
    }
}

/// Numeric columns become JSON numbers when the cell parses as one. Anything
/// else stays a string, so a bad number surfaces as a malformed row.
fn csv_cell_value(column: &str, cell: &str) -> Value {
    if NUMERIC_COLUMNS.contains(&column) {
        if let Some(number) = cell.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(number);
        }
    }
    Value::String(cell.to_owned())
}

/// Everything the preparation step produces.
pub struct Preparation {
    pub catalog: PreparedCatalog,
    /// Rows that were excluded, and why.
    pub problems: Vec<LoadProblem>,
    /// Index over the whole normalized catalog, for offline diagnostics.
    pub index: NeighborIndex,
}

pub fn feature_vector(product: &Product, genre_code: usize) -> FeatureVector {
    [
        product.price as f64,
        product.bass as f64,
        product.mid as f64,
        product.treble as f64,
        genre_code as f64,
    ]
}

pub fn prepare(raw: &RawCatalog) -> Result<Preparation, DataValidationError> {
    if raw.is_empty() {
        return Err(DataValidationError::EmptyCatalog);
    }

    if let Some(column) = REQUIRED_COLUMNS.into_iter().find(|c| !raw.has_column(c)) {
        return Err(DataValidationError::MissingColumn(column));
    }

    let mut problems = vec![];
    let mut products: Vec<Product> = vec![];
    let mut seen_names: HashSet<String> = HashSet::new();

    for (row, fields) in raw.rows.iter().enumerate() {
        let fields = match fields {
            Ok(fields) => fields,
            Err(reason) => {
                problems.push(LoadProblem::MalformedRow {
                    row,
                    reason: reason.clone(),
                });
                continue;
            }
        };
        let parsed: RawProduct = match serde_json::from_value(Value::Object(fields.clone())) {
            Ok(parsed) => parsed,
            Err(err) => {
                problems.push(LoadProblem::MalformedRow {
                    row,
                    reason: err.to_string(),
                });
                continue;
            }
        };

        match validate_raw_product(row, parsed) {
            Ok(product) => {
                if !seen_names.insert(product.name.clone()) {
                    problems.push(LoadProblem::DuplicateName {
                        row,
                        name: product.name,
                    });
                    continue;
                }
                products.push(product);
            }
            Err(problem) => problems.push(problem),
        }
    }

    for problem in problems.iter() {
        warn!("Excluding catalog row: {}", problem);
    }

    if products.is_empty() {
        return Err(DataValidationError::EmptyCatalog);
    }

    let genres = GenreCodebook::fit(products.iter().map(|p| p.genre.as_str()));
    let products: Vec<PreparedProduct> = products
        .into_iter()
        .map(|product| {
            let genre_code = genres.encode(&product.genre).code();
            PreparedProduct {
                product,
                genre_code,
            }
        })
        .collect();

    let vectors: Vec<FeatureVector> = products
        .iter()
        .map(|p| feature_vector(&p.product, p.genre_code))
        .collect();
    let normalization = NormalizationParameters::fit(&vectors);
    debug!("Fitted normalization parameters: {:?}", normalization);

    let index = NeighborIndex::new(vectors.iter().map(|v| normalization.normalize(v)).collect());

    Ok(Preparation {
        catalog: PreparedCatalog::new(genres, normalization, products),
        problems,
        index,
    })
}
