mod load;
pub mod prepare;
mod product;
mod store;
pub mod validation;

pub use load::load_catalog;
pub use prepare::{prepare, Preparation, RawCatalog};
pub use product::{Product, RawProduct, Tuning};
pub use store::{PreparedCatalog, PreparedProduct, PREPARED_CATALOG_VERSION};
pub use validation::{DataValidationError, LoadProblem};
