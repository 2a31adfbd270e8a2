//! IEM Recommender Library
//!
//! Budget-filtered nearest-neighbor recommendations over a prepared
//! in-ear monitor catalog, plus the HTTP server that exposes them.

pub mod assets;
pub mod catalog;
pub mod config;
pub mod recommend;
pub mod server;

// Re-export commonly used types for convenience
pub use assets::{AssetKeys, AssetResolver, LocalAssetResolver};
pub use catalog::{load_catalog, PreparedCatalog};
pub use recommend::{RecommendationEngine, RecommendationOutcome};
pub use server::{run_server, RequestsLoggingLevel};
