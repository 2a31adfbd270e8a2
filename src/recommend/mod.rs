pub mod budget;
pub mod encoder;
mod engine;
pub mod formatter;
pub mod matcher;
pub mod normalizer;
pub mod query;

pub use budget::{BudgetBracket, BudgetSelection};
pub use encoder::{GenreCodebook, GenreEncoding};
pub use engine::{RecommendationEngine, RecommendationOutcome};
pub use formatter::RecommendationRecord;
pub use matcher::{Neighbor, NeighborIndex};
pub use normalizer::{FeatureVector, NormalizationParameters};
pub use query::{ClientInputError, QueryInput, SoundCharacter, UserQuery, DEFAULT_TOP_N};
