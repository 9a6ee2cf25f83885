pub mod embedding;
pub mod enrichment;
pub mod ingest;
pub mod providers;
pub mod recommendations;
pub mod recommenders;
pub mod similarity;

pub use embedding::Embedder;
pub use enrichment::Enricher;
pub use recommendations::RecommendationService;
pub use recommenders::{RecommendationStrategy, Recommender};
