pub mod catalog;
pub mod loading;
pub mod parser;
pub mod recommender;
pub mod similarity;
pub mod snapshot;
pub mod sources;
pub mod stopwords;
pub mod tags;
pub mod vectorizer;

pub use catalog::Catalog;
pub use loading::load_recommender;
pub use recommender::{PipelineOptions, Recommender};
pub use similarity::SimilarityMatrix;
pub use sources::{JsonFileSource, RecordSource};
pub use vectorizer::Vocabulary;
