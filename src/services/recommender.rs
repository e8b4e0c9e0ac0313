use chrono::{DateTime, Utc};
use std::time::Instant;

use crate::{
    error::{AppError, AppResult},
    models::{RawMovieRecord, ScoredTitle},
    services::{
        catalog::Catalog,
        similarity::SimilarityMatrix,
        snapshot::Snapshot,
        tags::tag_record,
        vectorizer::{Vocabulary, DEFAULT_MAX_FEATURES},
    },
};

/// Parameters of the feature pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Keep only the first N cast members; `None` keeps the full cast
    pub max_cast_members: Option<usize>,
    pub max_features: usize,
    /// Drop rows with any missing attribute (as opposed to only a missing title)
    pub drop_incomplete: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_cast_members: None,
            max_features: DEFAULT_MAX_FEATURES,
            drop_incomplete: true,
        }
    }
}

/// Fully built, read-only recommendation index.
///
/// Catalog, vocabulary and similarity matrix are only ever produced together,
/// so a `Recommender` value is either complete or does not exist.
#[derive(Debug, Clone)]
pub struct Recommender {
    catalog: Catalog,
    vocabulary: Vocabulary,
    similarity: SimilarityMatrix,
    built_at: DateTime<Utc>,
}

impl Recommender {
    /// Runs the whole pipeline: parse, tag, vectorize, compute similarities
    pub fn build(records: &[RawMovieRecord], options: &PipelineOptions) -> AppResult<Self> {
        if records.is_empty() {
            return Err(AppError::Build("no movie records to index".to_string()));
        }

        let start = Instant::now();
        let tagged = records
            .iter()
            .map(|record| tag_record(record, options.max_cast_members))
            .collect();
        let catalog = Catalog::new(tagged);
        tracing::info!(movies = catalog.len(), "Tags built");

        let tags: Vec<&str> = catalog.records().iter().map(|r| r.tag.as_str()).collect();
        let vocabulary = Vocabulary::fit(&tags, options.max_features)?;
        let vectors = vocabulary.transform(&tags);
        tracing::info!(vocabulary = vocabulary.len(), "Movie vectors created");

        let similarity = SimilarityMatrix::build(&vectors);

        tracing::info!(
            movies = catalog.len(),
            vocabulary = vocabulary.len(),
            processing_time_ms = start.elapsed().as_millis(),
            "Recommendation index built"
        );

        Ok(Self {
            catalog,
            vocabulary,
            similarity,
            built_at: Utc::now(),
        })
    }

    /// Restores an index from a cached snapshot without recomputing anything
    pub fn rehydrate(snapshot: Snapshot) -> AppResult<Self> {
        let Snapshot {
            built_at,
            records,
            vocabulary,
            similarity,
        } = snapshot;

        if records.is_empty() {
            return Err(AppError::Build("snapshot holds no movies".to_string()));
        }
        if vocabulary.is_empty() {
            return Err(AppError::Build("snapshot holds an empty vocabulary".to_string()));
        }
        if similarity.len() != records.len() {
            return Err(AppError::Build(format!(
                "snapshot has {} movies but a {}x{} similarity matrix",
                records.len(),
                similarity.len(),
                similarity.len()
            )));
        }

        Ok(Self {
            catalog: Catalog::new(records),
            vocabulary,
            similarity,
            built_at,
        })
    }

    /// Captures everything needed to [`rehydrate`](Self::rehydrate) this index
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            built_at: self.built_at,
            records: self.catalog.records().to_vec(),
            vocabulary: self.vocabulary.clone(),
            similarity: self.similarity.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn list_titles(&self) -> Vec<String> {
        self.catalog.titles().map(str::to_string).collect()
    }

    pub fn search(&self, query: &str, limit: usize) -> Vec<String> {
        self.catalog.search_by_prefix_or_substring(query, limit)
    }

    /// Titles most similar to `title`, with their scores.
    ///
    /// Fails with `NotFound` when the title is not in the catalog.
    pub fn try_recommend_scored(&self, title: &str, k: usize) -> AppResult<Vec<ScoredTitle>> {
        let index = self
            .catalog
            .lookup_by_title(title)
            .ok_or_else(|| AppError::NotFound(format!("movie '{title}'")))?;

        Ok(self
            .similarity
            .top_k(index, k)?
            .into_iter()
            .filter_map(|(row, score)| {
                self.catalog.get(row).map(|record| ScoredTitle {
                    title: record.title.clone(),
                    score,
                })
            })
            .collect())
    }

    /// Best-effort variant of [`try_recommend_scored`](Self::try_recommend_scored):
    /// lookup misses yield an empty list.
    pub fn recommend_scored(&self, title: &str, k: usize) -> Vec<ScoredTitle> {
        self.try_recommend_scored(title, k).unwrap_or_else(|e| {
            tracing::debug!(error = %e, title, "No recommendations");
            Vec::new()
        })
    }

    pub fn recommend(&self, title: &str, k: usize) -> Vec<String> {
        self.recommend_scored(title, k)
            .into_iter()
            .map(|scored| scored.title)
            .collect()
    }
}
