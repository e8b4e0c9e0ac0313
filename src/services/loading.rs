use std::path::Path;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    services::{
        recommender::{PipelineOptions, Recommender},
        snapshot,
        sources::RecordSource,
    },
};

/// Produces a ready recommender at startup.
///
/// A usable snapshot short-circuits the build. Otherwise records are pulled
/// from `source`, the index is built off the async runtime, and a fresh
/// snapshot is written back. Snapshot problems are logged and never fatal;
/// build problems are.
pub async fn load_recommender(
    source: Arc<dyn RecordSource>,
    snapshot_path: Option<&Path>,
    options: PipelineOptions,
) -> AppResult<Recommender> {
    if let Some(path) = snapshot_path {
        match rehydrate_from(path).await {
            Ok(Some(recommender)) => return Ok(recommender),
            Ok(None) => tracing::info!(path = %path.display(), "No snapshot found, building index"),
            Err(e) => tracing::warn!(error = %e, "Snapshot unusable, building index"),
        }
    }

    tracing::info!(source = source.name(), "Loading movie records");
    let records = source.load().await?;

    let recommender = tokio::task::spawn_blocking(move || Recommender::build(&records, &options))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    if let Some(path) = snapshot_path {
        if let Err(e) = snapshot::save(&recommender.snapshot(), path).await {
            tracing::error!(error = %e, "Failed to save snapshot");
        }
    }

    Ok(recommender)
}

async fn rehydrate_from(path: &Path) -> AppResult<Option<Recommender>> {
    match snapshot::load(path).await? {
        Some(cached) => Recommender::rehydrate(cached).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawMovieRecord;
    use crate::services::sources::MockRecordSource;
    use uuid::Uuid;

    fn records() -> Vec<RawMovieRecord> {
        ["space war alien", "space station", "romance drama"]
            .iter()
            .enumerate()
            .map(|(i, overview)| RawMovieRecord {
                id: i as i64,
                title: format!("Movie {i}"),
                overview: Some(overview.to_string()),
                ..Default::default()
            })
            .collect()
    }

    fn mock_source(times: usize, loaded: Vec<RawMovieRecord>) -> Arc<dyn RecordSource> {
        let mut source = MockRecordSource::new();
        source
            .expect_load()
            .times(times)
            .returning(move || Ok(loaded.clone()));
        source.expect_name().return_const("mock");
        Arc::new(source)
    }

    #[tokio::test]
    async fn test_builds_from_source() {
        let source = mock_source(1, records());
        let recommender = load_recommender(source, None, PipelineOptions::default())
            .await
            .unwrap();
        assert_eq!(recommender.len(), 3);
        assert_eq!(recommender.recommend("Movie 0", 1), vec!["Movie 1"]);
    }

    #[tokio::test]
    async fn test_empty_source_fails_build() {
        let source = mock_source(1, vec![]);
        let result = load_recommender(source, None, PipelineOptions::default()).await;
        assert!(matches!(result, Err(AppError::Build(_))));
    }

    #[tokio::test]
    async fn test_second_start_uses_snapshot() {
        let path = std::env::temp_dir().join(format!("movie-rec-{}.json", Uuid::new_v4()));

        let first = load_recommender(mock_source(1, records()), Some(&path), PipelineOptions::default())
            .await
            .unwrap();

        // The source must not be consulted once a snapshot exists
        let second = load_recommender(mock_source(0, vec![]), Some(&path), PipelineOptions::default())
            .await
            .unwrap();

        assert_eq!(second.list_titles(), first.list_titles());
        assert_eq!(
            second.recommend_scored("Movie 0", 5),
            first.recommend_scored("Movie 0", 5)
        );

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_falls_back_to_build() {
        let path = std::env::temp_dir().join(format!("movie-rec-{}.json", Uuid::new_v4()));
        tokio::fs::write(&path, b"garbage").await.unwrap();

        let recommender =
            load_recommender(mock_source(1, records()), Some(&path), PipelineOptions::default())
                .await
                .unwrap();
        assert_eq!(recommender.len(), 3);

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_misshapen_similarity_snapshot_falls_back_to_build() {
        let path = std::env::temp_dir().join(format!("movie-rec-{}.json", Uuid::new_v4()));
        let built = Recommender::build(&records(), &PipelineOptions::default()).unwrap();
        let mut stored = serde_json::to_value(built.snapshot()).unwrap();
        stored["similarity"]["scores"] = serde_json::json!([1.0]);
        tokio::fs::write(&path, stored.to_string()).await.unwrap();

        assert!(matches!(
            rehydrate_from(&path).await,
            Err(AppError::Serialization(_))
        ));

        let recommender =
            load_recommender(mock_source(1, records()), Some(&path), PipelineOptions::default())
                .await
                .unwrap();
        assert_eq!(recommender.recommend("Movie 0", 1), vec!["Movie 1"]);

        // The rebuilt index replaced the bad cache
        assert!(rehydrate_from(&path).await.unwrap().is_some());

        tokio::fs::remove_file(&path).await.unwrap();
    }
}
