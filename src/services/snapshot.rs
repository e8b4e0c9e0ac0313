use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{
    error::AppResult,
    models::TagRecord,
    services::{similarity::SimilarityMatrix, vectorizer::Vocabulary},
};

/// Cached form of a built index.
///
/// The on-disk layout is private to this crate; only [`save`] and [`load`]
/// are expected to read or write it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub built_at: DateTime<Utc>,
    pub records: Vec<TagRecord>,
    pub vocabulary: Vocabulary,
    pub similarity: SimilarityMatrix,
}

/// Writes the snapshot next to `path` first and renames it into place, so a
/// crash mid-write never leaves a truncated cache behind.
pub async fn save(snapshot: &Snapshot, path: &Path) -> AppResult<()> {
    let bytes = serde_json::to_vec(snapshot)?;
    let staging = path.with_extension("tmp");

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&staging, &bytes).await?;
    tokio::fs::rename(&staging, path).await?;

    tracing::info!(
        path = %path.display(),
        movies = snapshot.records.len(),
        bytes = bytes.len(),
        "Snapshot saved"
    );
    Ok(())
}

/// Reads a snapshot; `Ok(None)` when no cache file exists yet
pub async fn load(path: &Path) -> AppResult<Option<Snapshot>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
    tracing::info!(
        path = %path.display(),
        movies = snapshot.records.len(),
        built_at = %snapshot.built_at,
        "Snapshot loaded"
    );
    Ok(Some(snapshot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::path::PathBuf;
    use uuid::Uuid;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("movie-rec-snapshot-{}.json", Uuid::new_v4()))
    }

    fn sample() -> Snapshot {
        let vocabulary = Vocabulary::fit(&["space war", "romance"], 10).unwrap();
        let vectors = vocabulary.transform(&["space war", "romance"]);
        Snapshot {
            built_at: Utc::now(),
            records: vec![
                TagRecord {
                    id: 1,
                    title: "Starfall".to_string(),
                    tag: "space war".to_string(),
                },
                TagRecord {
                    id: 2,
                    title: "Summer Letters".to_string(),
                    tag: "romance".to_string(),
                },
            ],
            vocabulary,
            similarity: SimilarityMatrix::build(&vectors),
        }
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let path = temp_path();
        let snapshot = sample();

        save(&snapshot, &path).await.unwrap();
        let loaded = load(&path).await.unwrap().unwrap();
        assert_eq!(loaded, snapshot);

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        assert!(load(&temp_path()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_corrupt_file() {
        let path = temp_path();
        tokio::fs::write(&path, b"{not json").await.unwrap();
        assert!(matches!(load(&path).await, Err(AppError::Serialization(_))));
        tokio::fs::remove_file(&path).await.unwrap();
    }
}
