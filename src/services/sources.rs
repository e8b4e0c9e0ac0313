//! Movie record sources
//!
//! A source produces the raw rows the pipeline indexes. It owns reading and
//! joining the underlying data and applying the null policy, so everything it
//! returns already has a title.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::{error::AppResult, models::RawMovieRecord};

/// Trait for raw movie record sources
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecordSource: Send + Sync {
    /// Loads every indexable record, in catalog order
    async fn load(&self) -> AppResult<Vec<RawMovieRecord>>;

    /// Source name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Movie row as stored on disk; any field may be absent or null
#[derive(Debug, Clone, Default, Deserialize)]
struct MovieRow {
    id: Option<i64>,
    title: Option<String>,
    overview: Option<String>,
    genres: Option<String>,
    keywords: Option<String>,
    cast: Option<String>,
    crew: Option<String>,
}

/// Credits row, joined to movies on title
#[derive(Debug, Clone, Default, Deserialize)]
struct CreditRow {
    title: Option<String>,
    cast: Option<String>,
    crew: Option<String>,
}

/// Reads movies (and optionally credits) from JSON array files
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    movies_path: PathBuf,
    credits_path: Option<PathBuf>,
    drop_incomplete: bool,
}

impl JsonFileSource {
    pub fn new(movies_path: PathBuf, credits_path: Option<PathBuf>, drop_incomplete: bool) -> Self {
        Self {
            movies_path,
            credits_path,
            drop_incomplete,
        }
    }
}

#[async_trait::async_trait]
impl RecordSource for JsonFileSource {
    async fn load(&self) -> AppResult<Vec<RawMovieRecord>> {
        let movies: Vec<MovieRow> =
            serde_json::from_slice(&tokio::fs::read(&self.movies_path).await?)?;
        tracing::info!(rows = movies.len(), path = %self.movies_path.display(), "Movies read");

        let rows = match &self.credits_path {
            Some(path) => {
                let credits: Vec<CreditRow> = serde_json::from_slice(&tokio::fs::read(path).await?)?;
                tracing::info!(rows = credits.len(), path = %path.display(), "Credits read");
                join_on_title(movies, credits)
            }
            None => movies,
        };

        let total = rows.len();
        let records = apply_null_policy(rows, self.drop_incomplete);
        tracing::info!(
            kept = records.len(),
            dropped = total - records.len(),
            drop_incomplete = self.drop_incomplete,
            "Movie records prepared"
        );
        Ok(records)
    }

    fn name(&self) -> &'static str {
        "json_file"
    }
}

/// Inner join on title. Movie order is kept and a movie matching several
/// credit rows appears once per match; credit cast/crew replace the movie's.
fn join_on_title(movies: Vec<MovieRow>, credits: Vec<CreditRow>) -> Vec<MovieRow> {
    let mut by_title: HashMap<String, Vec<CreditRow>> = HashMap::new();
    for credit in credits {
        if let Some(title) = credit.title.clone() {
            by_title.entry(title).or_default().push(credit);
        }
    }

    movies
        .into_iter()
        .flat_map(|movie| {
            let matches = movie
                .title
                .as_ref()
                .and_then(|title| by_title.get(title))
                .cloned()
                .unwrap_or_default();
            matches.into_iter().map(move |credit| MovieRow {
                cast: credit.cast,
                crew: credit.crew,
                ..movie.clone()
            })
        })
        .collect()
}

/// Missing overviews become empty text. With `drop_incomplete`, rows missing
/// any other field are dropped; otherwise only rows without a title or id are.
fn apply_null_policy(rows: Vec<MovieRow>, drop_incomplete: bool) -> Vec<RawMovieRecord> {
    rows.into_iter()
        .filter_map(|row| {
            let (id, title) = (row.id?, row.title?);
            if drop_incomplete {
                Some(RawMovieRecord {
                    id,
                    title,
                    overview: Some(row.overview.unwrap_or_default()),
                    genres: row.genres?,
                    keywords: row.keywords?,
                    cast: row.cast?,
                    crew: row.crew?,
                })
            } else {
                Some(RawMovieRecord {
                    id,
                    title,
                    overview: Some(row.overview.unwrap_or_default()),
                    genres: row.genres.unwrap_or_default(),
                    keywords: row.keywords.unwrap_or_default(),
                    cast: row.cast.unwrap_or_default(),
                    crew: row.crew.unwrap_or_default(),
                })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn movie_row(id: i64, title: &str) -> MovieRow {
        MovieRow {
            id: Some(id),
            title: Some(title.to_string()),
            overview: None,
            genres: Some("[]".to_string()),
            keywords: Some("[]".to_string()),
            cast: None,
            crew: None,
        }
    }

    fn credit_row(title: &str, cast: &str) -> CreditRow {
        CreditRow {
            title: Some(title.to_string()),
            cast: Some(cast.to_string()),
            crew: Some("[]".to_string()),
        }
    }

    #[test]
    fn test_join_keeps_movie_order_and_duplicates() {
        let movies = vec![movie_row(1, "Heat"), movie_row(2, "Alien"), movie_row(3, "Orphan")];
        let credits = vec![
            credit_row("Alien", "a"),
            credit_row("Heat", "h1"),
            credit_row("Heat", "h2"),
        ];

        let joined = join_on_title(movies, credits);
        let summary: Vec<(i64, String)> = joined
            .iter()
            .map(|row| (row.id.unwrap(), row.cast.clone().unwrap()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (1, "h1".to_string()),
                (1, "h2".to_string()),
                (2, "a".to_string())
            ]
        );
    }

    #[test]
    fn test_null_policy() {
        let mut complete = movie_row(1, "Heat");
        complete.cast = Some("[]".to_string());
        complete.crew = Some("[]".to_string());
        let incomplete = movie_row(2, "Alien");
        let untitled = MovieRow {
            id: Some(3),
            ..Default::default()
        };
        let rows = vec![complete, incomplete, untitled];

        let strict = apply_null_policy(rows.clone(), true);
        assert_eq!(strict.len(), 1);
        assert_eq!(strict[0].title, "Heat");
        assert_eq!(strict[0].overview.as_deref(), Some(""));

        let lenient = apply_null_policy(rows, false);
        let titles: Vec<&str> = lenient.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Heat", "Alien"]);
        assert!(lenient[1].cast.is_empty());
    }

    #[tokio::test]
    async fn test_json_file_source_load() {
        let dir = std::env::temp_dir();
        let movies_path = dir.join(format!("movies-{}.json", Uuid::new_v4()));
        let credits_path = dir.join(format!("credits-{}.json", Uuid::new_v4()));

        let movies = json!([
            {"id": 19995, "title": "Avatar", "overview": "A marine on an alien moon",
             "genres": "[{\"name\": \"Action\"}]", "keywords": "[]"},
            {"id": 285, "title": "Unmatched", "overview": null,
             "genres": "[]", "keywords": "[]"}
        ]);
        let credits = json!([
            {"title": "Avatar", "cast": "[{\"name\": \"Zoe Saldana\"}]",
             "crew": "[{\"job\": \"Director\", \"name\": \"James Cameron\"}]"}
        ]);
        tokio::fs::write(&movies_path, movies.to_string()).await.unwrap();
        tokio::fs::write(&credits_path, credits.to_string()).await.unwrap();

        let source = JsonFileSource::new(movies_path.clone(), Some(credits_path.clone()), true);
        let records = source.load().await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 19995);
        assert!(records[0].crew.contains("James Cameron"));

        tokio::fs::remove_file(movies_path).await.unwrap();
        tokio::fs::remove_file(credits_path).await.unwrap();
    }

    #[test]
    fn test_json_file_source_missing_file() {
        let source = JsonFileSource::new(PathBuf::from("/nonexistent/movies.json"), None, true);
        let result = tokio_test::block_on(source.load());
        assert!(matches!(result, Err(crate::error::AppError::Io(_))));
    }
}
