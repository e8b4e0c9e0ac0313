use serde::{Deserialize, Serialize};

// ============================================================================
// Pipeline Types
// ============================================================================

/// One movie row as handed over by a record source, before any parsing.
///
/// The attribute fields hold serialized lists of objects exactly as they
/// appear in the source data, e.g. `[{"id": 28, "name": "Action"}]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawMovieRecord {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub genres: String,
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub cast: String,
    #[serde(default)]
    pub crew: String,
}

/// Token lists extracted from a [`RawMovieRecord`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedAttributes {
    pub genres: Vec<String>,
    pub keywords: Vec<String>,
    pub cast: Vec<String>,
    /// Zero or one entries
    pub director: Vec<String>,
}

/// A catalog row: the movie identity plus its bag-of-words tag.
///
/// The position of a `TagRecord` in the catalog is its row index in every
/// downstream matrix.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagRecord {
    pub id: i64,
    pub title: String,
    pub tag: String,
}

// ============================================================================
// API Types
// ============================================================================

/// Load status reported by the health endpoint
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    pub loaded: bool,
    pub count: usize,
}

/// A recommended title together with its cosine similarity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredTitle {
    pub title: String,
    pub score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_record_defaults_missing_attributes() {
        let record: RawMovieRecord =
            serde_json::from_str(r#"{"id": 19995, "title": "Avatar"}"#).unwrap();
        assert_eq!(record.title, "Avatar");
        assert_eq!(record.overview, None);
        assert!(record.genres.is_empty());
        assert!(record.crew.is_empty());
    }

    #[test]
    fn test_scored_title_serialization() {
        let scored = ScoredTitle {
            title: "Aliens".to_string(),
            score: 0.5,
        };
        let json = serde_json::to_value(&scored).unwrap();
        assert_eq!(json["title"], "Aliens");
        assert_eq!(json["score"], 0.5);
    }
}
