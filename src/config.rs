use serde::Deserialize;
use std::path::PathBuf;

use crate::services::PipelineOptions;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// JSON array of movie rows
    #[serde(default = "default_movies_path")]
    pub movies_path: PathBuf,

    /// JSON array of credit rows, joined to movies on title
    #[serde(default)]
    pub credits_path: Option<PathBuf>,

    /// Where the precomputed index is cached between runs
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,

    /// Cap on cast members per movie; unset keeps the full cast
    #[serde(default)]
    pub max_cast_members: Option<usize>,

    /// Maximum vocabulary size
    #[serde(default = "default_max_features")]
    pub max_features: usize,

    /// Drop rows with any missing attribute instead of only rows missing a title
    #[serde(default = "default_drop_incomplete_records")]
    pub drop_incomplete_records: bool,

    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    #[serde(default = "default_recommendation_count")]
    pub recommendation_count: usize,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_movies_path() -> PathBuf {
    PathBuf::from("data/movies.json")
}

fn default_max_features() -> usize {
    5000
}

fn default_drop_incomplete_records() -> bool {
    true
}

fn default_search_limit() -> usize {
    10
}

fn default_recommendation_count() -> usize {
    5
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Pipeline parameters derived from this configuration
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            max_cast_members: self.max_cast_members,
            max_features: self.max_features,
            drop_incomplete: self.drop_incomplete_records,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
