use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::HealthStatus;
use crate::services::Recommender;

/// Result caps applied at the HTTP boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServingLimits {
    pub search_limit: usize,
    pub recommendation_count: usize,
}

impl Default for ServingLimits {
    fn default() -> Self {
        Self {
            search_limit: 10,
            recommendation_count: 5,
        }
    }
}

/// Shared application state
///
/// The recommender slot is empty until startup finishes building or
/// rehydrating the index, then holds it for the life of the process.
#[derive(Clone, Default)]
pub struct AppState {
    pub limits: ServingLimits,
    recommender: Arc<RwLock<Option<Arc<Recommender>>>>,
}

impl AppState {
    /// Creates a state with no index loaded yet
    pub fn new(limits: ServingLimits) -> Self {
        Self {
            limits,
            recommender: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a state serving an already built index
    pub fn with_recommender(limits: ServingLimits, recommender: Recommender) -> Self {
        Self {
            limits,
            recommender: Arc::new(RwLock::new(Some(Arc::new(recommender)))),
        }
    }

    /// Makes a complete index visible to request handlers in one step
    pub async fn publish(&self, recommender: Recommender) {
        let count = recommender.len();
        *self.recommender.write().await = Some(Arc::new(recommender));
        tracing::info!(movies = count, "Recommendation index published");
    }

    /// Snapshot of the current index; the lock is released before returning
    pub async fn recommender(&self) -> Option<Arc<Recommender>> {
        self.recommender.read().await.clone()
    }

    pub async fn health(&self) -> HealthStatus {
        match self.recommender().await {
            Some(recommender) => HealthStatus {
                loaded: true,
                count: recommender.len(),
            },
            None => HealthStatus {
                loaded: false,
                count: 0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawMovieRecord;
    use crate::services::PipelineOptions;

    #[tokio::test]
    async fn test_health_before_and_after_publish() {
        let state = AppState::new(ServingLimits::default());
        assert_eq!(
            state.health().await,
            HealthStatus {
                loaded: false,
                count: 0
            }
        );

        let records = vec![RawMovieRecord {
            id: 1,
            title: "Alien".to_string(),
            overview: Some("space horror".to_string()),
            ..Default::default()
        }];
        let recommender = Recommender::build(&records, &PipelineOptions::default()).unwrap();
        state.publish(recommender).await;

        assert_eq!(
            state.health().await,
            HealthStatus {
                loaded: true,
                count: 1
            }
        );
    }
}
