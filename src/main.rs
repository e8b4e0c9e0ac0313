use std::future::IntoFuture;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use movie_rec_api::{
    api::{create_router, AppState, ServingLimits},
    config::Config,
    services::{load_recommender, JsonFileSource, RecordSource},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("movie_rec_api=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let state = AppState::new(ServingLimits {
        search_limit: config.search_limit,
        recommendation_count: config.recommendation_count,
    });
    let app = create_router(state.clone());

    // Serve health checks while the index is still being built
    let loader = tokio::spawn({
        let config = config.clone();
        async move {
            let source: Arc<dyn RecordSource> = Arc::new(JsonFileSource::new(
                config.movies_path.clone(),
                config.credits_path.clone(),
                config.drop_incomplete_records,
            ));
            let recommender = load_recommender(
                source,
                config.snapshot_path.as_deref(),
                config.pipeline_options(),
            )
            .await?;
            state.publish(recommender).await;
            Ok::<_, movie_rec_api::error::AppError>(())
        }
    });

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!(address = %config.bind_address(), "Server listening");

    let server = axum::serve(listener, app).into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => result?,
        loaded = loader => {
            if let Err(e) = loaded? {
                tracing::error!(error = %e, "Failed to load movie data");
                return Err(e.into());
            }
            server.await?;
        }
    }

    Ok(())
}
