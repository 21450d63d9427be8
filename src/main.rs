use std::sync::Arc;

use streamai_api::{
    api::{create_router, AppState},
    config::Config,
    db::JsonStore,
    services::{RandomScores, ScoreSource, SeededScores},
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("streamai_api=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let store = JsonStore::open(&config.data_file).await?;
    if let Some(seed_file) = &config.seed_file {
        store.seed_if_empty(seed_file).await?;
    }

    let scores: Arc<dyn ScoreSource> = match config.score_seed {
        Some(seed) => {
            tracing::info!(seed, "Using seeded recommendation scores");
            Arc::new(SeededScores::new(seed))
        }
        None => Arc::new(RandomScores),
    };

    let app = create_router(AppState::new(store, scores));

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
