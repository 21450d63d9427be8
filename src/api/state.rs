use std::sync::Arc;

use crate::db::{ContentRepository, JsonStore, ProfileRepository};
use crate::services::{Recommender, ScoreSource, WatchHistory};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub content: Arc<dyn ContentRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub history: Arc<WatchHistory>,
    pub recommender: Arc<Recommender>,
}

impl AppState {
    /// Wires every service to the one document store
    pub fn new(store: JsonStore, scores: Arc<dyn ScoreSource>) -> Self {
        let content: Arc<dyn ContentRepository> = Arc::new(store.clone());
        let profiles: Arc<dyn ProfileRepository> = Arc::new(store.clone());
        let history = Arc::new(store.clone());
        let recommendations = Arc::new(store);

        Self {
            history: Arc::new(WatchHistory::new(
                history.clone(),
                profiles.clone(),
                content.clone(),
            )),
            recommender: Arc::new(Recommender::new(
                content.clone(),
                history,
                profiles.clone(),
                recommendations,
                scores,
            )),
            content,
            profiles,
        }
    }
}
