use axum::{
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;
use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Catalog
        .route("/content", get(handlers::list_content))
        .route("/content/:id", get(handlers::get_content))
        .route("/genres", get(handlers::list_genres))
        // Users
        .route("/users", post(handlers::create_user))
        .route("/users/:id", get(handlers::get_user))
        .route("/users/:id/preferences", put(handlers::update_preferences))
        .route("/users/:id/history", get(handlers::user_history))
        .route("/users/:id/history/continue", get(handlers::continue_watching))
        .route("/users/:id/recommendations", get(handlers::user_recommendations))
        // Viewing history
        .route("/history", post(handlers::record_watch))
        .route("/history/:id", patch(handlers::update_watch))
        // Recommendations
        .route(
            "/recommendations/refresh/:user_id",
            post(handlers::refresh_recommendations),
        )
        .route(
            "/recommendations/similar/:content_id",
            get(handlers::similar_content),
        )
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
