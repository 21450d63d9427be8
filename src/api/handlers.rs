use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::request_id::RequestId;
use crate::models::{
    CatalogItem, ContentId, Genre, Preferences, Recommendation, UserId, UserProfile, WatchRecord,
};
use crate::services::catalog::{self, CatalogQuery};
use crate::services::history::WatchUpdate;
use crate::services::profiles::{self, NewProfile, PreferencesUpdate};

use super::AppState;

// Request/Response types

/// Public view of a profile; fields owned by other layers stay private
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub preferences: Preferences,
}

impl From<UserProfile> for ProfileResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            name: profile.name,
            email: profile.email,
            avatar: profile.avatar,
            preferences: profile.preferences,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordWatchRequest {
    pub user_id: UserId,
    pub content_id: ContentId,
    pub watched_percentage: u8,
    #[serde(default)]
    pub completed: bool,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Browse the catalog, optionally by genre and search text
pub async fn list_content(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> AppResult<Json<Vec<CatalogItem>>> {
    let items = catalog::browse(state.content.as_ref(), &query).await?;
    Ok(Json(items))
}

pub async fn get_content(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<CatalogItem>> {
    let item = catalog::get_item(state.content.as_ref(), &ContentId::from(id)).await?;
    Ok(Json(item))
}

pub async fn list_genres(State(state): State<AppState>) -> AppResult<Json<Vec<Genre>>> {
    Ok(Json(state.content.list_genres().await?))
}

/// Items related to a catalog entry
pub async fn similar_content(
    State(state): State<AppState>,
    Path(content_id): Path<String>,
) -> AppResult<Json<Vec<CatalogItem>>> {
    let items = catalog::similar_items(state.content.as_ref(), &ContentId::from(content_id)).await?;
    Ok(Json(items))
}

/// Create an account with empty preferences
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<NewProfile>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ProfileResponse>)> {
    let Json(new) = payload?;
    let profile = profiles::create_profile(state.profiles.as_ref(), new).await?;
    Ok((StatusCode::CREATED, Json(profile.into())))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ProfileResponse>> {
    let profile = profiles::get_profile(state.profiles.as_ref(), &UserId::from(id)).await?;
    Ok(Json(profile.into()))
}

/// Replace a user's preferred genres, actors and directors
pub async fn update_preferences(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<PreferencesUpdate>, JsonRejection>,
) -> AppResult<Json<ProfileResponse>> {
    let Json(update) = payload?;
    let profile =
        profiles::update_preferences(state.profiles.as_ref(), &UserId::from(id), update).await?;
    Ok(Json(profile.into()))
}

pub async fn user_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<WatchRecord>>> {
    Ok(Json(state.history.list(&UserId::from(id)).await?))
}

pub async fn continue_watching(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<WatchRecord>>> {
    Ok(Json(state.history.continue_watching(&UserId::from(id)).await?))
}

/// Record a viewing
pub async fn record_watch(
    State(state): State<AppState>,
    payload: Result<Json<RecordWatchRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<WatchRecord>)> {
    let Json(request) = payload?;
    let record = state
        .history
        .record_watch(
            request.user_id,
            request.content_id,
            request.watched_percentage,
            request.completed,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update_watch(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<WatchUpdate>, JsonRejection>,
) -> AppResult<Json<WatchRecord>> {
    let Json(update) = payload?;
    Ok(Json(state.history.update_watch(id, update).await?))
}

/// Stored recommendations from the last refresh
pub async fn user_recommendations(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Recommendation>>> {
    Ok(Json(state.recommender.list(&UserId::from(id)).await?))
}

/// Regenerate a user's recommendations
pub async fn refresh_recommendations(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Vec<Recommendation>>> {
    tracing::info!(
        request_id = %request_id,
        user_id = %user_id,
        "Processing recommendation refresh"
    );

    let recommendations = state.recommender.refresh(&UserId::from(user_id)).await?;

    tracing::info!(
        request_id = %request_id,
        count = recommendations.len(),
        "Recommendation refresh completed"
    );

    Ok(Json(recommendations))
}
