//! Repository interfaces the services depend on
//!
//! Each trait covers one record kind. Services hold them as trait objects so
//! the storage behind them can be swapped: the JSON document store in
//! production, mocks in unit tests.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        CatalogItem, ContentId, Genre, Recommendation, Tastes, UserId, UserProfile, WatchRecord,
    },
};

pub mod json_store;

pub use json_store::{Document, JsonStore};

/// Read-only access to the content catalog
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// All catalog items, in catalog order
    async fn list_catalog(&self) -> AppResult<Vec<CatalogItem>>;

    async fn get_item(&self, id: &ContentId) -> AppResult<Option<CatalogItem>>;

    async fn list_genres(&self) -> AppResult<Vec<Genre>>;
}

/// Viewing history
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// All records for a user, in insertion order
    async fn list_history(&self, user_id: &UserId) -> AppResult<Vec<WatchRecord>>;

    async fn get_record(&self, id: Uuid) -> AppResult<Option<WatchRecord>>;

    /// Inserts the record, or replaces the stored record with the same id
    async fn save_record(&self, record: WatchRecord) -> AppResult<()>;
}

/// User profiles
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn get_profile(&self, user_id: &UserId) -> AppResult<Option<UserProfile>>;

    /// Adds a new profile
    ///
    /// Fails with `Conflict` when the id or the email is already taken.
    async fn create_profile(&self, profile: UserProfile) -> AppResult<()>;

    /// Overwrites genres, actors and directors on the stored profile
    ///
    /// Every other field keeps its stored value. Returns the updated profile,
    /// or `NotFound` for an unknown user.
    async fn set_tastes(&self, user_id: &UserId, tastes: Tastes) -> AppResult<UserProfile>;

    /// Overwrites only the watched list on the stored profile
    async fn set_watched_content(&self, user_id: &UserId, watched: Vec<ContentId>) -> AppResult<()>;
}

/// Generated recommendations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecommendationRepository: Send + Sync {
    async fn list_recommendations(&self, user_id: &UserId) -> AppResult<Vec<Recommendation>>;

    /// Discards every stored recommendation for the user and inserts `recommendations`
    ///
    /// Both halves happen as one step; the old set is dropped even when the
    /// new one is empty.
    async fn replace_recommendations(
        &self,
        user_id: &UserId,
        recommendations: Vec<Recommendation>,
    ) -> AppResult<()>;
}
