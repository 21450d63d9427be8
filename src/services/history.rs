use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::{ContentRepository, HistoryRepository, ProfileRepository},
    error::{AppError, AppResult},
    models::{ContentId, UserId, WatchRecord},
};

/// How many in-progress items the continue-watching row shows
pub const CONTINUE_WATCHING_LIMIT: usize = 6;

/// Partial update of a watch record
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchUpdate {
    pub watched_percentage: Option<u8>,
    pub completed: Option<bool>,
}

/// Records and queries what users have watched
pub struct WatchHistory {
    history: Arc<dyn HistoryRepository>,
    profiles: Arc<dyn ProfileRepository>,
    content: Arc<dyn ContentRepository>,
}

fn check_percentage(percentage: u8) -> AppResult<()> {
    if percentage > 100 {
        return Err(AppError::InvalidInput(format!(
            "watchedPercentage must be between 0 and 100, got {}",
            percentage
        )));
    }
    Ok(())
}

impl WatchHistory {
    pub fn new(
        history: Arc<dyn HistoryRepository>,
        profiles: Arc<dyn ProfileRepository>,
        content: Arc<dyn ContentRepository>,
    ) -> Self {
        Self {
            history,
            profiles,
            content,
        }
    }

    async fn ensure_user(&self, user_id: &UserId) -> AppResult<()> {
        match self.profiles.get_profile(user_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound(format!("User {} not found", user_id))),
        }
    }

    /// All records for an existing user, in the order they were recorded
    pub async fn list(&self, user_id: &UserId) -> AppResult<Vec<WatchRecord>> {
        self.ensure_user(user_id).await?;
        self.history.list_history(user_id).await
    }

    /// Stores a new viewing, stamped with the current time
    pub async fn record_watch(
        &self,
        user_id: UserId,
        content_id: ContentId,
        watched_percentage: u8,
        completed: bool,
    ) -> AppResult<WatchRecord> {
        check_percentage(watched_percentage)?;
        self.ensure_user(&user_id).await?;

        if self.content.get_item(&content_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Content {} not found", content_id)));
        }

        let record = WatchRecord::new(user_id, content_id, watched_percentage, completed);
        self.history.save_record(record.clone()).await?;

        tracing::info!(
            record_id = %record.id,
            user_id = %record.user_id,
            content_id = %record.content_id,
            watched_percentage,
            completed,
            "Watch recorded"
        );

        Ok(record)
    }

    /// Applies `update` to an existing record and re-stamps its time
    pub async fn update_watch(&self, id: Uuid, update: WatchUpdate) -> AppResult<WatchRecord> {
        if let Some(percentage) = update.watched_percentage {
            check_percentage(percentage)?;
        }

        let mut record = self
            .history
            .get_record(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Watch record {} not found", id)))?;

        if let Some(percentage) = update.watched_percentage {
            record.watched_percentage = percentage;
        }
        if let Some(completed) = update.completed {
            record.completed = completed;
        }
        record.watched_at = Utc::now();

        self.history.save_record(record.clone()).await?;

        tracing::debug!(record_id = %id, "Watch record updated");

        Ok(record)
    }

    /// Unfinished items, most recently watched first
    pub async fn continue_watching(&self, user_id: &UserId) -> AppResult<Vec<WatchRecord>> {
        let mut records: Vec<WatchRecord> = self
            .list(user_id)
            .await?
            .into_iter()
            .filter(WatchRecord::is_in_progress)
            .collect();

        records.sort_by(|a, b| b.watched_at.cmp(&a.watched_at));
        records.truncate(CONTINUE_WATCHING_LIMIT);

        Ok(records)
    }
}
