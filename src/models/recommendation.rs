use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ContentId, UserId};

/// A suggested item for a user, with a confidence score and a reason to show
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: Uuid,
    pub user_id: UserId,
    pub content_id: ContentId,
    /// Confidence, 0 to 100
    pub score: u8,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl Recommendation {
    pub fn new(
        user_id: UserId,
        content_id: ContentId,
        score: u8,
        reason: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            content_id,
            score,
            reason,
            created_at,
        }
    }
}
