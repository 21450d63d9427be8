use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ContentId, UserId};

/// One viewing of a catalog item by a user
///
/// Nothing enforces a single record per (user, content) pair, so readers must
/// tolerate duplicates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchRecord {
    pub id: Uuid,
    pub user_id: UserId,
    pub content_id: ContentId,
    pub watched_at: DateTime<Utc>,
    /// 0 to 100
    pub watched_percentage: u8,
    pub completed: bool,
}

impl WatchRecord {
    pub fn new(
        user_id: UserId,
        content_id: ContentId,
        watched_percentage: u8,
        completed: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            content_id,
            watched_at: Utc::now(),
            watched_percentage,
            completed,
        }
    }

    /// Started but not finished, and not close enough to the end to count as done
    pub fn is_in_progress(&self) -> bool {
        !self.completed && self.watched_percentage > 0 && self.watched_percentage < 95
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(percentage: u8, completed: bool) -> WatchRecord {
        WatchRecord::new(UserId::from("u1"), ContentId::from("c1"), percentage, completed)
    }

    #[test]
    fn test_in_progress() {
        assert!(record(45, false).is_in_progress());
        assert!(!record(0, false).is_in_progress());
        assert!(!record(95, false).is_in_progress());
        assert!(!record(45, true).is_in_progress());
    }

    #[test]
    fn test_serde_field_names() {
        let value = serde_json::to_value(record(100, true)).unwrap();
        assert_eq!(value["userId"], "u1");
        assert_eq!(value["contentId"], "c1");
        assert_eq!(value["watchedPercentage"], 100);
        assert_eq!(value["completed"], true);
        assert!(value["watchedAt"].is_string());
    }
}
