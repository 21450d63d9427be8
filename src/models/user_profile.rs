use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

use super::{ContentId, UserId, WatchRecord};

/// Declared tastes plus the list of items the user has finished
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Preferred genre ids
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub liked_actors: Vec<String>,
    #[serde(default)]
    pub liked_directors: Vec<String>,
    /// Completed items, rebuilt from watch history on every recommendation run
    #[serde(default)]
    pub watched_content: Vec<ContentId>,
}

/// The user-declared part of [`Preferences`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tastes {
    pub genres: Vec<String>,
    pub liked_actors: Vec<String>,
    pub liked_directors: Vec<String>,
}

impl Preferences {
    /// Replaces the declared tastes, leaving the watched list alone
    pub fn apply_tastes(&mut self, tastes: Tastes) {
        self.genres = tastes.genres;
        self.liked_actors = tastes.liked_actors;
        self.liked_directors = tastes.liked_directors;
    }
}

/// A user account as far as recommendations are concerned
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub preferences: Preferences,
    /// Fields owned by other layers (credentials and the like), kept as stored
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// Creates a profile with empty preferences
    pub fn new(id: impl Into<UserId>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            avatar: None,
            preferences: Preferences::default(),
            extra: Map::new(),
        }
    }

    /// Rebuilds `watched_content` from history
    ///
    /// Only completed records count, whatever their percentage. Duplicates
    /// collapse to the first occurrence, so history order is preserved.
    pub fn sync_watched(&mut self, history: &[WatchRecord]) {
        let mut seen = HashSet::new();
        self.preferences.watched_content = history
            .iter()
            .filter(|record| record.completed)
            .filter(|record| seen.insert(record.content_id.clone()))
            .map(|record| record.content_id.clone())
            .collect();
    }
}
