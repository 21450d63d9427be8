use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod catalog_item;
pub mod recommendation;
pub mod user_profile;
pub mod watch_record;

pub use catalog_item::{CatalogItem, ContentType, Genre};
pub use recommendation::Recommendation;
pub use user_profile::{Preferences, Tastes, UserProfile};
pub use watch_record::WatchRecord;

/// Identifier for a catalog item (movie or series)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(pub String);

/// Identifier for a user account
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl Display for ContentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ContentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ContentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_id_display() {
        let id = ContentId::from("a1b2");
        assert_eq!(format!("{}", id), "a1b2");
    }

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let json = serde_json::to_string(&UserId::from("user-1")).unwrap();
        assert_eq!(json, r#""user-1""#);

        let id: ContentId = serde_json::from_str(r#""c-9""#).unwrap();
        assert_eq!(id, ContentId::from("c-9"));
    }
}
