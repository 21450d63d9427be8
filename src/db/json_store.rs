use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ContentRepository, HistoryRepository, ProfileRepository, RecommendationRepository};
use crate::{
    error::{AppError, AppResult},
    models::{
        CatalogItem, ContentId, Genre, Recommendation, Tastes, UserId, UserProfile, WatchRecord,
    },
};

/// The whole datastore: one JSON document holding every collection
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Document {
    #[serde(default)]
    pub users: Vec<UserProfile>,
    #[serde(default)]
    pub content: Vec<CatalogItem>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub history: Vec<WatchRecord>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
}

/// Repository backed by a single JSON document
///
/// Reads are served from memory. Every mutation is applied to a copy of the
/// document, written to disk in full, and only then made visible, so the file
/// and memory never disagree. Cheap to clone.
#[derive(Clone)]
pub struct JsonStore {
    document: Arc<RwLock<Document>>,
    path: Option<Arc<PathBuf>>,
}

impl JsonStore {
    /// Opens the document at `path`, creating an empty one if the file does not exist
    pub async fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();

        let document = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let document: Document = serde_json::from_slice(&bytes)?;
                tracing::info!(
                    path = %path.display(),
                    users = document.users.len(),
                    content = document.content.len(),
                    history = document.history.len(),
                    "Loaded datastore"
                );
                document
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Datastore missing, starting empty");
                let document = Document::default();
                write_document(&path, &document).await?;
                document
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            document: Arc::new(RwLock::new(document)),
            path: Some(Arc::new(path)),
        })
    }

    /// Creates a store that never touches the filesystem
    pub fn in_memory(document: Document) -> Self {
        Self {
            document: Arc::new(RwLock::new(document)),
            path: None,
        }
    }

    /// Copy of the current document
    pub async fn snapshot(&self) -> Document {
        self.document.read().await.clone()
    }

    /// Fills an empty store from the document at `path`
    ///
    /// A store that already holds a user or a catalog item is left alone and
    /// the seed file is not read. Returns whether the seed was loaded.
    pub async fn seed_if_empty(&self, path: &Path) -> AppResult<bool> {
        if !self.document.read().await.is_empty() {
            tracing::debug!(path = %path.display(), "Datastore populated, seed skipped");
            return Ok(false);
        }

        let bytes = tokio::fs::read(path).await?;
        let seed: Document = serde_json::from_slice(&bytes)?;
        let (users, content) = (seed.users.len(), seed.content.len());

        let seeded = self
            .mutate(|document| {
                if !document.is_empty() {
                    return Ok(false);
                }
                *document = seed;
                Ok(true)
            })
            .await?;

        if seeded {
            tracing::info!(path = %path.display(), users, content, "Datastore seeded");
        }
        Ok(seeded)
    }

    /// Applies `change` and persists the result
    ///
    /// The write lock is held through the file write, so mutations reach the
    /// disk in the order they were applied. When `change` fails nothing is
    /// written and the document stays as it was.
    async fn mutate<F, T>(&self, change: F) -> AppResult<T>
    where
        F: FnOnce(&mut Document) -> AppResult<T>,
    {
        let mut guard = self.document.write().await;
        let mut next = guard.clone();
        let output = change(&mut next)?;

        if let Some(path) = &self.path {
            write_document(path, &next).await?;
        }

        *guard = next;
        Ok(output)
    }
}

impl Document {
    fn is_empty(&self) -> bool {
        self.users.is_empty() && self.content.is_empty()
    }

    fn profile_mut(&mut self, user_id: &UserId) -> AppResult<&mut UserProfile> {
        self.users
            .iter_mut()
            .find(|user| &user.id == user_id)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
    }
}

/// Rewrites the whole file through a temporary sibling and a rename
async fn write_document(path: &Path, document: &Document) -> AppResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let json = serde_json::to_vec_pretty(document)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, json).await?;
    tokio::fs::rename(&tmp, path).await?;

    tracing::debug!(path = %path.display(), "Datastore written");
    Ok(())
}

#[async_trait]
impl ContentRepository for JsonStore {
    async fn list_catalog(&self) -> AppResult<Vec<CatalogItem>> {
        Ok(self.document.read().await.content.clone())
    }

    async fn get_item(&self, id: &ContentId) -> AppResult<Option<CatalogItem>> {
        let document = self.document.read().await;
        Ok(document.content.iter().find(|item| &item.id == id).cloned())
    }

    async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        Ok(self.document.read().await.genres.clone())
    }
}

#[async_trait]
impl HistoryRepository for JsonStore {
    async fn list_history(&self, user_id: &UserId) -> AppResult<Vec<WatchRecord>> {
        let document = self.document.read().await;
        Ok(document
            .history
            .iter()
            .filter(|record| &record.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_record(&self, id: Uuid) -> AppResult<Option<WatchRecord>> {
        let document = self.document.read().await;
        Ok(document.history.iter().find(|record| record.id == id).cloned())
    }

    async fn save_record(&self, record: WatchRecord) -> AppResult<()> {
        self.mutate(|document| {
            match document.history.iter_mut().find(|r| r.id == record.id) {
                Some(existing) => *existing = record,
                None => document.history.push(record),
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl ProfileRepository for JsonStore {
    async fn get_profile(&self, user_id: &UserId) -> AppResult<Option<UserProfile>> {
        let document = self.document.read().await;
        Ok(document.users.iter().find(|user| &user.id == user_id).cloned())
    }

    async fn create_profile(&self, profile: UserProfile) -> AppResult<()> {
        self.mutate(|document| {
            if document.users.iter().any(|u| u.id == profile.id) {
                return Err(AppError::Conflict(format!("User {} already exists", profile.id)));
            }
            if document
                .users
                .iter()
                .any(|u| u.email.eq_ignore_ascii_case(&profile.email))
            {
                return Err(AppError::Conflict(format!(
                    "Email {} is already registered",
                    profile.email
                )));
            }
            document.users.push(profile);
            Ok(())
        })
        .await
    }

    async fn set_tastes(&self, user_id: &UserId, tastes: Tastes) -> AppResult<UserProfile> {
        self.mutate(|document| {
            let profile = document.profile_mut(user_id)?;
            profile.preferences.apply_tastes(tastes);
            Ok(profile.clone())
        })
        .await
    }

    async fn set_watched_content(&self, user_id: &UserId, watched: Vec<ContentId>) -> AppResult<()> {
        self.mutate(|document| {
            document.profile_mut(user_id)?.preferences.watched_content = watched;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl RecommendationRepository for JsonStore {
    async fn list_recommendations(&self, user_id: &UserId) -> AppResult<Vec<Recommendation>> {
        let document = self.document.read().await;
        Ok(document
            .recommendations
            .iter()
            .filter(|rec| &rec.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn replace_recommendations(
        &self,
        user_id: &UserId,
        recommendations: Vec<Recommendation>,
    ) -> AppResult<()> {
        self.mutate(|document| {
            document.recommendations.retain(|rec| &rec.user_id != user_id);
            document.recommendations.extend(recommendations);
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContentType;
    use chrono::Utc;
    use tokio_test::assert_ok;

    fn recommendation(user: &str, content: &str) -> Recommendation {
        Recommendation::new(
            UserId::from(user),
            ContentId::from(content),
            90,
            "Highly rated movie".to_string(),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_open_missing_file_creates_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("db.json");

        let store = assert_ok!(JsonStore::open(&path).await);

        assert_eq!(store.snapshot().await, Document::default());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_mutations_are_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");

        let store = JsonStore::open(&path).await.unwrap();
        store
            .create_profile(UserProfile::new("u1", "Demo User", "demo@example.com"))
            .await
            .unwrap();
        store
            .save_record(WatchRecord::new(UserId::from("u1"), ContentId::from("c1"), 100, true))
            .await
            .unwrap();

        let reopened = JsonStore::open(&path).await.unwrap();
        let profile = reopened.get_profile(&UserId::from("u1")).await.unwrap();
        assert_eq!(profile.unwrap().name, "Demo User");
        assert_eq!(reopened.list_history(&UserId::from("u1")).await.unwrap().len(), 1);
        assert!(!dir.path().join("db.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_open_rejects_malformed_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(JsonStore::open(&path).await.is_err());
    }

    #[tokio::test]
    async fn test_save_record_replaces_by_id() {
        let store = JsonStore::in_memory(Document::default());
        let mut record = WatchRecord::new(UserId::from("u1"), ContentId::from("c1"), 40, false);
        store.save_record(record.clone()).await.unwrap();

        record.watched_percentage = 100;
        record.completed = true;
        store.save_record(record.clone()).await.unwrap();

        let history = store.list_history(&UserId::from("u1")).await.unwrap();
        assert_eq!(history, vec![record]);
    }

    #[tokio::test]
    async fn test_replace_recommendations_only_touches_one_user() {
        let store = JsonStore::in_memory(Document {
            recommendations: vec![
                recommendation("u1", "c1"),
                recommendation("u2", "c2"),
                recommendation("u1", "c3"),
            ],
            ..Document::default()
        });

        store
            .replace_recommendations(&UserId::from("u1"), vec![recommendation("u1", "c4")])
            .await
            .unwrap();

        let mine = store.list_recommendations(&UserId::from("u1")).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].content_id, ContentId::from("c4"));

        let theirs = store.list_recommendations(&UserId::from("u2")).await.unwrap();
        assert_eq!(theirs.len(), 1);
    }

    #[tokio::test]
    async fn test_replace_with_empty_list_clears_user() {
        let store = JsonStore::in_memory(Document {
            recommendations: vec![recommendation("u1", "c1")],
            ..Document::default()
        });

        store.replace_recommendations(&UserId::from("u1"), vec![]).await.unwrap();

        assert!(store.list_recommendations(&UserId::from("u1")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_catalog_lookup() {
        let store = JsonStore::in_memory(Document {
            content: vec![
                CatalogItem::new("c1", "Cosmic Odyssey", ContentType::Movie),
                CatalogItem::new("c2", "Tides", ContentType::Series),
            ],
            ..Document::default()
        });

        let item = store.get_item(&ContentId::from("c2")).await.unwrap();
        assert_eq!(item.unwrap().title, "Tides");
        assert!(store.get_item(&ContentId::from("missing")).await.unwrap().is_none());
        assert_eq!(store.list_catalog().await.unwrap().len(), 2);
    }

    fn demo_profile() -> UserProfile {
        let mut profile = UserProfile::new("u1", "Demo User", "demo@example.com");
        profile.preferences.genres = vec!["drama".to_string()];
        profile.preferences.watched_content = vec![ContentId::from("c1")];
        profile
            .extra
            .insert("password".to_string(), serde_json::json!("$2a$10$hash"));
        profile
    }

    #[tokio::test]
    async fn test_create_profile_rejects_taken_id_and_email() {
        let store = JsonStore::in_memory(Document::default());
        store.create_profile(demo_profile()).await.unwrap();

        let same_id = store
            .create_profile(UserProfile::new("u1", "Other", "other@example.com"))
            .await;
        assert!(matches!(same_id, Err(AppError::Conflict(_))));

        let same_email = store
            .create_profile(UserProfile::new("u2", "Other", "DEMO@example.com"))
            .await;
        assert!(matches!(same_email, Err(AppError::Conflict(_))));

        assert_eq!(store.snapshot().await.users.len(), 1);
    }

    #[tokio::test]
    async fn test_set_tastes_leaves_other_fields() {
        let store = JsonStore::in_memory(Document {
            users: vec![demo_profile()],
            ..Document::default()
        });

        let updated = store
            .set_tastes(
                &UserId::from("u1"),
                Tastes {
                    genres: vec!["scifi".to_string()],
                    ..Tastes::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.preferences.genres, vec!["scifi".to_string()]);
        let stored = store.get_profile(&UserId::from("u1")).await.unwrap().unwrap();
        assert_eq!(stored, updated);
        assert_eq!(stored.preferences.watched_content, vec![ContentId::from("c1")]);
        assert_eq!(stored.extra["password"], "$2a$10$hash");
    }

    #[tokio::test]
    async fn test_set_watched_content_leaves_tastes() {
        let store = JsonStore::in_memory(Document {
            users: vec![demo_profile()],
            ..Document::default()
        });

        store
            .set_watched_content(&UserId::from("u1"), vec![ContentId::from("c7")])
            .await
            .unwrap();

        let stored = store.get_profile(&UserId::from("u1")).await.unwrap().unwrap();
        assert_eq!(stored.preferences.watched_content, vec![ContentId::from("c7")]);
        assert_eq!(stored.preferences.genres, vec!["drama".to_string()]);

        let missing = store
            .set_watched_content(&UserId::from("ghost"), vec![])
            .await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_failed_change_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let store = JsonStore::open(&path).await.unwrap();
        let before = std::fs::read(&path).unwrap();

        let result = store
            .set_tastes(&UserId::from("ghost"), Tastes::default())
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn test_seed_fills_empty_store_once() {
        let dir = tempfile::tempdir().unwrap();
        let seed_path = dir.path().join("seed.json");
        let seed = Document {
            users: vec![demo_profile()],
            content: vec![CatalogItem::new("c1", "Cosmic Odyssey", ContentType::Movie)],
            ..Document::default()
        };
        std::fs::write(&seed_path, serde_json::to_vec(&seed).unwrap()).unwrap();

        let store = JsonStore::open(dir.path().join("db.json")).await.unwrap();
        assert!(store.seed_if_empty(&seed_path).await.unwrap());
        assert_eq!(store.snapshot().await, seed);

        let reopened = JsonStore::open(dir.path().join("db.json")).await.unwrap();
        assert_eq!(reopened.snapshot().await, seed);

        // a populated store never reads the seed again
        std::fs::remove_file(&seed_path).unwrap();
        assert!(!assert_ok!(reopened.seed_if_empty(&seed_path).await));
    }

    #[tokio::test]
    async fn test_seed_missing_file_is_an_error() {
        let store = JsonStore::in_memory(Document::default());
        let result = store.seed_if_empty(Path::new("/nonexistent/seed.json")).await;
        assert!(matches!(result, Err(AppError::Storage(_))));
    }
}
