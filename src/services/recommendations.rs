use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::instrument;

use crate::{
    db::{ContentRepository, HistoryRepository, ProfileRepository, RecommendationRepository},
    error::{AppError, AppResult},
    models::{CatalogItem, ContentId, Preferences, Recommendation, UserId, UserProfile, WatchRecord},
    services::scoring::ScoreSource,
};

/// One rule contributing a bounded slice of a user's recommendations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Unwatched items sharing a genre with the user's preferred genres
    GenreAffinity,
    /// Related items of what the user already finished
    SimilarContent,
    /// Best-rated unwatched items, regardless of taste
    TopRated,
    /// Unwatched items featuring a liked actor or director
    PeopleAffinity,
}

impl Strategy {
    /// Order in which strategy output is concatenated
    pub const ALL: [Strategy; 4] = [
        Strategy::GenreAffinity,
        Strategy::SimilarContent,
        Strategy::TopRated,
        Strategy::PeopleAffinity,
    ];

    /// Maximum number of items a strategy may contribute
    pub fn limit(&self) -> usize {
        match self {
            Strategy::GenreAffinity | Strategy::SimilarContent | Strategy::TopRated => 3,
            Strategy::PeopleAffinity => 2,
        }
    }

    /// Inclusive score band the strategy draws from
    pub fn score_range(&self) -> (u8, u8) {
        match self {
            Strategy::GenreAffinity => (80, 99),
            Strategy::SimilarContent => (85, 99),
            Strategy::TopRated => (90, 99),
            Strategy::PeopleAffinity => (95, 99),
        }
    }
}

/// An item selected by a strategy, before it is scored
struct Pick<'a> {
    item: &'a CatalogItem,
    reason: String,
}

/// Builds a fresh recommendation list for `profile`
///
/// Rebuilds the profile's watched list from `history` first; only completed
/// records count. Every strategy then draws from the catalog minus that list,
/// and their output is concatenated in [`Strategy::ALL`] order. The same item
/// may appear once per strategy that picked it.
///
/// Selection is deterministic for fixed inputs; only the scores come from
/// `scores`.
pub fn generate(
    profile: &mut UserProfile,
    history: &[WatchRecord],
    catalog: &[CatalogItem],
    scores: &dyn ScoreSource,
    now: DateTime<Utc>,
) -> Vec<Recommendation> {
    profile.sync_watched(history);

    let consumed: HashSet<&ContentId> = profile.preferences.watched_content.iter().collect();
    let pool: Vec<&CatalogItem> = catalog
        .iter()
        .filter(|item| !consumed.contains(&item.id))
        .collect();

    let mut recommendations = Vec::new();

    for strategy in Strategy::ALL {
        let picks = match strategy {
            Strategy::GenreAffinity => genre_affinity(&profile.preferences, &pool),
            Strategy::SimilarContent => similar_content(catalog, &consumed, &pool),
            Strategy::TopRated => top_rated(&pool),
            Strategy::PeopleAffinity => people_affinity(&profile.preferences, &pool),
        };

        tracing::debug!(strategy = ?strategy, picked = picks.len(), "Strategy evaluated");

        let (low, high) = strategy.score_range();
        recommendations.extend(picks.into_iter().take(strategy.limit()).map(|pick| {
            Recommendation::new(
                profile.id.clone(),
                pick.item.id.clone(),
                scores.draw(low, high),
                pick.reason,
                now,
            )
        }));
    }

    recommendations
}

fn genre_affinity<'a>(preferences: &Preferences, pool: &[&'a CatalogItem]) -> Vec<Pick<'a>> {
    if preferences.genres.is_empty() {
        return Vec::new();
    }

    let wanted: HashSet<&str> = preferences.genres.iter().map(String::as_str).collect();

    pool.iter()
        .filter(|item| item.genres.iter().any(|g| wanted.contains(g.as_str())))
        .filter_map(|&item| {
            // The reason names the item's first listed genre, matched or not
            item.genres.first().map(|genre| Pick {
                item,
                reason: format!("Based on your interest in {}", genre),
            })
        })
        .take(Strategy::GenreAffinity.limit())
        .collect()
}

/// Union of the related-items lists of every finished item
///
/// Finished items are visited in catalog order and the reason always names
/// the first of them. Ids that are finished or missing from the catalog are
/// skipped without using up a slot.
fn similar_content<'a>(
    catalog: &'a [CatalogItem],
    consumed: &HashSet<&ContentId>,
    pool: &[&'a CatalogItem],
) -> Vec<Pick<'a>> {
    if consumed.is_empty() {
        return Vec::new();
    }

    let watched: Vec<&CatalogItem> = catalog
        .iter()
        .filter(|item| consumed.contains(&item.id))
        .collect();

    let Some(first_watched) = watched.first() else {
        return Vec::new();
    };

    let candidates: HashMap<&ContentId, &'a CatalogItem> =
        pool.iter().map(|&item| (&item.id, item)).collect();

    let mut seen: HashSet<&ContentId> = HashSet::new();
    let mut picks = Vec::new();

    for related in watched.iter().flat_map(|item| item.similar_content.iter()) {
        if picks.len() == Strategy::SimilarContent.limit() {
            break;
        }
        if consumed.contains(related) || !seen.insert(related) {
            continue;
        }
        if let Some(&item) = candidates.get(related) {
            picks.push(Pick {
                item,
                reason: format!("Because you watched {}", first_watched.title),
            });
        }
    }

    picks
}

fn top_rated<'a>(pool: &[&'a CatalogItem]) -> Vec<Pick<'a>> {
    let mut ranked = pool.to_vec();
    // sort_by is stable: equal ratings keep catalog order
    ranked.sort_by(|a, b| b.rating.total_cmp(&a.rating));

    ranked
        .into_iter()
        .take(Strategy::TopRated.limit())
        .map(|item| Pick {
            item,
            reason: format!("Highly rated {}", item.content_type.as_str()),
        })
        .collect()
}

fn people_affinity<'a>(preferences: &Preferences, pool: &[&'a CatalogItem]) -> Vec<Pick<'a>> {
    let actors: HashSet<&str> = preferences.liked_actors.iter().map(String::as_str).collect();
    let directors: HashSet<&str> = preferences.liked_directors.iter().map(String::as_str).collect();

    if actors.is_empty() && directors.is_empty() {
        return Vec::new();
    }

    pool.iter()
        .filter_map(|&item| {
            let reason = if let Some(actor) = item.cast.iter().find(|a| actors.contains(a.as_str())) {
                format!("Featuring {}", actor)
            } else if let Some(director) =
                item.directors.iter().find(|d| directors.contains(d.as_str()))
            {
                format!("Directed by {}", director)
            } else {
                return None;
            };
            Some(Pick { item, reason })
        })
        .take(Strategy::PeopleAffinity.limit())
        .collect()
}

/// Per-user async locks
///
/// Entries nobody holds are dropped on the next acquisition.
#[derive(Default)]
struct UserLocks {
    locks: Mutex<HashMap<UserId, Arc<tokio::sync::Mutex<()>>>>,
}

impl UserLocks {
    fn acquire(&self, user_id: &UserId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks.entry(user_id.clone()).or_default().clone()
    }
}

/// Runs the generator against the repositories
///
/// Refreshes for the same user are serialized so one run's replace cannot
/// interleave with another's; different users proceed concurrently.
pub struct Recommender {
    content: Arc<dyn ContentRepository>,
    history: Arc<dyn HistoryRepository>,
    profiles: Arc<dyn ProfileRepository>,
    recommendations: Arc<dyn RecommendationRepository>,
    scores: Arc<dyn ScoreSource>,
    user_locks: UserLocks,
}

impl Recommender {
    pub fn new(
        content: Arc<dyn ContentRepository>,
        history: Arc<dyn HistoryRepository>,
        profiles: Arc<dyn ProfileRepository>,
        recommendations: Arc<dyn RecommendationRepository>,
        scores: Arc<dyn ScoreSource>,
    ) -> Self {
        Self {
            content,
            history,
            profiles,
            recommendations,
            scores,
            user_locks: UserLocks::default(),
        }
    }

    /// Regenerates and stores the user's recommendations
    ///
    /// Fails with [`AppError::NotFound`] for an unknown user. If any input
    /// fails to load nothing is written. Otherwise the resynchronized watched
    /// list is written onto the stored profile, leaving its other fields as
    /// they are by then, and the user's previous recommendations are
    /// replaced, even when the new list is empty.
    ///
    /// The two writes happen in that order. If the replace fails, the stored
    /// watched list is already current while the old recommendations remain;
    /// the watched list is a pure function of history, so the next refresh
    /// writes the same value again.
    #[instrument(skip_all, fields(user_id = %user_id))]
    pub async fn refresh(&self, user_id: &UserId) -> AppResult<Vec<Recommendation>> {
        let lock = self.user_locks.acquire(user_id);
        let _guard = lock.lock().await;

        let mut profile = self
            .profiles
            .get_profile(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
        let history = self.history.list_history(user_id).await?;
        let catalog = self.content.list_catalog().await?;

        let start = Instant::now();
        let recommendations = generate(
            &mut profile,
            &history,
            &catalog,
            self.scores.as_ref(),
            Utc::now(),
        );

        tracing::info!(
            history = history.len(),
            catalog = catalog.len(),
            watched = profile.preferences.watched_content.len(),
            generated = recommendations.len(),
            elapsed = ?start.elapsed(),
            "Recommendations generated"
        );

        self.profiles
            .set_watched_content(user_id, profile.preferences.watched_content)
            .await?;
        self.recommendations
            .replace_recommendations(user_id, recommendations.clone())
            .await?;

        Ok(recommendations)
    }

    /// Stored recommendations for an existing user
    pub async fn list(&self, user_id: &UserId) -> AppResult<Vec<Recommendation>> {
        if self.profiles.get_profile(user_id).await?.is_none() {
            return Err(AppError::NotFound(format!("User {} not found", user_id)));
        }
        self.recommendations.list_recommendations(user_id).await
    }
}
