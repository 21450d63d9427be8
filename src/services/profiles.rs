use serde::Deserialize;
use uuid::Uuid;

use crate::{
    db::ProfileRepository,
    error::{AppError, AppResult},
    models::{Tastes, UserId, UserProfile},
};

/// Replacement for a user's declared tastes
///
/// The watched list is not part of it: that is rebuilt from history.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesUpdate {
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub liked_actors: Vec<String>,
    #[serde(default)]
    pub liked_directors: Vec<String>,
}

/// Details for a new account
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProfile {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

fn default_avatar(email: &str) -> String {
    format!("https://i.pravatar.cc/150?u={}", email)
}

/// Creates an account with a fresh id and empty preferences
///
/// Name and email are required; the email must not be registered yet.
pub async fn create_profile(
    profiles: &dyn ProfileRepository,
    new: NewProfile,
) -> AppResult<UserProfile> {
    let name = new.name.trim();
    let email = new.email.trim();
    if name.is_empty() || email.is_empty() {
        return Err(AppError::InvalidInput(
            "name and email are required".to_string(),
        ));
    }

    let mut profile = UserProfile::new(Uuid::new_v4().to_string(), name, email);
    profile.avatar = Some(
        new.avatar
            .filter(|avatar| !avatar.trim().is_empty())
            .unwrap_or_else(|| default_avatar(email)),
    );

    profiles.create_profile(profile.clone()).await?;

    tracing::info!(user_id = %profile.id, "Profile created");

    Ok(profile)
}

pub async fn get_profile(profiles: &dyn ProfileRepository, user_id: &UserId) -> AppResult<UserProfile> {
    profiles
        .get_profile(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
}

/// Overwrites genres, actors and directors, dropping blanks and repeats
///
/// Applied to the profile as currently stored, so the watched list written
/// by a concurrent recommendation refresh is kept.
pub async fn update_preferences(
    profiles: &dyn ProfileRepository,
    user_id: &UserId,
    update: PreferencesUpdate,
) -> AppResult<UserProfile> {
    let tastes = Tastes {
        genres: normalize(update.genres),
        liked_actors: normalize(update.liked_actors),
        liked_directors: normalize(update.liked_directors),
    };

    let profile = profiles.set_tastes(user_id, tastes).await?;

    tracing::info!(
        user_id = %user_id,
        genres = profile.preferences.genres.len(),
        actors = profile.preferences.liked_actors.len(),
        directors = profile.preferences.liked_directors.len(),
        "Preferences updated"
    );

    Ok(profile)
}

fn normalize(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let value = value.trim();
        if !value.is_empty() && !out.iter().any(|v| v == value) {
            out.push(value.to_string());
        }
    }
    out
}
