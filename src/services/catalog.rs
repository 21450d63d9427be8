use serde::Deserialize;

use crate::{
    db::ContentRepository,
    error::{AppError, AppResult},
    models::{CatalogItem, ContentId},
};

/// Filters for browsing the catalog
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CatalogQuery {
    /// Genre id the item must be tagged with
    pub genre: Option<String>,
    /// Free text matched against titles, descriptions, genres and people
    pub q: Option<String>,
}

impl CatalogQuery {
    fn matches(&self, item: &CatalogItem, needle: Option<&str>) -> bool {
        if let Some(genre) = &self.genre {
            if !item.has_genre(genre) {
                return false;
            }
        }

        let Some(needle) = needle else {
            return true;
        };

        let contains = |text: &str| text.to_lowercase().contains(needle);
        contains(item.title.as_str())
            || contains(item.description.as_str())
            || item.genres.iter().any(|g| contains(g.as_str()))
            || item.cast.iter().any(|c| contains(c.as_str()))
            || item.directors.iter().any(|d| contains(d.as_str()))
    }
}

/// Lists catalog items matching `query`, in catalog order
///
/// A blank search string is treated as no search at all.
pub async fn browse(
    content: &dyn ContentRepository,
    query: &CatalogQuery,
) -> AppResult<Vec<CatalogItem>> {
    let needle = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase);

    let items: Vec<CatalogItem> = content
        .list_catalog()
        .await?
        .into_iter()
        .filter(|item| query.matches(item, needle.as_deref()))
        .collect();

    tracing::debug!(
        genre = ?query.genre,
        q = ?needle,
        results = items.len(),
        "Catalog browsed"
    );

    Ok(items)
}

pub async fn get_item(content: &dyn ContentRepository, id: &ContentId) -> AppResult<CatalogItem> {
    content
        .get_item(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Content {} not found", id)))
}

/// Resolves an item's related-items list against the catalog
///
/// Keeps the stored order and drops ids that no longer resolve.
pub async fn similar_items(
    content: &dyn ContentRepository,
    id: &ContentId,
) -> AppResult<Vec<CatalogItem>> {
    let catalog = content.list_catalog().await?;

    let item = catalog
        .iter()
        .find(|item| &item.id == id)
        .ok_or_else(|| AppError::NotFound(format!("Content {} not found", id)))?;

    Ok(item
        .similar_content
        .iter()
        .filter_map(|related| catalog.iter().find(|candidate| &candidate.id == related))
        .cloned()
        .collect())
}
