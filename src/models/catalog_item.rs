use serde::{Deserialize, Serialize};

use super::ContentId;

/// Kind of catalog entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Movie,
    Series,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Movie => "movie",
            ContentType::Series => "series",
        }
    }
}

/// A watchable movie or series in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: ContentId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub release_year: i32,
    /// Genre ids, in the order the catalog lists them
    pub genres: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop: Option<String>,
    /// Conventionally on a 0-10 scale
    pub rating: f64,
    /// Minutes for movies, number of seasons for series
    pub duration: u32,
    #[serde(default)]
    pub cast: Vec<String>,
    #[serde(default)]
    pub directors: Vec<String>,
    /// Precomputed related items
    #[serde(default)]
    pub similar_content: Vec<ContentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailer_url: Option<String>,
}

impl CatalogItem {
    /// Creates a catalog item with no people, genres or related items attached
    pub fn new(id: impl Into<ContentId>, title: impl Into<String>, content_type: ContentType) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            content_type,
            release_year: 0,
            genres: Vec::new(),
            poster: None,
            backdrop: None,
            rating: 0.0,
            duration: 0,
            cast: Vec::new(),
            directors: Vec::new(),
            similar_content: Vec::new(),
            trailer_url: None,
        }
    }

    pub fn with_genres(mut self, genres: &[&str]) -> Self {
        self.genres = genres.iter().map(|g| g.to_string()).collect();
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    pub fn with_cast(mut self, cast: &[&str]) -> Self {
        self.cast = cast.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_directors(mut self, directors: &[&str]) -> Self {
        self.directors = directors.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn with_similar(mut self, similar: &[&str]) -> Self {
        self.similar_content = similar.iter().map(|&id| ContentId::from(id)).collect();
        self
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g == genre)
    }
}

/// Reference data for a genre tag
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Genre {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_serialization() {
        assert_eq!(serde_json::to_string(&ContentType::Movie).unwrap(), "\"movie\"");
        assert_eq!(serde_json::to_string(&ContentType::Series).unwrap(), "\"series\"");
    }

    #[test]
    fn test_deserialize_stored_item() {
        let json = r#"{
            "id": "c1",
            "title": "Cosmic Odyssey",
            "description": "A journey through space.",
            "type": "movie",
            "releaseYear": 2023,
            "genres": ["scifi", "drama"],
            "poster": "https://example.com/p.jpg",
            "rating": 9.2,
            "duration": 143,
            "cast": ["Emma Rodriguez"],
            "directors": ["Christopher Lee"],
            "similarContent": ["c2", "c3"]
        }"#;

        let item: CatalogItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, ContentId::from("c1"));
        assert_eq!(item.content_type, ContentType::Movie);
        assert_eq!(item.release_year, 2023);
        assert_eq!(item.similar_content, vec![ContentId::from("c2"), ContentId::from("c3")]);
        assert_eq!(item.backdrop, None);
        assert!(item.has_genre("drama"));
        assert!(!item.has_genre("horror"));
    }

    #[test]
    fn test_serialize_uses_camel_case() {
        let item = CatalogItem::new("c1", "Tides", ContentType::Series).with_similar(&["c2"]);
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["type"], "series");
        assert_eq!(value["similarContent"][0], "c2");
        assert!(value.get("trailerUrl").is_none());
    }
}
