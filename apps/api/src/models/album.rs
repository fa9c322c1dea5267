use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Album {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub creator: String,
    pub images: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// List projection of an album.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlbumItem {
    pub id: Uuid,
    pub title: String,
    pub creator: String,
}

#[derive(Debug, Clone, Default)]
pub struct AlbumFilter {
    pub creator_id: Option<String>,
    /// Inclusive upper bound on `created_at`.
    pub before_date: Option<DateTime<Utc>>,
    /// Inclusive lower bound on `created_at`.
    pub after_date: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct PostAlbumParams {
    pub title: String,
    pub description: String,
    pub creator: String,
    pub images: Vec<Uuid>,
}

/// `None` leaves a field untouched; `images: Some(..)` replaces the whole set.
#[derive(Debug, Clone, Default)]
pub struct UpdateAlbumParams {
    pub title: Option<String>,
    pub description: Option<String>,
    pub images: Option<Vec<Uuid>>,
}

impl UpdateAlbumParams {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.images.is_none()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AlbumListQuery {
    #[serde(alias = "creator")]
    pub creator_id: Option<String>,
    pub before_date: Option<String>,
    pub after_date: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AlbumCreateRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AlbumUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
}
