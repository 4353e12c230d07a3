//! Listing entities read from the hosted backend or static content.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::id::{AnnouncementId, NovelId};

/// A site-wide announcement.
///
/// Created and edited by the backend's admin surface. Only rows with
/// `is_active` set are ever listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: AnnouncementId,
    pub title: String,
    pub content: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A novel in the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Novel {
    pub id: NovelId,
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub synopsis: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

/// An upcoming release teased on the home page.
///
/// Sneak peeks are editorial content shipped with the site, not backend rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewItem {
    pub id: String,
    pub title: String,
    pub cover: String,
    pub release_date: NaiveDate,
    pub description: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_announcement_deserializes_backend_row() {
        let row = r#"{
            "id": 3,
            "title": "Maintenance",
            "content": "Reading will pause briefly tonight.",
            "is_active": true,
            "created_at": "2026-03-01T10:00:00+00:00"
        }"#;
        let announcement: Announcement = serde_json::from_str(row).unwrap();
        assert_eq!(announcement.id, AnnouncementId::new(3));
        assert!(announcement.is_active);
    }

    #[test]
    fn test_novel_optional_columns_default_to_none() {
        let row = r#"{
            "id": 9,
            "title": "The Lantern Road",
            "is_published": true,
            "created_at": "2026-02-11T08:30:00Z"
        }"#;
        let novel: Novel = serde_json::from_str(row).unwrap();
        assert!(novel.author.is_none());
        assert!(novel.cover_url.is_none());
    }

    #[test]
    fn test_preview_item_uses_camel_case_keys() {
        let item = r#"{
            "id": "tide",
            "title": "Tidebound",
            "cover": "/static/covers/tidebound.jpg",
            "releaseDate": "2026-12-01",
            "description": "A lighthouse keeper hears the sea answer back."
        }"#;
        let preview: PreviewItem = serde_json::from_str(item).unwrap();
        assert_eq!(
            preview.release_date,
            NaiveDate::from_ymd_opt(2026, 12, 1).unwrap()
        );
    }
}
