use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::tag::Tag;

/// Media category, derived from the declared content type at admission time.
/// Immutable after creation except via an explicit update with a new file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "media_category", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum MediaCategory {
    Image,
    Video,
    Pdf,
}

impl MediaCategory {
    /// Derive the category from a normalized (lowercase, parameter-free)
    /// content type. `image/*` and `video/*` match by prefix; PDF is exact.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        if content_type.starts_with("image/") {
            Some(MediaCategory::Image)
        } else if content_type.starts_with("video/") {
            Some(MediaCategory::Video)
        } else if content_type == "application/pdf" {
            Some(MediaCategory::Pdf)
        } else {
            None
        }
    }

    /// Directory under the storage root where objects of this category live.
    pub fn storage_dir(&self) -> &'static str {
        match self {
            MediaCategory::Image => "images",
            MediaCategory::Video | MediaCategory::Pdf => "media",
        }
    }
}

/// Database row for the media table (no tags; the join is loaded separately).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct MediaRow {
    pub id: i64,
    pub user_id: i64,
    pub file_name: String,
    pub original_name: String,
    pub category: MediaCategory,
    pub extension: String,
    pub size_bytes: i64,
    pub storage_key: String,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Media record as returned by the API: row fields plus resolved tags.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MediaRecord {
    pub id: i64,
    pub user_id: i64,
    pub file_name: String,
    pub original_name: String,
    pub category: MediaCategory,
    pub extension: String,
    pub size_bytes: i64,
    pub storage_key: String,
    pub view_count: i64,
    pub tags: Vec<Tag>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MediaRow {
    /// Build the API record from this row and its resolved tags.
    pub fn into_record(self, tags: Vec<Tag>) -> MediaRecord {
        MediaRecord {
            id: self.id,
            user_id: self.user_id,
            file_name: self.file_name,
            original_name: self.original_name,
            category: self.category,
            extension: self.extension,
            size_bytes: self.size_bytes,
            storage_key: self.storage_key,
            view_count: self.view_count,
            tags,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_content_type() {
        assert_eq!(
            MediaCategory::from_content_type("image/png"),
            Some(MediaCategory::Image)
        );
        assert_eq!(
            MediaCategory::from_content_type("video/x-matroska"),
            Some(MediaCategory::Video)
        );
        assert_eq!(
            MediaCategory::from_content_type("application/pdf"),
            Some(MediaCategory::Pdf)
        );
        // Exact match only for PDF; other application/* types are unsupported.
        assert_eq!(MediaCategory::from_content_type("application/zip"), None);
        assert_eq!(MediaCategory::from_content_type("text/plain"), None);
    }

    #[test]
    fn test_storage_dir_split() {
        assert_eq!(MediaCategory::Image.storage_dir(), "images");
        assert_eq!(MediaCategory::Video.storage_dir(), "media");
        assert_eq!(MediaCategory::Pdf.storage_dir(), "media");
    }
}
