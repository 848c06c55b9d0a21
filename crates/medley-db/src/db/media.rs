use std::collections::HashMap;

use chrono::{DateTime, Utc};
use medley_core::models::{MediaCategory, MediaRecord, MediaRow, Tag};
use medley_core::AppError;
use sqlx::{PgPool, Postgres};

const MEDIA_COLUMNS: &str = "id, user_id, file_name, original_name, category, extension, \
     size_bytes, storage_key, view_count, created_at, updated_at";

/// Fields for a new media row. Storage placement has already happened when
/// this is persisted; `storage_key` points at the written object.
#[derive(Debug, Clone)]
pub struct NewMedia {
    pub user_id: i64,
    pub file_name: String,
    pub original_name: String,
    pub category: MediaCategory,
    pub extension: String,
    pub size_bytes: i64,
    pub storage_key: String,
}

/// Replacement file metadata for an update.
#[derive(Debug, Clone)]
pub struct MediaFileUpdate {
    pub file_name: String,
    pub original_name: String,
    pub category: MediaCategory,
    pub extension: String,
    pub size_bytes: i64,
    pub storage_key: String,
}

#[derive(sqlx::FromRow)]
struct MediaTagRow {
    media_id: i64,
    id: i64,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Media repository
///
/// Row + tag-join writes for one file happen inside a single transaction, so
/// a media record never appears without its tag associations. Batches of
/// files are NOT transactional across files; each file commits independently.
#[derive(Clone)]
pub struct MediaRepository {
    pool: PgPool,
}

impl MediaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert one media row and its tag joins. Requested tag ids that do not
    /// exist are dropped by the join select, not treated as an error.
    #[tracing::instrument(skip(self, media), fields(db.table = "media", db.operation = "insert"))]
    pub async fn create(&self, media: NewMedia, tag_ids: &[i64]) -> Result<MediaRecord, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<Postgres, MediaRow>(&format!(
            r#"
            INSERT INTO media (
                user_id, file_name, original_name, category,
                extension, size_bytes, storage_key
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {MEDIA_COLUMNS}
            "#
        ))
        .bind(media.user_id)
        .bind(&media.file_name)
        .bind(&media.original_name)
        .bind(media.category)
        .bind(&media.extension)
        .bind(media.size_bytes)
        .bind(&media.storage_key)
        .fetch_one(&mut *tx)
        .await?;

        if !tag_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO media_tags (media_id, tag_id)
                SELECT $1, id FROM tags WHERE id = ANY($2)
                "#,
            )
            .bind(row.id)
            .bind(tag_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let tags = self.tags_for(row.id).await?;
        Ok(row.into_record(tags))
    }

    pub async fn find_all(&self) -> Result<Vec<MediaRecord>, AppError> {
        let rows = sqlx::query_as::<Postgres, MediaRow>(&format!(
            "SELECT {MEDIA_COLUMNS} FROM media ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        self.rows_to_records(rows).await
    }

    pub async fn find_by_user(&self, user_id: i64) -> Result<Vec<MediaRecord>, AppError> {
        let rows = sqlx::query_as::<Postgres, MediaRow>(&format!(
            "SELECT {MEDIA_COLUMNS} FROM media WHERE user_id = $1 ORDER BY id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        self.rows_to_records(rows).await
    }

    /// Read one record, incrementing its view count as an atomic side effect
    /// of the read. The increment is applied by the database, so concurrent
    /// reads of the same id never lose updates.
    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "update"))]
    pub async fn get_counting_view(&self, id: i64) -> Result<MediaRecord, AppError> {
        let row = sqlx::query_as::<Postgres, MediaRow>(&format!(
            r#"
            UPDATE media SET view_count = view_count + 1, updated_at = NOW()
            WHERE id = $1
            RETURNING {MEDIA_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Media file with ID {} not found", id)))?;

        let tags = self.tags_for(id).await?;
        Ok(row.into_record(tags))
    }

    /// Update a record: optionally swap the backing file metadata, optionally
    /// replace the tag set. Returns the updated record and, when the file was
    /// replaced, the storage key of the previous object so the caller can
    /// clean it up.
    #[tracing::instrument(skip(self, file), fields(db.table = "media", db.operation = "update"))]
    pub async fn update(
        &self,
        id: i64,
        file: Option<MediaFileUpdate>,
        tag_ids: Option<&[i64]>,
    ) -> Result<(MediaRecord, Option<String>), AppError> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<Postgres, MediaRow>(&format!(
            "SELECT {MEDIA_COLUMNS} FROM media WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Media file with ID {} not found", id)))?;

        let row = match &file {
            Some(f) => {
                sqlx::query_as::<Postgres, MediaRow>(&format!(
                    r#"
                    UPDATE media SET
                        file_name = $2, original_name = $3, category = $4,
                        extension = $5, size_bytes = $6, storage_key = $7,
                        updated_at = NOW()
                    WHERE id = $1
                    RETURNING {MEDIA_COLUMNS}
                    "#
                ))
                .bind(id)
                .bind(&f.file_name)
                .bind(&f.original_name)
                .bind(f.category)
                .bind(&f.extension)
                .bind(f.size_bytes)
                .bind(&f.storage_key)
                .fetch_one(&mut *tx)
                .await?
            }
            None => {
                sqlx::query_as::<Postgres, MediaRow>(&format!(
                    r#"
                    UPDATE media SET updated_at = NOW()
                    WHERE id = $1
                    RETURNING {MEDIA_COLUMNS}
                    "#
                ))
                .bind(id)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        if let Some(ids) = tag_ids {
            sqlx::query("DELETE FROM media_tags WHERE media_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            if !ids.is_empty() {
                sqlx::query(
                    r#"
                    INSERT INTO media_tags (media_id, tag_id)
                    SELECT $1, id FROM tags WHERE id = ANY($2)
                    "#,
                )
                .bind(id)
                .bind(ids)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        let tags = self.tags_for(id).await?;
        let replaced_key = file.is_some().then(|| existing.storage_key);
        Ok((row.into_record(tags), replaced_key))
    }

    /// Delete a record, returning the deleted row so the caller can remove
    /// the storage object. Tag joins go via FK cascade.
    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "delete"))]
    pub async fn delete(&self, id: i64) -> Result<MediaRow, AppError> {
        sqlx::query_as::<Postgres, MediaRow>(&format!(
            "DELETE FROM media WHERE id = $1 RETURNING {MEDIA_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Media file with ID {} not found", id)))
    }

    /// Tags for one media row.
    pub async fn tags_for(&self, media_id: i64) -> Result<Vec<Tag>, AppError> {
        let tags = sqlx::query_as::<Postgres, Tag>(
            r#"
            SELECT t.id, t.name, t.created_at, t.updated_at
            FROM media_tags mt
            JOIN tags t ON t.id = mt.tag_id
            WHERE mt.media_id = $1
            ORDER BY t.id
            "#,
        )
        .bind(media_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tags)
    }

    /// Tags for many media rows in one query (avoids N+1 in list endpoints).
    async fn tags_batch(&self, media_ids: &[i64]) -> Result<HashMap<i64, Vec<Tag>>, AppError> {
        if media_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<Postgres, MediaTagRow>(
            r#"
            SELECT mt.media_id, t.id, t.name, t.created_at, t.updated_at
            FROM media_tags mt
            JOIN tags t ON t.id = mt.tag_id
            WHERE mt.media_id = ANY($1)
            ORDER BY t.id
            "#,
        )
        .bind(media_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut map: HashMap<i64, Vec<Tag>> = HashMap::new();
        for row in rows {
            map.entry(row.media_id).or_default().push(Tag {
                id: row.id,
                name: row.name,
                created_at: row.created_at,
                updated_at: row.updated_at,
            });
        }
        Ok(map)
    }

    async fn rows_to_records(&self, rows: Vec<MediaRow>) -> Result<Vec<MediaRecord>, AppError> {
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let mut tag_map = self.tags_batch(&ids).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let tags = tag_map.remove(&row.id).unwrap_or_default();
                row.into_record(tags)
            })
            .collect())
    }
}
