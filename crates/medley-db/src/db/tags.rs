use medley_core::models::Tag;
use medley_core::AppError;
use sqlx::{PgPool, Postgres};

/// Tag repository
#[derive(Clone)]
pub struct TagRepository {
    pool: PgPool,
}

impl TagRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "tags", db.operation = "insert"))]
    pub async fn create(&self, name: String) -> Result<Tag, AppError> {
        let existing = sqlx::query_scalar::<Postgres, i64>("SELECT id FROM tags WHERE name = $1")
            .bind(&name)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AppError::InvalidInput(
                "Tag with this name already exists".to_string(),
            ));
        }

        let tag = sqlx::query_as::<Postgres, Tag>(
            r#"
            INSERT INTO tags (name)
            VALUES ($1)
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(tag)
    }

    pub async fn find_all(&self) -> Result<Vec<Tag>, AppError> {
        let tags = sqlx::query_as::<Postgres, Tag>(
            "SELECT id, name, created_at, updated_at FROM tags ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(tags)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Tag, AppError> {
        sqlx::query_as::<Postgres, Tag>(
            "SELECT id, name, created_at, updated_at FROM tags WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Tag with ID {} not found", id)))
    }

    #[tracing::instrument(skip(self), fields(db.table = "tags", db.operation = "update"))]
    pub async fn update(&self, id: i64, name: String) -> Result<Tag, AppError> {
        sqlx::query_as::<Postgres, Tag>(
            r#"
            UPDATE tags SET name = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Tag with ID {} not found", id)))
    }

    #[tracing::instrument(skip(self), fields(db.table = "tags", db.operation = "delete"))]
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Tag with ID {} not found", id)));
        }
        Ok(())
    }
}
