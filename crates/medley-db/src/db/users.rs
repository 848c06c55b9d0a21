use medley_core::models::User;
use medley_core::AppError;
use sqlx::{PgPool, Postgres};

const USER_COLUMNS: &str =
    "id, name, email, password_hash, role, status, profile_image, created_at, updated_at";

/// User repository
///
/// Owns all queries against the users table. The fresh-lookup path used by
/// the auth middleware is `find_by_id`: role and status always come from the
/// current row, never from token claims.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, password_hash), fields(db.table = "users", db.operation = "insert"))]
    pub async fn create(
        &self,
        name: Option<String>,
        email: String,
        password_hash: String,
        profile_image: Option<String>,
    ) -> Result<User, AppError> {
        if self.find_by_email(&email).await?.is_some() {
            return Err(AppError::InvalidInput(
                "User with this email already exists".to_string(),
            ));
        }

        let user = sqlx::query_as::<Postgres, User>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, profile_image)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(profile_image)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_all(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<Postgres, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<Postgres, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Fetch a user or fail with NotFound naming the entity and id.
    pub async fn get_by_id(&self, id: i64) -> Result<User, AppError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with ID {} not found", id)))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<Postgres, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Partial update; absent fields keep their current values.
    #[tracing::instrument(skip(self, password_hash), fields(db.table = "users", db.operation = "update"))]
    pub async fn update(
        &self,
        id: i64,
        name: Option<String>,
        email: Option<String>,
        password_hash: Option<String>,
        profile_image: Option<String>,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<Postgres, User>(&format!(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                profile_image = COALESCE($5, profile_image),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(profile_image)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with ID {} not found", id)))?;

        Ok(user)
    }

    /// Delete a user. Their media rows go with them (FK ON DELETE CASCADE).
    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "delete"))]
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with ID {} not found", id)));
        }
        Ok(())
    }
}
