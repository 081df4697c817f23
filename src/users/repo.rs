use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::password;
use crate::error::ApiError;
use crate::users::repo_types::{NewUser, User, UserChanges, UserWithSecret};

fn map_constraint(err: sqlx::Error) -> ApiError {
    if err
        .as_database_error()
        .is_some_and(|e| e.is_unique_violation())
    {
        ApiError::EmailInUse
    } else {
        ApiError::Internal(err.into())
    }
}

impl User {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, role, is_active, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// The only lookup that returns the hash; used exclusively for
    /// credential verification.
    pub async fn find_by_email_with_secret(
        db: &PgPool,
        email: &str,
    ) -> anyhow::Result<Option<UserWithSecret>> {
        let user = sqlx::query_as::<_, UserWithSecret>(
            r#"
            SELECT id, name, email, password_hash, role, is_active, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Hashes the plaintext before the INSERT. A duplicate email lost to a
    /// concurrent registration surfaces as `EmailInUse` via the unique index.
    pub async fn create(db: &PgPool, new: NewUser) -> Result<User, ApiError> {
        let password_hash = password::hash_password(&new.password)?;
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, role, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, role, is_active, created_at, updated_at
            "#,
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(&password_hash)
        .bind(new.role)
        .bind(new.is_active)
        .fetch_one(db)
        .await
        .map_err(map_constraint)?;
        Ok(user)
    }

    /// Generic update. `UserChanges` cannot carry a password, so this path
    /// never touches the hash.
    pub async fn update(
        db: &PgPool,
        id: Uuid,
        changes: UserChanges,
    ) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                role = COALESCE($4, role),
                is_active = COALESCE($5, is_active),
                updated_at = now()
            WHERE id = $1
            RETURNING id, name, email, role, is_active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.role)
        .bind(changes.is_active)
        .fetch_optional(db)
        .await
        .map_err(map_constraint)?;
        Ok(user)
    }

    /// Re-hashes and writes the new secret. The only write path that
    /// touches the hash besides `create`.
    pub async fn set_password(
        db: &PgPool,
        id: Uuid,
        plain: &str,
    ) -> anyhow::Result<Option<User>> {
        let password_hash = password::hash_password(plain)?;
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, name, email, role, is_active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&password_hash)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Hard delete; returns the removed record.
    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            DELETE FROM users
            WHERE id = $1
            RETURNING id, name, email, role, is_active, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn list(db: &PgPool, limit: i64, offset: i64) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, role, is_active, created_at, updated_at
            FROM users
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn count(db: &PgPool) -> anyhow::Result<i64> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(db)
            .await?;
        Ok(total)
    }
}
