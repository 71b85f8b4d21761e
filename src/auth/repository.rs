// Credential store: the persistence seam for users and role memberships

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{
    error::AuthError,
    models::{normalize_email, NewUser, User},
};

/// Persistence operations the auth service relies on.
///
/// Email lookups are case-insensitive and `create` must report a taken email
/// as [`AuthError::DuplicateEmail`], whatever the user's active status.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError>;

    /// Persist a new active user stamped with the current time
    async fn create(&self, new_user: NewUser) -> Result<User, AuthError>;

    /// Write back every mutable field; false when no row was touched
    async fn update(&self, user: &User) -> Result<bool, AuthError>;

    async fn add_role(&self, user_id: Uuid, role: &str) -> Result<(), AuthError>;

    async fn list_roles(&self, user_id: Uuid) -> Result<Vec<String>, AuthError>;

    /// Active users, oldest first
    async fn list_active(&self) -> Result<Vec<User>, AuthError>;
}

const USER_COLUMNS: &str =
    "id, email, normalized_email, password_hash, first_name, last_name, is_active, created_date";

/// PostgreSQL-backed credential store
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Create a new PgUserStore
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE normalized_email = $1"
        ))
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create(&self, new_user: NewUser) -> Result<User, AuthError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, email, normalized_email, password_hash, first_name, last_name, is_active, created_date)
            VALUES ($1, $2, $3, $4, $5, $6, TRUE, $7)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(new_user.email.trim())
        .bind(normalize_email(&new_user.email))
        .bind(&new_user.password_hash)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Check for unique constraint violation
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AuthError::DuplicateEmail;
                }
            }
            AuthError::from(e)
        })?;

        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<bool, AuthError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = $1,
                normalized_email = $2,
                password_hash = $3,
                first_name = $4,
                last_name = $5,
                is_active = $6
            WHERE id = $7
            "#,
        )
        .bind(&user.email)
        .bind(normalize_email(&user.email))
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.is_active)
        .bind(user.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn add_role(&self, user_id: Uuid, role: &str) -> Result<(), AuthError> {
        sqlx::query(
            "INSERT INTO user_roles (user_id, role_name) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(role)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_roles(&self, user_id: Uuid) -> Result<Vec<String>, AuthError> {
        let roles: Vec<(String,)> = sqlx::query_as(
            "SELECT role_name FROM user_roles WHERE user_id = $1 ORDER BY role_name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(roles.into_iter().map(|(name,)| name).collect())
    }

    async fn list_active(&self) -> Result<Vec<User>, AuthError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE is_active = TRUE ORDER BY created_date, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}
