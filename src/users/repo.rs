use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::users::repo_types::{NewUser, User, UserChanges};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("email already registered")]
    EmailTaken,
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for RepoError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => RepoError::EmailTaken,
            _ => RepoError::Database(e),
        }
    }
}

/// Account persistence used by the handlers and the token guard.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
    /// Page of accounts ordered by id, together with the total count.
    async fn list(&self, limit: i64, offset: i64) -> Result<(Vec<User>, i64), RepoError>;
    async fn create(&self, user: NewUser) -> Result<User, RepoError>;
    async fn update(&self, id: i64, changes: UserChanges) -> Result<Option<User>, RepoError>;
    /// Returns `false` when no account had this id.
    async fn delete(&self, id: i64) -> Result<bool, RepoError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, first_name, last_name, other_name, phone,
                   birthday, city, additional_info, date_joined, is_active, is_admin, is_superuser
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, first_name, last_name, other_name, phone,
                   birthday, city, additional_info, date_joined, is_active, is_admin, is_superuser
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<(Vec<User>, i64), RepoError> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, first_name, last_name, other_name, phone,
                   birthday, city, additional_info, date_joined, is_active, is_admin, is_superuser
            FROM users
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.db)
            .await?;

        Ok((rows, count))
    }

    async fn create(&self, user: NewUser) -> Result<User, RepoError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, first_name, last_name, other_name, phone,
                               birthday, city, additional_info, is_admin, is_superuser)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, email, password_hash, first_name, last_name, other_name, phone,
                      birthday, city, additional_info, date_joined, is_active, is_admin, is_superuser
            "#,
        )
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.first_name)
        .bind(user.last_name)
        .bind(user.other_name)
        .bind(user.phone)
        .bind(user.birthday)
        .bind(user.city)
        .bind(user.additional_info)
        .bind(user.is_admin)
        .bind(user.is_superuser)
        .fetch_one(&self.db)
        .await?;
        Ok(user)
    }

    async fn update(&self, id: i64, changes: UserChanges) -> Result<Option<User>, RepoError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
               SET email           = COALESCE($2, email),
                   first_name      = COALESCE($3, first_name),
                   last_name       = COALESCE($4, last_name),
                   other_name      = COALESCE($5, other_name),
                   phone           = COALESCE($6, phone),
                   birthday        = COALESCE($7, birthday),
                   city            = COALESCE($8, city),
                   additional_info = COALESCE($9, additional_info),
                   is_admin        = COALESCE($10, is_admin)
             WHERE id = $1
            RETURNING id, email, password_hash, first_name, last_name, other_name, phone,
                      birthday, city, additional_info, date_joined, is_active, is_admin, is_superuser
            "#,
        )
        .bind(id)
        .bind(changes.email)
        .bind(changes.first_name)
        .bind(changes.last_name)
        .bind(changes.other_name)
        .bind(changes.phone)
        .bind(changes.birthday)
        .bind(changes.city)
        .bind(changes.additional_info)
        .bind(changes.is_admin)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
