//! User repository for database operations
//!
//! [`UserStore`] is the credential store contract the workflows depend on;
//! [`UserRepository`] is its PostgreSQL implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;

use crate::models::{NewUser, User, UserChanges, UserQuery, page};

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, avatar, bio, role, \
     is_active, refresh_token_hash, last_login_at, created_at, updated_at";

/// Credential store contract
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user; a duplicate email surfaces as `UniqueViolation`
    async fn create(&self, new_user: NewUser) -> DatabaseResult<User>;

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>>;

    /// Overwrite (or clear, with `None`) the stored refresh-token hash
    async fn set_refresh_token_hash(&self, id: Uuid, hash: Option<String>) -> DatabaseResult<()>;

    /// Store the refresh-token hash of a new session and stamp the login time
    async fn record_login(&self, id: Uuid, hash: String, at: DateTime<Utc>)
    -> DatabaseResult<()>;

    /// One page of users, newest first, plus the total number of matches
    async fn list(&self, query: &UserQuery) -> DatabaseResult<(Vec<User>, i64)>;

    /// Apply column changes; a missing user surfaces as `RecordNotFound`
    async fn update(&self, id: Uuid, changes: UserChanges) -> DatabaseResult<User>;

    /// Hard delete; a missing user surfaces as `RecordNotFound`
    async fn delete(&self, id: Uuid) -> DatabaseResult<()>;
}

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &UserQuery) {
    builder.push(" WHERE TRUE");

    if let Some(role) = query.role {
        builder.push(" AND role = ").push_bind(role);
    }

    if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = format!("%{}%", search.trim());
        builder
            .push(" AND (email ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR first_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR last_name ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn create(&self, new_user: NewUser) -> DatabaseResult<User> {
        info!("Creating new user: {}", new_user.email);

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, password_hash, first_name, last_name, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(new_user.role)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn set_refresh_token_hash(&self, id: Uuid, hash: Option<String>) -> DatabaseResult<()> {
        let result = sqlx::query(
            "UPDATE users SET refresh_token_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(hash)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::RecordNotFound);
        }
        Ok(())
    }

    async fn record_login(
        &self,
        id: Uuid,
        hash: String,
        at: DateTime<Utc>,
    ) -> DatabaseResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET refresh_token_hash = $2, last_login_at = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(hash)
        .bind(at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::RecordNotFound);
        }
        Ok(())
    }

    async fn list(&self, query: &UserQuery) -> DatabaseResult<(Vec<User>, i64)> {
        let (page, limit) = page::normalize(query.page, query.limit);

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users");
        push_filters(&mut count, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {USER_COLUMNS} FROM users"));
        push_filters(&mut select, query);
        select
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(i64::from(limit))
            .push(" OFFSET ")
            .push_bind(page::offset(page, limit));

        let users = select.build_query_as::<User>().fetch_all(&self.pool).await?;

        Ok((users, total))
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> DatabaseResult<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET
                email = COALESCE($2, email),
                password_hash = COALESCE($3, password_hash),
                first_name = COALESCE($4, first_name),
                last_name = COALESCE($5, last_name),
                avatar = COALESCE($6, avatar),
                bio = COALESCE($7, bio),
                role = COALESCE($8, role),
                is_active = COALESCE($9, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.email)
        .bind(changes.password_hash)
        .bind(changes.first_name)
        .bind(changes.last_name)
        .bind(changes.avatar)
        .bind(changes.bio)
        .bind(changes.role)
        .bind(changes.is_active)
        .fetch_optional(&self.pool)
        .await?;

        user.ok_or(DatabaseError::RecordNotFound)
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::RecordNotFound);
        }
        Ok(())
    }
}
