//! Tag repository for database operations

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::models::{NewTag, Tag, TagChanges, TagListing};

const TAG_COLUMNS: &str = "id, name, slug, created_at, updated_at";

#[async_trait]
pub trait TagStore: Send + Sync {
    /// All tags ordered by name, with post count
    async fn list(&self) -> DatabaseResult<Vec<TagListing>>;

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Tag>>;

    async fn find_by_slug(&self, slug: &str) -> DatabaseResult<Option<Tag>>;

    async fn insert(&self, tag: NewTag) -> DatabaseResult<Tag>;

    async fn update(&self, id: Uuid, changes: TagChanges) -> DatabaseResult<Tag>;

    async fn delete(&self, id: Uuid) -> DatabaseResult<()>;
}

#[derive(FromRow)]
struct TagCountRow {
    #[sqlx(flatten)]
    tag: Tag,
    post_count: i64,
}

/// Tag repository
#[derive(Clone)]
pub struct TagRepository {
    pool: PgPool,
}

impl TagRepository {
    /// Create a new tag repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TagStore for TagRepository {
    async fn list(&self) -> DatabaseResult<Vec<TagListing>> {
        let rows = sqlx::query_as::<_, TagCountRow>(
            r#"
            SELECT t.id, t.name, t.slug, t.created_at, t.updated_at,
                   (SELECT COUNT(*) FROM post_tags pt WHERE pt.tag_id = t.id) AS post_count
            FROM tags t
            ORDER BY t.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| TagListing {
                tag: row.tag,
                post_count: row.post_count,
            })
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Tag>> {
        let tag = sqlx::query_as::<_, Tag>(&format!("SELECT {TAG_COLUMNS} FROM tags WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(tag)
    }

    async fn find_by_slug(&self, slug: &str) -> DatabaseResult<Option<Tag>> {
        let tag =
            sqlx::query_as::<_, Tag>(&format!("SELECT {TAG_COLUMNS} FROM tags WHERE slug = $1"))
                .bind(slug)
                .fetch_optional(&self.pool)
                .await?;

        Ok(tag)
    }

    async fn insert(&self, tag: NewTag) -> DatabaseResult<Tag> {
        let tag = sqlx::query_as::<_, Tag>(&format!(
            "INSERT INTO tags (name, slug) VALUES ($1, $2) RETURNING {TAG_COLUMNS}"
        ))
        .bind(&tag.name)
        .bind(&tag.slug)
        .fetch_one(&self.pool)
        .await?;

        Ok(tag)
    }

    async fn update(&self, id: Uuid, changes: TagChanges) -> DatabaseResult<Tag> {
        let tag = sqlx::query_as::<_, Tag>(&format!(
            r#"
            UPDATE tags SET
                name = COALESCE($2, name),
                slug = COALESCE($3, slug),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {TAG_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.slug)
        .fetch_optional(&self.pool)
        .await?;

        tag.ok_or(DatabaseError::RecordNotFound)
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<()> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::RecordNotFound);
        }
        Ok(())
    }
}
