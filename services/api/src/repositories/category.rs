//! Category repository for database operations

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::models::{Category, CategoryChanges, CategoryListing, CategorySummary, NewCategory};

const CATEGORY_COLUMNS: &str =
    "id, name, slug, description, color, icon, parent_id, created_at, updated_at";

#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// All categories ordered by name, with parent and post count
    async fn list(&self) -> DatabaseResult<Vec<CategoryListing>>;

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Category>>;

    async fn find_by_slug(&self, slug: &str) -> DatabaseResult<Option<Category>>;

    async fn children(&self, id: Uuid) -> DatabaseResult<Vec<CategorySummary>>;

    async fn insert(&self, category: NewCategory) -> DatabaseResult<Category>;

    async fn update(&self, id: Uuid, changes: CategoryChanges) -> DatabaseResult<Category>;

    async fn delete(&self, id: Uuid) -> DatabaseResult<()>;
}

/// Category repository
#[derive(Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    /// Create a new category repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn listing_from_row(row: &PgRow) -> Result<CategoryListing, sqlx::Error> {
    let parent_id: Option<Uuid> = row.try_get("parent_ref_id")?;
    let parent = match parent_id {
        Some(id) => Some(CategorySummary {
            id,
            name: row.try_get("parent_name")?,
            slug: row.try_get("parent_slug")?,
            color: row.try_get("parent_color")?,
        }),
        None => None,
    };

    Ok(CategoryListing {
        category: Category {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            slug: row.try_get("slug")?,
            description: row.try_get("description")?,
            color: row.try_get("color")?,
            icon: row.try_get("icon")?,
            parent_id: row.try_get("parent_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        },
        parent,
        post_count: row.try_get("post_count")?,
    })
}

#[async_trait]
impl CategoryStore for CategoryRepository {
    async fn list(&self) -> DatabaseResult<Vec<CategoryListing>> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.name, c.slug, c.description, c.color, c.icon, c.parent_id,
                   c.created_at, c.updated_at,
                   p.id AS parent_ref_id, p.name AS parent_name, p.slug AS parent_slug,
                   p.color AS parent_color,
                   (SELECT COUNT(*) FROM posts WHERE posts.category_id = c.id) AS post_count
            FROM categories c
            LEFT JOIN categories p ON p.id = c.parent_id
            ORDER BY c.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let categories = rows
            .iter()
            .map(listing_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    async fn find_by_slug(&self, slug: &str) -> DatabaseResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    async fn children(&self, id: Uuid) -> DatabaseResult<Vec<CategorySummary>> {
        let children = sqlx::query_as::<_, CategorySummary>(
            "SELECT id, name, slug, color FROM categories WHERE parent_id = $1 ORDER BY name ASC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(children)
    }

    async fn insert(&self, category: NewCategory) -> DatabaseResult<Category> {
        let category = sqlx::query_as::<_, Category>(&format!(
            r#"
            INSERT INTO categories (name, slug, description, color, icon, parent_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(&category.name)
        .bind(&category.slug)
        .bind(&category.description)
        .bind(&category.color)
        .bind(&category.icon)
        .bind(category.parent_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(category)
    }

    async fn update(&self, id: Uuid, changes: CategoryChanges) -> DatabaseResult<Category> {
        let category = sqlx::query_as::<_, Category>(&format!(
            r#"
            UPDATE categories SET
                name = COALESCE($2, name),
                slug = COALESCE($3, slug),
                description = COALESCE($4, description),
                color = COALESCE($5, color),
                icon = COALESCE($6, icon),
                parent_id = COALESCE($7, parent_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.slug)
        .bind(changes.description)
        .bind(changes.color)
        .bind(changes.icon)
        .bind(changes.parent_id)
        .fetch_optional(&self.pool)
        .await?;

        category.ok_or(DatabaseError::RecordNotFound)
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::RecordNotFound);
        }
        Ok(())
    }
}
