//! Post repository for database operations

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use auth::models::page;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use super::author::author_summaries;
use crate::models::{
    CategorySummary, NewPostRecord, Post, PostChanges, PostQuery, PostStats, PostStatus, Tag,
};

const POST_COLUMNS: &str = "id, title, slug, excerpt, content, featured_image, status, \
     published_at, scheduled_at, reading_time, view_count, author_id, category_id, \
     created_at, updated_at";

/// Number of posts returned as "recent" by [`PostStore::stats`]
pub const RECENT_POSTS: i64 = 5;

/// Content store contract
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Id of the post currently holding `slug`, if any
    async fn slug_owner(&self, slug: &str) -> DatabaseResult<Option<Uuid>>;

    /// Insert a post and connect its tags in one transaction
    async fn insert(&self, record: NewPostRecord) -> DatabaseResult<Post>;

    /// Apply changes in one transaction; a tag list replaces the current set
    async fn update(&self, id: Uuid, changes: PostChanges) -> DatabaseResult<Post>;

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Post>>;

    async fn find_by_slug(&self, slug: &str) -> DatabaseResult<Option<Post>>;

    /// Atomically add one view and return the new count
    async fn increment_views(&self, id: Uuid) -> DatabaseResult<i64>;

    async fn delete(&self, id: Uuid) -> DatabaseResult<()>;

    /// One page of posts matching the filters plus the total number of matches
    async fn list(&self, query: &PostQuery) -> DatabaseResult<(Vec<Post>, i64)>;

    async fn stats(&self) -> DatabaseResult<PostStats>;

    /// Published posts sharing the category or a tag with `post`, most viewed first
    async fn related(&self, post: &Post, limit: u32) -> DatabaseResult<Vec<Post>>;
}

#[derive(FromRow)]
struct PostTagRow {
    post_id: Uuid,
    #[sqlx(flatten)]
    tag: Tag,
}

/// Post repository
#[derive(Clone)]
pub struct PostRepository {
    pool: PgPool,
}

impl PostRepository {
    /// Create a new post repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn attach_tags(&self, posts: &mut [Post]) -> DatabaseResult<()> {
        let ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
        let rows = sqlx::query_as::<_, PostTagRow>(
            r#"
            SELECT pt.post_id, t.id, t.name, t.slug, t.created_at, t.updated_at
            FROM post_tags pt
            JOIN tags t ON t.id = pt.tag_id
            WHERE pt.post_id = ANY($1)
            ORDER BY t.name ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_post: HashMap<Uuid, Vec<Tag>> = HashMap::new();
        for row in rows {
            by_post.entry(row.post_id).or_default().push(row.tag);
        }
        for post in posts.iter_mut() {
            post.tags = by_post.remove(&post.id).unwrap_or_default();
        }

        Ok(())
    }

    async fn attach_authors(&self, posts: &mut [Post], with_bio: bool) -> DatabaseResult<()> {
        let ids: Vec<Uuid> = posts.iter().map(|p| p.author_id).collect();
        let authors = author_summaries(&self.pool, &ids, with_bio).await?;

        for post in posts.iter_mut() {
            post.author = authors.get(&post.author_id).cloned();
        }

        Ok(())
    }

    async fn attach_categories(&self, posts: &mut [Post]) -> DatabaseResult<()> {
        let ids: Vec<Uuid> = posts.iter().filter_map(|p| p.category_id).collect();
        if ids.is_empty() {
            return Ok(());
        }

        let categories: HashMap<Uuid, CategorySummary> = sqlx::query_as::<_, CategorySummary>(
            "SELECT id, name, slug, color FROM categories WHERE id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

        for post in posts.iter_mut() {
            post.category = post.category_id.and_then(|id| categories.get(&id).cloned());
        }

        Ok(())
    }

    /// Fill author, category and tags for a batch of posts
    async fn attach_relations(&self, posts: &mut [Post], with_bio: bool) -> DatabaseResult<()> {
        if posts.is_empty() {
            return Ok(());
        }

        self.attach_tags(posts).await?;
        self.attach_authors(posts, with_bio).await?;
        self.attach_categories(posts).await
    }

    async fn with_relations(
        &self,
        post: Option<Post>,
        with_bio: bool,
    ) -> DatabaseResult<Option<Post>> {
        match post {
            Some(post) => {
                let mut posts = [post];
                self.attach_relations(&mut posts, with_bio).await?;
                let [post] = posts;
                Ok(Some(post))
            }
            None => Ok(None),
        }
    }
}

async fn connect_tags(
    tx: &mut Transaction<'_, Postgres>,
    post_id: Uuid,
    tag_ids: &[Uuid],
) -> DatabaseResult<()> {
    for tag_id in tag_ids {
        sqlx::query(
            "INSERT INTO post_tags (post_id, tag_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(post_id)
        .bind(tag_id)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &PostQuery) {
    builder.push(" WHERE TRUE");

    if let Some(status) = query.status {
        builder.push(" AND status = ").push_bind(status);
    }

    if let Some(category_id) = query.category_id {
        builder.push(" AND category_id = ").push_bind(category_id);
    }

    if let Some(author_id) = query.author_id {
        builder.push(" AND author_id = ").push_bind(author_id);
    }

    if let Some(tag_slug) = query.tag_slug.as_deref().filter(|s| !s.trim().is_empty()) {
        builder
            .push(
                " AND EXISTS (SELECT 1 FROM post_tags pt JOIN tags t ON t.id = pt.tag_id \
                 WHERE pt.post_id = posts.id AND t.slug = ",
            )
            .push_bind(tag_slug.trim().to_string())
            .push(")");
    }

    if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = format!("%{}%", search.trim());
        builder
            .push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR excerpt ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR content ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[async_trait]
impl PostStore for PostRepository {
    async fn slug_owner(&self, slug: &str) -> DatabaseResult<Option<Uuid>> {
        let owner = sqlx::query_scalar::<_, Uuid>("SELECT id FROM posts WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        Ok(owner)
    }

    async fn insert(&self, record: NewPostRecord) -> DatabaseResult<Post> {
        info!("Creating post with slug: {}", record.slug);

        let mut tx = self.pool.begin().await?;

        let post = sqlx::query_as::<_, Post>(&format!(
            r#"
            INSERT INTO posts (title, slug, excerpt, content, featured_image, status,
                               published_at, scheduled_at, reading_time, author_id, category_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(&record.title)
        .bind(&record.slug)
        .bind(&record.excerpt)
        .bind(&record.content)
        .bind(&record.featured_image)
        .bind(record.status)
        .bind(record.published_at)
        .bind(record.scheduled_at)
        .bind(record.reading_time)
        .bind(record.author_id)
        .bind(record.category_id)
        .fetch_one(&mut *tx)
        .await?;

        connect_tags(&mut tx, post.id, &record.tag_ids).await?;
        tx.commit().await?;

        self.with_relations(Some(post), false)
            .await?
            .ok_or(DatabaseError::RecordNotFound)
    }

    async fn update(&self, id: Uuid, changes: PostChanges) -> DatabaseResult<Post> {
        let mut tx = self.pool.begin().await?;

        let post = sqlx::query_as::<_, Post>(&format!(
            r#"
            UPDATE posts SET
                title = COALESCE($2, title),
                slug = COALESCE($3, slug),
                excerpt = COALESCE($4, excerpt),
                content = COALESCE($5, content),
                featured_image = COALESCE($6, featured_image),
                status = COALESCE($7, status),
                published_at = COALESCE($8, published_at),
                scheduled_at = COALESCE($9, scheduled_at),
                reading_time = COALESCE($10, reading_time),
                category_id = COALESCE($11, category_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.title)
        .bind(changes.slug)
        .bind(changes.excerpt)
        .bind(changes.content)
        .bind(changes.featured_image)
        .bind(changes.status)
        .bind(changes.published_at)
        .bind(changes.scheduled_at)
        .bind(changes.reading_time)
        .bind(changes.category_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DatabaseError::RecordNotFound)?;

        if let Some(tag_ids) = changes.tag_ids {
            sqlx::query("DELETE FROM post_tags WHERE post_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            connect_tags(&mut tx, id, &tag_ids).await?;
        }

        tx.commit().await?;

        self.with_relations(Some(post), false)
            .await?
            .ok_or(DatabaseError::RecordNotFound)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        self.with_relations(post, false).await
    }

    async fn find_by_slug(&self, slug: &str) -> DatabaseResult<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        self.with_relations(post, true).await
    }

    async fn increment_views(&self, id: Uuid) -> DatabaseResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "UPDATE posts SET view_count = view_count + 1 WHERE id = $1 RETURNING view_count",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        count.ok_or(DatabaseError::RecordNotFound)
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<()> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::RecordNotFound);
        }
        Ok(())
    }

    async fn list(&self, query: &PostQuery) -> DatabaseResult<(Vec<Post>, i64)> {
        let (page, limit) = page::normalize(query.page, query.limit);
        let sort_by = query.sort_by.unwrap_or_default();
        let sort_order = query.sort_order.unwrap_or_default();

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM posts");
        push_filters(&mut count, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {POST_COLUMNS} FROM posts"));
        push_filters(&mut select, query);
        select
            .push(format!(
                " ORDER BY {} {} NULLS LAST, id ASC LIMIT ",
                sort_by.column(),
                sort_order.keyword()
            ))
            .push_bind(i64::from(limit))
            .push(" OFFSET ")
            .push_bind(page::offset(page, limit));

        debug!("Listing posts: page {} limit {}", page, limit);

        let mut posts = select.build_query_as::<Post>().fetch_all(&self.pool).await?;
        self.attach_relations(&mut posts, false).await?;

        Ok((posts, total))
    }

    async fn stats(&self) -> DatabaseResult<PostStats> {
        let (total, total_views) = sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*), COALESCE(SUM(view_count), 0)::BIGINT FROM posts",
        )
        .fetch_one(&self.pool)
        .await?;

        let counts = sqlx::query_as::<_, (PostStatus, i64)>(
            "SELECT status, COUNT(*) FROM posts GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_status: BTreeMap<String, i64> = PostStatus::ALL
            .iter()
            .map(|status| (status.as_str().to_string(), 0))
            .collect();
        for (status, count) in counts {
            by_status.insert(status.as_str().to_string(), count);
        }

        let mut recent_posts = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts ORDER BY created_at DESC LIMIT $1"
        ))
        .bind(RECENT_POSTS)
        .fetch_all(&self.pool)
        .await?;
        self.attach_relations(&mut recent_posts, false).await?;

        Ok(PostStats {
            total,
            total_views,
            by_status,
            recent_posts,
        })
    }

    async fn related(&self, post: &Post, limit: u32) -> DatabaseResult<Vec<Post>> {
        let tag_ids: Vec<Uuid> = post.tags.iter().map(|t| t.id).collect();

        let mut related = sqlx::query_as::<_, Post>(&format!(
            r#"
            SELECT {POST_COLUMNS} FROM posts
            WHERE id <> $1
              AND status = $2
              AND (
                category_id = $3
                OR EXISTS (
                    SELECT 1 FROM post_tags pt
                    WHERE pt.post_id = posts.id AND pt.tag_id = ANY($4)
                )
              )
            ORDER BY view_count DESC, id ASC
            LIMIT $5
            "#
        ))
        .bind(post.id)
        .bind(PostStatus::Published)
        .bind(post.category_id)
        .bind(&tag_ids)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        self.attach_relations(&mut related, false).await?;

        Ok(related)
    }
}
