//! Comment repository for database operations

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::PgPool;
use uuid::Uuid;

use super::author::author_summaries;
use crate::models::{Comment, CommentStatus, NewComment};

const COMMENT_COLUMNS: &str = "id, content, post_id, user_id, parent_id, author_name, \
     author_email, author_ip, status, created_at, updated_at";

/// Moderation store contract
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Insert a comment in the PENDING state
    async fn insert(&self, comment: NewComment) -> DatabaseResult<Comment>;

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Comment>>;

    async fn set_status(&self, id: Uuid, status: CommentStatus) -> DatabaseResult<Comment>;

    /// Hard delete; replies go with their parent
    async fn delete(&self, id: Uuid) -> DatabaseResult<()>;

    /// Every APPROVED comment of a post, at any depth
    async fn approved_for_post(&self, post_id: Uuid) -> DatabaseResult<Vec<Comment>>;
}

/// Comment repository
#[derive(Clone)]
pub struct CommentRepository {
    pool: PgPool,
}

impl CommentRepository {
    /// Create a new comment repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn attach_users(&self, comments: &mut [Comment]) -> DatabaseResult<()> {
        let ids: Vec<Uuid> = comments.iter().filter_map(|c| c.user_id).collect();
        let users = author_summaries(&self.pool, &ids, false).await?;

        for comment in comments.iter_mut() {
            comment.user = comment.user_id.and_then(|id| users.get(&id).cloned());
        }

        Ok(())
    }

    async fn with_user(&self, comment: Comment) -> DatabaseResult<Comment> {
        let mut comments = [comment];
        self.attach_users(&mut comments).await?;
        let [comment] = comments;
        Ok(comment)
    }
}

#[async_trait]
impl CommentStore for CommentRepository {
    async fn insert(&self, comment: NewComment) -> DatabaseResult<Comment> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            r#"
            INSERT INTO comments (content, post_id, user_id, parent_id, author_name,
                                  author_email, author_ip, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {COMMENT_COLUMNS}
            "#
        ))
        .bind(&comment.content)
        .bind(comment.post_id)
        .bind(comment.user_id)
        .bind(comment.parent_id)
        .bind(&comment.author_name)
        .bind(&comment.author_email)
        .bind(&comment.author_ip)
        .bind(CommentStatus::Pending)
        .fetch_one(&self.pool)
        .await?;

        self.with_user(comment).await
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match comment {
            Some(comment) => Ok(Some(self.with_user(comment).await?)),
            None => Ok(None),
        }
    }

    async fn set_status(&self, id: Uuid, status: CommentStatus) -> DatabaseResult<Comment> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            r#"
            UPDATE comments SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {COMMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        let comment = comment.ok_or(DatabaseError::RecordNotFound)?;
        self.with_user(comment).await
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<()> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::RecordNotFound);
        }
        Ok(())
    }

    async fn approved_for_post(&self, post_id: Uuid) -> DatabaseResult<Vec<Comment>> {
        let mut comments = sqlx::query_as::<_, Comment>(&format!(
            r#"
            SELECT {COMMENT_COLUMNS} FROM comments
            WHERE post_id = $1 AND status = $2
            ORDER BY created_at ASC
            "#
        ))
        .bind(post_id)
        .bind(CommentStatus::Approved)
        .fetch_all(&self.pool)
        .await?;
        self.attach_users(&mut comments).await?;

        Ok(comments)
    }
}
