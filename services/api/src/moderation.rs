//! Comment moderation workflow
//!
//! Every new comment starts PENDING; only ADMIN and MODERATOR move it to
//! APPROVED, SPAM or TRASH. Public reads see APPROVED comments only.

use std::sync::Arc;

use auth::{Identity, Role, RoleGate};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult, reject_invalid};
use crate::models::{Comment, CommentStatus, CommentThread, CreateCommentRequest, NewComment};
use crate::repositories::CommentStore;

const MODERATORS: RoleGate = RoleGate::new(&[Role::Admin, Role::Moderator]);

/// Assemble approved comments into threads: top-level newest first, replies
/// oldest first. Replies under a hidden parent are dropped with it.
pub fn thread_comments(comments: Vec<Comment>) -> Vec<CommentThread> {
    let (mut top_level, replies): (Vec<Comment>, Vec<Comment>) = comments
        .into_iter()
        .filter(|c| c.status == CommentStatus::Approved)
        .partition(|c| c.parent_id.is_none());

    top_level.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    top_level
        .into_iter()
        .map(|comment| {
            let mut own: Vec<Comment> = replies
                .iter()
                .filter(|r| r.parent_id == Some(comment.id))
                .cloned()
                .collect();
            own.sort_by(|a, b| a.created_at.cmp(&b.created_at));
            CommentThread {
                comment,
                replies: own,
            }
        })
        .collect()
}

#[derive(Clone)]
pub struct CommentService {
    comments: Arc<dyn CommentStore>,
}

impl CommentService {
    pub fn new(comments: Arc<dyn CommentStore>) -> Self {
        Self { comments }
    }

    /// Create a PENDING comment, attributed to `author` when authenticated and
    /// to the supplied name, email and IP otherwise
    pub async fn create(
        &self,
        request: CreateCommentRequest,
        author: Option<&Identity>,
        ip: Option<String>,
    ) -> ApiResult<Comment> {
        let mut problems = Vec::new();
        if request.content.trim().is_empty() {
            problems.push("Content is required");
        }
        reject_invalid(problems)?;

        let new_comment = match author {
            Some(identity) => NewComment {
                content: request.content,
                post_id: request.post_id,
                user_id: Some(identity.id),
                parent_id: request.parent_id,
                author_name: None,
                author_email: None,
                author_ip: ip,
            },
            None => NewComment {
                content: request.content,
                post_id: request.post_id,
                user_id: None,
                parent_id: request.parent_id,
                author_name: request.author_name,
                author_email: request.author_email,
                author_ip: ip,
            },
        };

        let comment = self.comments.insert(new_comment).await?;
        info!("Comment {} created on post {}", comment.id, comment.post_id);

        Ok(comment)
    }

    pub async fn change_status(
        &self,
        id: Uuid,
        status: CommentStatus,
        actor: &Identity,
    ) -> ApiResult<Comment> {
        self.comments
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;

        if !MODERATORS.allows(actor.role) {
            return Err(ApiError::Forbidden(
                "You don't have permission to moderate comments".to_string(),
            ));
        }

        let comment = self.comments.set_status(id, status).await?;
        info!("Comment {} moved to {:?} by {}", id, status, actor.id);

        Ok(comment)
    }

    pub async fn delete(&self, id: Uuid, actor: &Identity) -> ApiResult<()> {
        let comment = self
            .comments
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;

        let owns = comment.user_id == Some(actor.id);
        if !owns && !MODERATORS.allows(actor.role) {
            return Err(ApiError::Forbidden(
                "You can only delete your own comments".to_string(),
            ));
        }

        self.comments.delete(id).await?;
        info!("Comment {} deleted by {}", id, actor.id);

        Ok(())
    }

    pub async fn find_by_post_id(&self, post_id: Uuid) -> ApiResult<Vec<CommentThread>> {
        let comments = self.comments.approved_for_post(post_id).await?;
        Ok(thread_comments(comments))
    }
}
