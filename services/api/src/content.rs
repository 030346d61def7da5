//! Post publication workflow
//!
//! Slugs are unique across posts, resolved by appending `-1`, `-2`, ... to
//! the slugified title. `published_at` is written once, on the first move
//! into PUBLISHED, and survives every later edit. Reading time follows the
//! content.

use std::sync::Arc;

use auth::models::{PageMeta, page};
use auth::{Identity, Role};
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult, reject_invalid};
use crate::models::{
    CreatePostRequest, NewPostRecord, Post, PostChanges, PostPage, PostQuery, PostStats,
    PostStatus, PostWithComments, UpdatePostRequest,
};
use crate::moderation::thread_comments;
use crate::repositories::{CommentStore, PostStore};
use crate::slug::{self, MAX_SLUG_SUFFIX};

/// Words read per minute when estimating reading time
pub const WORDS_PER_MINUTE: usize = 200;

/// Default number of related posts
pub const DEFAULT_RELATED_LIMIT: u32 = 3;

/// Estimated minutes to read `content`, rounded up
pub fn reading_time(content: &str) -> i32 {
    let words = content.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE) as i32
}

/// Base slug from an explicit slug, else from the title
fn base_slug(explicit: Option<&str>, title: &str) -> ApiResult<String> {
    match explicit {
        Some(explicit) => {
            let slug = slug::slugify(explicit);
            if slug.is_empty() {
                return Err(ApiError::BadRequest(
                    "Slug must contain at least one letter or digit".to_string(),
                ));
            }
            Ok(slug)
        }
        None => Ok(slug::from_title(title, "post")),
    }
}

fn can_manage(post: &Post, actor: &Identity) -> bool {
    post.author_id == actor.id || actor.role == Role::Admin
}

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostStore>,
    comments: Arc<dyn CommentStore>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostStore>, comments: Arc<dyn CommentStore>) -> Self {
        Self { posts, comments }
    }

    /// First free candidate for `base`; a slug already held by `exclude`
    /// counts as free
    async fn unique_slug(&self, base: &str, exclude: Option<Uuid>) -> ApiResult<String> {
        for n in 0..=MAX_SLUG_SUFFIX {
            let candidate = slug::with_suffix(base, n);
            match self.posts.slug_owner(&candidate).await? {
                None => return Ok(candidate),
                Some(owner) if Some(owner) == exclude => return Ok(candidate),
                Some(_) => debug!("Slug {} is taken", candidate),
            }
        }

        Err(ApiError::Conflict(format!(
            "No free slug left for '{}'",
            base
        )))
    }

    pub async fn create(&self, request: CreatePostRequest, author: &Identity) -> ApiResult<Post> {
        let mut problems = Vec::new();
        if request.title.trim().is_empty() {
            problems.push("Title is required");
        }
        if request.content.trim().is_empty() {
            problems.push("Content is required");
        }
        reject_invalid(problems)?;

        let base = base_slug(request.slug.as_deref(), &request.title)?;
        let slug = self.unique_slug(&base, None).await?;

        let status = request.status.unwrap_or_default();
        let published_at = (status == PostStatus::Published).then(Utc::now);

        let record = NewPostRecord {
            reading_time: reading_time(&request.content),
            title: request.title,
            slug,
            excerpt: request.excerpt,
            content: request.content,
            featured_image: request.featured_image,
            status,
            published_at,
            scheduled_at: request.scheduled_at,
            author_id: author.id,
            category_id: request.category_id,
            tag_ids: request.tag_ids,
        };

        let post = self.posts.insert(record).await?;
        info!("Post {} created by {} as {}", post.id, author.id, post.slug);

        Ok(post)
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdatePostRequest,
        actor: &Identity,
    ) -> ApiResult<Post> {
        let post = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

        if !can_manage(&post, actor) {
            return Err(ApiError::Forbidden(
                "You can only edit your own posts".to_string(),
            ));
        }

        let mut problems = Vec::new();
        if request.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            problems.push("Title cannot be empty");
        }
        if request.content.as_deref().is_some_and(|c| c.trim().is_empty()) {
            problems.push("Content cannot be empty");
        }
        reject_invalid(problems)?;

        let slug = match (request.slug.as_deref(), request.title.as_deref()) {
            (Some(explicit), _) => {
                let base = base_slug(Some(explicit), &post.title)?;
                Some(self.unique_slug(&base, Some(id)).await?)
            }
            (None, Some(title)) if title != post.title => {
                let base = base_slug(None, title)?;
                Some(self.unique_slug(&base, Some(id)).await?)
            }
            _ => None,
        };

        let published_at = match request.status {
            Some(PostStatus::Published) if post.published_at.is_none() => Some(Utc::now()),
            _ => None,
        };

        let changes = PostChanges {
            reading_time: request.content.as_deref().map(reading_time),
            title: request.title,
            slug,
            excerpt: request.excerpt,
            content: request.content,
            featured_image: request.featured_image,
            status: request.status,
            published_at,
            scheduled_at: request.scheduled_at,
            category_id: request.category_id,
            tag_ids: request.tag_ids,
        };

        let updated = self.posts.update(id, changes).await?;
        info!("Post {} updated by {}", id, actor.id);

        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid, actor: &Identity) -> ApiResult<()> {
        let post = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

        if !can_manage(&post, actor) {
            return Err(ApiError::Forbidden(
                "You can only delete your own posts".to_string(),
            ));
        }

        self.posts.delete(id).await?;
        info!("Post {} deleted by {}", id, actor.id);

        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> ApiResult<Post> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))
    }

    /// Public read: any status, one more view per call, approved threads attached
    pub async fn find_by_slug(&self, slug: &str) -> ApiResult<PostWithComments> {
        let mut post = self
            .posts
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

        post.view_count = self.posts.increment_views(post.id).await?;

        let comments = self.comments.approved_for_post(post.id).await?;

        Ok(PostWithComments {
            post,
            comments: thread_comments(comments),
        })
    }

    pub async fn list(&self, query: PostQuery) -> ApiResult<PostPage> {
        let (page, limit) = page::normalize(query.page, query.limit);
        let (data, total) = self.posts.list(&query).await?;

        Ok(PostPage {
            data,
            meta: PageMeta::new(total, page, limit),
        })
    }

    /// Listing restricted to PUBLISHED posts whatever the query asks for
    pub async fn published(&self, mut query: PostQuery) -> ApiResult<PostPage> {
        query.status = Some(PostStatus::Published);
        self.list(query).await
    }

    pub async fn stats(&self) -> ApiResult<PostStats> {
        Ok(self.posts.stats().await?)
    }

    /// Related published posts; an unknown post has none
    pub async fn related(&self, id: Uuid, limit: Option<u32>) -> ApiResult<Vec<Post>> {
        let Some(post) = self.posts.find_by_id(id).await? else {
            return Ok(Vec::new());
        };

        let limit = limit
            .unwrap_or(DEFAULT_RELATED_LIMIT)
            .clamp(1, page::MAX_PAGE_SIZE);

        Ok(self.posts.related(&post, limit).await?)
    }
}
