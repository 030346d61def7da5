//! Application state shared across handlers

use std::sync::Arc;

use auth::Authenticator;

use crate::content::PostService;
use crate::moderation::CommentService;
use crate::repositories::{CategoryStore, CommentStore, PostStore, TagStore};
use crate::taxonomy::{CategoryService, TagService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub posts: PostService,
    pub comments: CommentService,
    pub categories: CategoryService,
    pub tags: TagService,
    pub authenticator: Authenticator,
}

impl AppState {
    pub fn new(
        posts: Arc<dyn PostStore>,
        comments: Arc<dyn CommentStore>,
        categories: Arc<dyn CategoryStore>,
        tags: Arc<dyn TagStore>,
        authenticator: Authenticator,
    ) -> Self {
        Self {
            posts: PostService::new(posts, comments.clone()),
            comments: CommentService::new(comments),
            categories: CategoryService::new(categories),
            tags: TagService::new(tags),
            authenticator,
        }
    }
}
