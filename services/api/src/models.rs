//! API models for request and response payloads

pub mod author;
pub mod comment;
pub mod post;
pub mod taxonomy;

// Re-export for convenience
pub use author::AuthorSummary;
pub use comment::{
    Comment, CommentStatus, CommentThread, CreateCommentRequest, NewComment,
    UpdateCommentStatusRequest,
};
pub use post::{
    CreatePostRequest, NewPostRecord, Post, PostChanges, PostPage, PostQuery, PostSort,
    PostStats, PostStatus, PostWithComments, SortOrder, UpdatePostRequest,
};
pub use taxonomy::{
    Category, CategoryChanges, CategoryDetail, CategoryListing, CategorySummary,
    CreateCategoryRequest, CreateTagRequest, NewCategory, NewTag, Tag, TagChanges, TagListing,
    UpdateCategoryRequest, UpdateTagRequest,
};
