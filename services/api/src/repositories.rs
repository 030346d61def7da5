//! Repositories for database operations
//!
//! Each store is an `async_trait` contract shared as `Arc<dyn ..>` by the
//! workflows, with a PostgreSQL implementation next to it.

mod author;
pub mod category;
pub mod comment;
pub mod post;
pub mod tag;

pub use category::{CategoryRepository, CategoryStore};
pub use comment::{CommentRepository, CommentStore};
pub use post::{PostRepository, PostStore};
pub use tag::{TagRepository, TagStore};
