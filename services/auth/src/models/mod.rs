//! Authentication service models

pub mod page;
pub mod role;
pub mod user;

// Re-export for convenience
pub use page::PageMeta;
pub use role::Role;
pub use user::{
    LoginRequest, NewUser, RegisterRequest, UpdateUserRequest, User, UserChanges, UserProfile,
    UserQuery,
};
