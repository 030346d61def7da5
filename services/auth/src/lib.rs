//! Authentication and authorization for the Inkwell blog platform
//!
//! The crate owns the `users` table. It issues and validates token pairs,
//! runs the register/login/logout/refresh workflow, and exposes the guard
//! (`Authenticator`, `RoleGate`, axum middleware) that other services use to
//! establish who is calling and what they may do.

pub mod config;
pub mod error;
pub mod guard;
pub mod hashing;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod service;
pub mod state;
pub mod users;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{AuthError, AuthResult};
pub use guard::{Authenticator, Identity, RoleGate};
pub use models::Role;
