//! User administration: listing, lookup, profile updates and deletion

use std::sync::Arc;

use common::error::DatabaseError;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};
use crate::guard::Identity;
use crate::hashing::hash_secret;
use crate::models::{PageMeta, Role, UpdateUserRequest, UserChanges, UserProfile, UserQuery, page};
use crate::repositories::UserStore;

/// One page of users
#[derive(Debug, Serialize)]
pub struct UserPage {
    pub data: Vec<UserProfile>,
    pub meta: PageMeta,
}

#[derive(Clone)]
pub struct UserAdminService {
    users: Arc<dyn UserStore>,
}

fn not_found() -> AuthError {
    AuthError::NotFound("User not found".to_string())
}

impl UserAdminService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    pub async fn list(&self, query: UserQuery) -> AuthResult<UserPage> {
        let (page_number, limit) = page::normalize(query.page, query.limit);
        let (users, total) = self.users.list(&query).await?;

        Ok(UserPage {
            data: users.iter().map(UserProfile::from).collect(),
            meta: PageMeta::new(total, page_number, limit),
        })
    }

    pub async fn find(&self, id: Uuid) -> AuthResult<UserProfile> {
        let user = self.users.find_by_id(id).await?.ok_or_else(not_found)?;
        Ok(UserProfile::from(&user))
    }

    /// Users may edit themselves; admins may edit anyone and are the only
    /// ones allowed to change a role or the active flag
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateUserRequest,
        actor: &Identity,
    ) -> AuthResult<UserProfile> {
        self.users.find_by_id(id).await?.ok_or_else(not_found)?;

        let is_admin = actor.role == Role::Admin;
        if id != actor.id && !is_admin {
            return Err(AuthError::Forbidden(
                "You can only update your own profile".to_string(),
            ));
        }

        if (request.role.is_some() || request.is_active.is_some()) && !is_admin {
            return Err(AuthError::Forbidden(
                "Only admin can change user role or status".to_string(),
            ));
        }

        let password_hash = request.password.as_deref().map(hash_secret).transpose()?;

        let changes = UserChanges {
            email: request.email,
            password_hash,
            first_name: request.first_name,
            last_name: request.last_name,
            avatar: request.avatar,
            bio: request.bio,
            role: request.role,
            is_active: request.is_active,
        };

        info!("Updating user {} by {}", id, actor.id);
        let user = self.users.update(id, changes).await.map_err(|e| match e {
            DatabaseError::RecordNotFound => not_found(),
            DatabaseError::UniqueViolation(_) => {
                AuthError::Conflict("Email already registered".to_string())
            }
            other => AuthError::Database(other),
        })?;

        Ok(UserProfile::from(&user))
    }

    pub async fn delete(&self, id: Uuid, actor: &Identity) -> AuthResult<()> {
        self.users.find_by_id(id).await?.ok_or_else(not_found)?;

        if actor.role != Role::Admin {
            return Err(AuthError::Forbidden("Only admin can delete users".to_string()));
        }

        if id == actor.id {
            return Err(AuthError::Forbidden(
                "You cannot delete your own account".to_string(),
            ));
        }

        info!("Deleting user {} by {}", id, actor.id);
        self.users.delete(id).await.map_err(|e| match e {
            DatabaseError::RecordNotFound => not_found(),
            other => AuthError::Database(other),
        })
    }
}
