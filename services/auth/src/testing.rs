//! In-memory stores and fixtures for unit tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::{DatabaseError, DatabaseResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::hashing::hash_secret;
use crate::jwt::{JwtConfig, TokenService};
use crate::models::{NewUser, Role, User, UserChanges, UserQuery, page};
use crate::repositories::UserStore;

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn get(&self, id: Uuid) -> Option<User> {
        self.users.lock().unwrap().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    /// Insert an active user with the given role and password directly
    pub fn seed(&self, email: &str, password: &str, role: Role) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: hash_secret(password).unwrap(),
            first_name: None,
            last_name: None,
            avatar: None,
            bio: None,
            role,
            is_active: true,
            refresh_token_hash: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };
        self.users.lock().unwrap().insert(user.id, user.clone());
        user
    }

    pub fn deactivate(&self, id: Uuid) {
        if let Some(user) = self.users.lock().unwrap().get_mut(&id) {
            user.is_active = false;
        }
    }

    pub fn remove(&self, id: Uuid) {
        self.users.lock().unwrap().remove(&id);
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, new_user: NewUser) -> DatabaseResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.email == new_user.email) {
            return Err(DatabaseError::UniqueViolation("users_email_key".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            password_hash: new_user.password_hash,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            avatar: None,
            bio: None,
            role: new_user.role,
            is_active: true,
            refresh_token_hash: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        Ok(self.get(id))
    }

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn set_refresh_token_hash(&self, id: Uuid, hash: Option<String>) -> DatabaseResult<()> {
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(&id).ok_or(DatabaseError::RecordNotFound)?;
        user.refresh_token_hash = hash;
        Ok(())
    }

    async fn record_login(
        &self,
        id: Uuid,
        hash: String,
        at: DateTime<Utc>,
    ) -> DatabaseResult<()> {
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(&id).ok_or(DatabaseError::RecordNotFound)?;
        user.refresh_token_hash = Some(hash);
        user.last_login_at = Some(at);
        Ok(())
    }

    async fn list(&self, query: &UserQuery) -> DatabaseResult<(Vec<User>, i64)> {
        let (page, limit) = page::normalize(query.page, query.limit);
        let search = query.search.as_deref().map(str::to_lowercase);

        let mut matches: Vec<User> = self
            .users
            .lock()
            .unwrap()
            .values()
            .filter(|u| query.role.is_none_or(|role| u.role == role))
            .filter(|u| {
                search.as_deref().is_none_or(|needle| {
                    [Some(&u.email), u.first_name.as_ref(), u.last_name.as_ref()]
                        .into_iter()
                        .flatten()
                        .any(|field| field.to_lowercase().contains(needle))
                })
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matches.len() as i64;
        let users = matches
            .into_iter()
            .skip(page::offset(page, limit) as usize)
            .take(limit as usize)
            .collect();
        Ok((users, total))
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> DatabaseResult<User> {
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(&id).ok_or(DatabaseError::RecordNotFound)?;

        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(hash) = changes.password_hash {
            user.password_hash = hash;
        }
        if changes.first_name.is_some() {
            user.first_name = changes.first_name;
        }
        if changes.last_name.is_some() {
            user.last_name = changes.last_name;
        }
        if changes.avatar.is_some() {
            user.avatar = changes.avatar;
        }
        if changes.bio.is_some() {
            user.bio = changes.bio;
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        if let Some(active) = changes.is_active {
            user.is_active = active;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<()> {
        self.users
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(DatabaseError::RecordNotFound)
    }
}

pub fn token_service() -> TokenService {
    TokenService::new(&JwtConfig {
        access_secret: "test-access-secret".to_string(),
        refresh_secret: "test-refresh-secret".to_string(),
        access_expires_in: "15m".to_string(),
        refresh_expires_in: "7d".to_string(),
    })
}
