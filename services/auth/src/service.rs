//! Authentication workflow: register, login, logout, refresh and profile
//!
//! Session state is the single `refresh_token_hash` column of the user. A
//! user has an active session exactly when it is set, and only the refresh
//! token whose hash is stored can be exchanged. Every successful exchange
//! overwrites it, so a second login elsewhere invalidates the first.

use std::sync::Arc;

use chrono::Utc;
use common::error::DatabaseError;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};
use crate::hashing::{hash_secret, verify_decoy, verify_secret};
use crate::jwt::{TokenPair, TokenService, TokenSubject};
use crate::models::{LoginRequest, NewUser, RegisterRequest, Role, User, UserProfile};
use crate::repositories::UserStore;

/// Authentication workflow
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: TokenService,
}

fn subject_of(user: &User) -> TokenSubject {
    TokenSubject {
        user_id: user.id,
        email: user.email.clone(),
        role: user.role,
    }
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, tokens: TokenService) -> Self {
        Self { users, tokens }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Create an account with the default role and open its first session
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<TokenPair> {
        info!("Registering user: {}", request.email);

        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(AuthError::Conflict("Email already registered".to_string()));
        }

        let new_user = NewUser {
            email: request.email,
            password_hash: hash_secret(&request.password)?,
            first_name: request.first_name,
            last_name: request.last_name,
            role: Role::default(),
        };

        let user = self.users.create(new_user).await.map_err(|e| match e {
            DatabaseError::UniqueViolation(_) => {
                AuthError::Conflict("Email already registered".to_string())
            }
            other => AuthError::Database(other),
        })?;

        let pair = self.tokens.issue_token_pair(&subject_of(&user))?;
        self.users
            .set_refresh_token_hash(user.id, Some(hash_secret(&pair.refresh_token)?))
            .await?;

        Ok(pair)
    }

    /// Check credentials and open a new session, replacing any previous one
    pub async fn login(&self, request: LoginRequest) -> AuthResult<TokenPair> {
        info!("Login attempt for user: {}", request.email);

        let Some(user) = self.users.find_by_email(&request.email).await? else {
            verify_decoy(&request.password);
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_secret(&user.password_hash, &request.password)? {
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_active {
            warn!("Login rejected for deactivated user: {}", user.id);
            return Err(AuthError::AccountDeactivated);
        }

        let pair = self.tokens.issue_token_pair(&subject_of(&user))?;
        self.users
            .record_login(user.id, hash_secret(&pair.refresh_token)?, Utc::now())
            .await?;

        Ok(pair)
    }

    /// Drop the stored refresh-token hash; repeating it is harmless
    pub async fn logout(&self, user_id: Uuid) -> AuthResult<()> {
        info!("Logout for user: {}", user_id);
        self.users.set_refresh_token_hash(user_id, None).await?;
        Ok(())
    }

    /// Exchange the current refresh token for a new pair, invalidating it
    pub async fn refresh_tokens(&self, user_id: Uuid, presented: &str) -> AuthResult<TokenPair> {
        info!("Token refresh for user: {}", user_id);

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::AccessDenied)?;

        let stored = user
            .refresh_token_hash
            .as_deref()
            .ok_or(AuthError::AccessDenied)?;

        if !verify_secret(stored, presented)? {
            return Err(AuthError::AccessDenied);
        }

        let pair = self.tokens.issue_token_pair(&subject_of(&user))?;
        self.users
            .set_refresh_token_hash(user.id, Some(hash_secret(&pair.refresh_token)?))
            .await?;

        Ok(pair)
    }

    /// Verify a presented refresh token's signature, then rotate it for its subject
    pub async fn refresh_with_token(&self, presented: &str) -> AuthResult<TokenPair> {
        let claims = self.tokens.verify_refresh(presented)?;
        self.refresh_tokens(claims.sub, presented).await
    }

    pub async fn get_profile(&self, user_id: Uuid) -> AuthResult<UserProfile> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AuthError::NotFound("User not found".to_string()))?;

        Ok(UserProfile::from(&user))
    }
}
