//! Application state shared across handlers

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::guard::Authenticator;
use crate::jwt::TokenService;
use crate::repositories::UserStore;
use crate::service::AuthService;
use crate::users::UserAdminService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub user_admin: UserAdminService,
    pub authenticator: Authenticator,
    pub config: ServerConfig,
}

impl AppState {
    /// Wire every workflow to the same user store and token service
    pub fn new(users: Arc<dyn UserStore>, tokens: TokenService, config: ServerConfig) -> Self {
        Self {
            auth_service: AuthService::new(users.clone(), tokens.clone()),
            user_admin: UserAdminService::new(users.clone()),
            authenticator: Authenticator::new(tokens, users),
            config,
        }
    }
}
