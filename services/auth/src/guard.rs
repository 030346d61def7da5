//! Authorization guard
//!
//! Identity is established from a bearer access token plus a lookup of an
//! active user. [`RoleGate`] then checks that identity against an explicit
//! allow-list declared per operation.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};
use crate::jwt::TokenService;
use crate::models::{Role, User};
use crate::repositories::UserStore;

/// Identity attached to an authenticated request
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    header?.strip_prefix("Bearer ").filter(|t| !t.is_empty())
}

/// Turns an `Authorization` header into an [`Identity`]
#[derive(Clone)]
pub struct Authenticator {
    tokens: TokenService,
    users: Arc<dyn UserStore>,
}

impl Authenticator {
    pub fn new(tokens: TokenService, users: Arc<dyn UserStore>) -> Self {
        Self { tokens, users }
    }

    /// Required mode: any missing, invalid or expired token, and any inactive
    /// or deleted user, is a failure
    pub async fn authenticate(&self, authorization: Option<&str>) -> AuthResult<Identity> {
        let token = bearer_token(authorization)
            .ok_or_else(|| AuthError::Unauthorized("No token provided".to_string()))?;

        let claims = self.tokens.verify_access(token)?;

        match self.users.find_by_id(claims.sub).await? {
            Some(user) if user.is_active => Ok(Identity::from(&user)),
            _ => Err(AuthError::Unauthorized(
                "User not found or inactive".to_string(),
            )),
        }
    }

    /// Optional mode: the same checks, but every failure degrades to "no identity"
    pub async fn authenticate_optional(&self, authorization: Option<&str>) -> Option<Identity> {
        authorization?;
        match self.authenticate(authorization).await {
            Ok(identity) => Some(identity),
            Err(e) => {
                debug!("Optional authentication ignored: {}", e);
                None
            }
        }
    }
}

/// Role-based gate parameterized by an allow-list
#[derive(Debug, Clone, Copy)]
pub struct RoleGate {
    allowed: &'static [Role],
}

impl RoleGate {
    pub const fn new(allowed: &'static [Role]) -> Self {
        Self { allowed }
    }

    pub fn allows(&self, role: Role) -> bool {
        self.allowed.contains(&role)
    }

    /// `Unauthorized` without an identity, `Forbidden` for a role outside the list
    pub fn check<'a>(&self, identity: Option<&'a Identity>) -> AuthResult<&'a Identity> {
        let identity = identity
            .ok_or_else(|| AuthError::Unauthorized("Authentication required".to_string()))?;

        if !self.allows(identity.role) {
            return Err(AuthError::Forbidden("Insufficient permissions".to_string()));
        }

        Ok(identity)
    }
}
