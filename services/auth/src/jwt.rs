//! JWT service for token generation and validation
//!
//! Access and refresh tokens are signed with HS256 under two independent
//! secrets, so a leaked access token can never be replayed as a refresh
//! token and either secret can be rotated on its own.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};
use crate::models::Role;

/// Access token lifetime used when the configured duration is unparseable
pub const DEFAULT_ACCESS_TTL_MINUTES: i64 = 15;
/// Refresh token lifetime used when the configured duration is unparseable
pub const DEFAULT_REFRESH_TTL_DAYS: i64 = 7;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret for signing access tokens
    pub access_secret: String,
    /// Secret for signing refresh tokens
    pub refresh_secret: String,
    /// Access token lifetime, `<integer><s|m|h|d>` (default: 15m)
    pub access_expires_in: String,
    /// Refresh token lifetime, `<integer><s|m|h|d>` (default: 7d)
    pub refresh_expires_in: String,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_ACCESS_SECRET`: Secret for access tokens
    /// - `JWT_REFRESH_SECRET`: Secret for refresh tokens, must differ from the access secret
    /// - `JWT_ACCESS_EXPIRES_IN`: Access token lifetime (default: 15m)
    /// - `JWT_REFRESH_EXPIRES_IN`: Refresh token lifetime (default: 7d)
    pub fn from_env() -> Result<Self> {
        let access_secret = std::env::var("JWT_ACCESS_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_ACCESS_SECRET environment variable not set"))?;

        let refresh_secret = std::env::var("JWT_REFRESH_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_REFRESH_SECRET environment variable not set"))?;

        if access_secret == refresh_secret {
            anyhow::bail!("JWT_ACCESS_SECRET and JWT_REFRESH_SECRET must differ");
        }

        let access_expires_in =
            std::env::var("JWT_ACCESS_EXPIRES_IN").unwrap_or_else(|_| "15m".to_string());

        let refresh_expires_in =
            std::env::var("JWT_REFRESH_EXPIRES_IN").unwrap_or_else(|_| "7d".to_string());

        Ok(JwtConfig {
            access_secret,
            refresh_secret,
            access_expires_in,
            refresh_expires_in,
        })
    }
}

/// Parse a duration of the form `<integer><s|m|h|d>`
pub fn parse_duration(value: &str) -> Option<Duration> {
    let unit = value.chars().last()?;
    let amount = &value[..value.len() - unit.len_utf8()];
    if amount.is_empty() || !amount.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let amount: i64 = amount.parse().ok()?;

    match unit {
        's' => Duration::try_seconds(amount),
        'm' => Duration::try_minutes(amount),
        'h' => Duration::try_hours(amount),
        'd' => Duration::try_days(amount),
        _ => None,
    }
}

/// Identity a token pair is issued for
#[derive(Debug, Clone)]
pub struct TokenSubject {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

/// Token type enum
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Access token
    Access,
    /// Refresh token
    Refresh,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    /// Issued at time
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
    /// Unique token id; two pairs issued within the same second still differ
    pub jti: Uuid,
    /// Token type (access or refresh)
    pub token_type: TokenType,
}

/// Freshly issued access/refresh pair
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Absolute expiry of the access token
    pub access_token_expires: DateTime<Utc>,
}

#[derive(Clone)]
struct SigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKey {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// JWT service
#[derive(Clone)]
pub struct TokenService {
    access_key: SigningKey,
    refresh_key: SigningKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
    validation: Validation,
}

impl TokenService {
    /// Initialize a new JWT service
    pub fn new(config: &JwtConfig) -> Self {
        let access_ttl = parse_duration(&config.access_expires_in)
            .unwrap_or_else(|| Duration::minutes(DEFAULT_ACCESS_TTL_MINUTES));
        let refresh_ttl = parse_duration(&config.refresh_expires_in)
            .unwrap_or_else(|| Duration::days(DEFAULT_REFRESH_TTL_DAYS));

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        TokenService {
            access_key: SigningKey::from_secret(&config.access_secret),
            refresh_key: SigningKey::from_secret(&config.refresh_secret),
            access_ttl,
            refresh_ttl,
            validation,
        }
    }

    /// Issue a new access/refresh pair for a subject
    pub fn issue_token_pair(&self, subject: &TokenSubject) -> AuthResult<TokenPair> {
        self.issue_token_pair_at(subject, Utc::now())
    }

    pub(crate) fn issue_token_pair_at(
        &self,
        subject: &TokenSubject,
        now: DateTime<Utc>,
    ) -> AuthResult<TokenPair> {
        let access_token_expires = now + self.access_ttl;
        let access_token = self.sign(
            subject,
            TokenType::Access,
            now,
            access_token_expires,
            &self.access_key,
        )?;
        let refresh_token = self.sign(
            subject,
            TokenType::Refresh,
            now,
            now + self.refresh_ttl,
            &self.refresh_key,
        )?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_token_expires,
        })
    }

    /// Validate an access token and return its claims
    pub fn verify_access(&self, token: &str) -> AuthResult<Claims> {
        self.verify(token, &self.access_key, TokenType::Access)
    }

    /// Validate a refresh token and return its claims
    pub fn verify_refresh(&self, token: &str) -> AuthResult<Claims> {
        self.verify(token, &self.refresh_key, TokenType::Refresh)
    }

    /// Get the access token lifetime
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Get the refresh token lifetime
    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    fn sign(
        &self,
        subject: &TokenSubject,
        token_type: TokenType,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        key: &SigningKey,
    ) -> AuthResult<String> {
        let claims = Claims {
            sub: subject.user_id,
            email: subject.email.clone(),
            role: subject.role,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4(),
            token_type,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &key.encoding)
            .map_err(|e| AuthError::Internal(format!("Failed to sign token: {}", e)))
    }

    fn verify(&self, token: &str, key: &SigningKey, expected: TokenType) -> AuthResult<Claims> {
        let data = decode::<Claims>(token, &key.decoding, &self.validation).map_err(|e| {
            debug!("Token rejected: {}", e);
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            }
        })?;

        if data.claims.token_type != expected {
            return Err(AuthError::InvalidToken);
        }

        Ok(data.claims)
    }
}
