//! Middleware for JWT token validation and authentication
//!
//! Both layers take the [`Authenticator`] as their own state so any router,
//! whatever its state type, can mount them with `from_fn_with_state`.
//! Handlers read the result as `Extension<Identity>` (required) or
//! `Option<Extension<Identity>>` (optional).

use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

use crate::error::AuthError;
use crate::guard::Authenticator;

fn authorization_header(req: &Request<Body>) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .map(str::to_owned)
}

/// Reject the request unless it carries a valid token of an active user
pub async fn require_auth(
    State(authenticator): State<Authenticator>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let header = authorization_header(&req);
    let identity = authenticator.authenticate(header.as_deref()).await?;

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

/// Attach an identity when one can be established, otherwise continue anonymously
pub async fn optional_auth(
    State(authenticator): State<Authenticator>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let header = authorization_header(&req);
    if let Some(identity) = authenticator.authenticate_optional(header.as_deref()).await {
        req.extensions_mut().insert(identity);
    }

    next.run(req).await
}
