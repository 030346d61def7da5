//! Authentication service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::AuthError,
    guard::{Identity, RoleGate},
    jwt::TokenPair,
    middleware::require_auth,
    models::{LoginRequest, RegisterRequest, Role, UpdateUserRequest, UserQuery},
    state::AppState,
    validation,
};

/// Name of the HTTP-only cookie carrying the refresh token
pub const REFRESH_COOKIE: &str = "refreshToken";

const USER_DIRECTORY: RoleGate = RoleGate::new(&[Role::Admin, Role::Moderator]);
const USER_REMOVAL: RoleGate = RoleGate::new(&[Role::Admin]);

/// Response for token generation
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub access_token_expires: DateTime<Utc>,
}

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/auth/logout", post(logout))
        .route("/auth/profile", get(profile))
        .route("/users", get(list_users))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route_layer(middleware::from_fn_with_state(
            state.authenticator.clone(),
            require_auth,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh_token))
        .merge(protected_routes)
        .with_state(state)
}

/// Refresh cookie living exactly as long as the token it carries
fn refresh_cookie(token: String, secure: bool, lifetime: chrono::Duration) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(cookie::time::Duration::seconds(lifetime.num_seconds()))
        .build()
}

fn issue(state: &AppState, jar: CookieJar, pair: TokenPair) -> (CookieJar, Json<serde_json::Value>) {
    let jar = jar.add(refresh_cookie(
        pair.refresh_token,
        state.config.secure_cookies(),
        state.auth_service.tokens().refresh_ttl(),
    ));

    let body = Json(json!({
        "success": true,
        "data": TokenResponse {
            access_token: pair.access_token,
            access_token_expires: pair.access_token_expires,
        },
    }));

    (jar, body)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "auth-service"
    }))
}

/// User registration endpoint
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AuthError> {
    validation::validate_registration(&payload)?;

    let pair = state.auth_service.register(payload).await?;
    let (jar, body) = issue(&state, jar, pair);

    Ok((StatusCode::CREATED, jar, body))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthError> {
    validation::validate_login(&payload)?;

    let pair = state.auth_service.login(payload).await?;
    let (jar, body) = issue(&state, jar, pair);

    Ok((StatusCode::OK, jar, body))
}

/// Refresh token endpoint
pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AuthError> {
    let presented = jar
        .get(REFRESH_COOKIE)
        .map(|cookie| cookie.value().to_owned())
        .ok_or_else(|| AuthError::Unauthorized("No refresh token provided".to_string()))?;

    let pair = state.auth_service.refresh_with_token(&presented).await?;
    let (jar, body) = issue(&state, jar, pair);

    Ok((StatusCode::OK, jar, body))
}

/// Logout endpoint
pub async fn logout(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AuthError> {
    state.auth_service.logout(identity.id).await?;

    let jar = jar.remove(Cookie::build(REFRESH_COOKIE).path("/"));

    Ok((
        StatusCode::OK,
        jar,
        Json(json!({"success": true, "message": "Logged out successfully"})),
    ))
}

/// Current user profile
pub async fn profile(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AuthError> {
    let user = state.auth_service.get_profile(identity.id).await?;
    Ok(Json(json!({"success": true, "data": user})))
}

/// List users
pub async fn list_users(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<UserQuery>,
) -> Result<impl IntoResponse, AuthError> {
    USER_DIRECTORY.check(Some(&identity))?;

    let page = state.user_admin.list(query).await?;
    Ok(Json(json!({"success": true, "data": page.data, "meta": page.meta})))
}

/// Get a user by ID
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AuthError> {
    let user = state.user_admin.find(id).await?;
    Ok(Json(json!({"success": true, "data": user})))
}

/// Update a user
pub async fn update_user(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AuthError> {
    validation::validate_user_update(&payload)?;

    let user = state.user_admin.update(id, payload, &identity).await?;
    Ok(Json(json!({"success": true, "data": user})))
}

/// Delete a user
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AuthError> {
    USER_REMOVAL.check(Some(&identity))?;

    state.user_admin.delete(id, &identity).await?;
    Ok(Json(json!({"success": true, "message": "User deleted successfully"})))
}
