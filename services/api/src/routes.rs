//! API service routes

use auth::middleware::{optional_auth, require_auth};
use auth::{Identity, Role, RoleGate};
use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, patch, post},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiError,
    middleware::ClientIp,
    models::{
        CreateCategoryRequest, CreateCommentRequest, CreatePostRequest, CreateTagRequest,
        PostQuery, UpdateCategoryRequest, UpdateCommentStatusRequest, UpdatePostRequest,
        UpdateTagRequest,
    },
};

const POST_AUTHORS: RoleGate = RoleGate::new(&[Role::Admin, Role::Editor]);
const POST_REVIEWERS: RoleGate = RoleGate::new(&[Role::Admin, Role::Moderator, Role::Editor]);
const POST_ANALYSTS: RoleGate = RoleGate::new(&[Role::Admin, Role::Moderator]);
const COMMENT_MODERATORS: RoleGate = RoleGate::new(&[Role::Admin, Role::Moderator]);
const TAXONOMY_ADMINS: RoleGate = RoleGate::new(&[Role::Admin]);

#[derive(Debug, Deserialize)]
pub struct RelatedQuery {
    pub limit: Option<u32>,
}

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/stats", get(post_stats))
        .route(
            "/posts/:id",
            get(get_post).put(update_post).delete(delete_post),
        )
        .route("/comments/:id/status", patch(update_comment_status))
        .route("/comments/:id", axum::routing::delete(delete_comment))
        .route("/categories", post(create_category))
        .route(
            "/categories/:id",
            axum::routing::put(update_category).delete(delete_category),
        )
        .route("/tags", post(create_tag))
        .route(
            "/tags/:id",
            axum::routing::put(update_tag).delete(delete_tag),
        )
        .route_layer(middleware::from_fn_with_state(
            state.authenticator.clone(),
            require_auth,
        ));

    let anonymous_routes = Router::new()
        .route("/comments", post(create_comment))
        .route_layer(middleware::from_fn_with_state(
            state.authenticator.clone(),
            optional_auth,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/posts/published", get(list_published_posts))
        .route("/posts/slug/:slug", get(get_post_by_slug))
        .route("/posts/:id/related", get(related_posts))
        .route("/comments/post/:post_id", get(comments_for_post))
        .route("/categories", get(list_categories))
        .route("/categories/:id", get(get_category))
        .route("/tags", get(list_tags))
        .route("/tags/:id", get(get_tag))
        .merge(protected_routes)
        .merge(anonymous_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "api-service"
    }))
}

fn deleted(what: &str) -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "message": format!("{} deleted successfully", what),
    }))
}

/// Published posts
pub async fn list_published_posts(
    State(state): State<AppState>,
    Query(query): Query<PostQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state.posts.published(query).await?;
    Ok(Json(json!({"success": true, "data": page.data, "meta": page.meta})))
}

/// All posts, any status
pub async fn list_posts(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<PostQuery>,
) -> Result<impl IntoResponse, ApiError> {
    POST_REVIEWERS.check(Some(&identity))?;

    let page = state.posts.list(query).await?;
    Ok(Json(json!({"success": true, "data": page.data, "meta": page.meta})))
}

pub async fn post_stats(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, ApiError> {
    POST_ANALYSTS.check(Some(&identity))?;

    let stats = state.posts.stats().await?;
    Ok(Json(json!({"success": true, "data": stats})))
}

pub async fn get_post(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    POST_REVIEWERS.check(Some(&identity))?;

    let post = state.posts.find_by_id(id).await?;
    Ok(Json(json!({"success": true, "data": post})))
}

/// Public read by slug; counts a view
pub async fn get_post_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state.posts.find_by_slug(&slug).await?;
    Ok(Json(json!({"success": true, "data": post})))
}

pub async fn related_posts(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<RelatedQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let posts = state.posts.related(id, query.limit).await?;
    Ok(Json(json!({"success": true, "data": posts})))
}

pub async fn create_post(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    POST_AUTHORS.check(Some(&identity))?;

    let post = state.posts.create(payload, &identity).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({"success": true, "data": post})),
    ))
}

pub async fn update_post(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    POST_AUTHORS.check(Some(&identity))?;

    let post = state.posts.update(id, payload, &identity).await?;
    Ok(Json(json!({"success": true, "data": post})))
}

pub async fn delete_post(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    POST_AUTHORS.check(Some(&identity))?;

    state.posts.delete(id, &identity).await?;
    Ok(deleted("Post"))
}

/// Approved comment threads of a post
pub async fn comments_for_post(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let threads = state.comments.find_by_post_id(post_id).await?;
    Ok(Json(json!({"success": true, "data": threads})))
}

/// Create a comment, authenticated or anonymous
pub async fn create_comment(
    State(state): State<AppState>,
    identity: Option<Extension<Identity>>,
    ClientIp(ip): ClientIp,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let author = identity.as_ref().map(|Extension(identity)| identity);

    let comment = state.comments.create(payload, author, ip).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({"success": true, "data": comment})),
    ))
}

pub async fn update_comment_status(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCommentStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    COMMENT_MODERATORS.check(Some(&identity))?;

    let comment = state
        .comments
        .change_status(id, payload.status, &identity)
        .await?;
    Ok(Json(json!({"success": true, "data": comment})))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.comments.delete(id, &identity).await?;
    Ok(deleted("Comment"))
}

pub async fn list_categories(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let categories = state.categories.list().await?;
    Ok(Json(json!({"success": true, "data": categories})))
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state.categories.find(id).await?;
    Ok(Json(json!({"success": true, "data": category})))
}

pub async fn create_category(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    TAXONOMY_ADMINS.check(Some(&identity))?;

    let category = state.categories.create(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({"success": true, "data": category})),
    ))
}

pub async fn update_category(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    TAXONOMY_ADMINS.check(Some(&identity))?;

    let category = state.categories.update(id, payload).await?;
    Ok(Json(json!({"success": true, "data": category})))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    TAXONOMY_ADMINS.check(Some(&identity))?;

    state.categories.delete(id).await?;
    Ok(deleted("Category"))
}

pub async fn list_tags(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let tags = state.tags.list().await?;
    Ok(Json(json!({"success": true, "data": tags})))
}

pub async fn get_tag(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let tag = state.tags.find(id).await?;
    Ok(Json(json!({"success": true, "data": tag})))
}

pub async fn create_tag(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<CreateTagRequest>,
) -> Result<impl IntoResponse, ApiError> {
    TAXONOMY_ADMINS.check(Some(&identity))?;

    let tag = state.tags.create(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({"success": true, "data": tag})),
    ))
}

pub async fn update_tag(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTagRequest>,
) -> Result<impl IntoResponse, ApiError> {
    TAXONOMY_ADMINS.check(Some(&identity))?;

    let tag = state.tags.update(id, payload).await?;
    Ok(Json(json!({"success": true, "data": tag})))
}

pub async fn delete_tag(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    TAXONOMY_ADMINS.check(Some(&identity))?;

    state.tags.delete(id).await?;
    Ok(deleted("Tag"))
}
