use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod content;
mod error;
mod middleware;
mod models;
mod moderation;
mod repositories;
mod routes;
mod slug;
mod state;
mod taxonomy;

#[cfg(test)]
mod testing;

use auth::{
    Authenticator,
    config::ServerConfig,
    jwt::{JwtConfig, TokenService},
    repositories::UserRepository,
};
use common::database::{self, DatabaseConfig};

use crate::{
    repositories::{CategoryRepository, CommentRepository, PostRepository, TagRepository},
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting API service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;

    // Check database connectivity
    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    database::run_migrations(&pool).await?;

    // Identity is checked against the same users table the auth service owns
    let jwt_config = JwtConfig::from_env()?;
    let authenticator = Authenticator::new(
        TokenService::new(&jwt_config),
        Arc::new(UserRepository::new(pool.clone())),
    );

    let server_config = ServerConfig::from_env(3001)?;
    let addr = server_config.socket_addr()?;

    // Initialize repositories
    let app_state = AppState::new(
        Arc::new(PostRepository::new(pool.clone())),
        Arc::new(CommentRepository::new(pool.clone())),
        Arc::new(CategoryRepository::new(pool.clone())),
        Arc::new(TagRepository::new(pool)),
        authenticator,
    );

    info!("API service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("API service listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
