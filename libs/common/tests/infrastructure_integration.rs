//! Integration tests for the infrastructure components
//!
//! These tests verify that the PostgreSQL database is reachable, that the
//! bundled migrations apply, and that constraint violations are classified.
//! They need a live database in `DATABASE_URL` and are ignored by default.

use common::{
    database::{DatabaseConfig, health_check, init_pool, run_migrations},
    error::DatabaseError,
};
use sqlx::Row;

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_infrastructure_integration() -> Result<(), Box<dyn std::error::Error>> {
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    assert!(health_check(&pool).await?, "Database health check failed");

    let row = sqlx::query("SELECT 1 as result").fetch_one(&pool).await?;
    let result: i32 = row.get("result");
    assert_eq!(result, 1, "PostgreSQL simple query test failed");

    run_migrations(&pool).await?;

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_duplicate_tag_slug_is_a_unique_violation() -> Result<(), Box<dyn std::error::Error>> {
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;
    run_migrations(&pool).await?;

    let slug = format!("integration-{}", std::process::id());
    let insert = "INSERT INTO tags (name, slug) VALUES ($1, $2)";

    sqlx::query(insert).bind("Integration").bind(&slug).execute(&pool).await?;
    let err = sqlx::query(insert)
        .bind("Integration")
        .bind(&slug)
        .execute(&pool)
        .await
        .map_err(DatabaseError::from)
        .unwrap_err();

    assert!(matches!(err, DatabaseError::UniqueViolation(_)));

    sqlx::query("DELETE FROM tags WHERE slug = $1")
        .bind(&slug)
        .execute(&pool)
        .await?;

    Ok(())
}
