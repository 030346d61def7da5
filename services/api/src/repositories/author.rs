//! Author summaries read from the users table

use std::collections::HashMap;

use common::error::DatabaseResult;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::AuthorSummary;

/// Summaries for every id that still names a user; `with_bio` adds the bio
pub(crate) async fn author_summaries(
    pool: &PgPool,
    ids: &[Uuid],
    with_bio: bool,
) -> DatabaseResult<HashMap<Uuid, AuthorSummary>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let authors = sqlx::query_as::<_, AuthorSummary>(
        r#"
        SELECT id, first_name, last_name, avatar, CASE WHEN $2 THEN bio END AS bio
        FROM users
        WHERE id = ANY($1)
        "#,
    )
    .bind(ids)
    .bind(with_bio)
    .fetch_all(pool)
    .await?;

    Ok(authors.into_iter().map(|a| (a.id, a)).collect())
}
