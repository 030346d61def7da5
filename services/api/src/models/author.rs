//! Public projection of the user behind a post or comment

use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Name and avatar of a post author or comment writer; `bio` is only
/// filled on the full post page
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    pub id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}
