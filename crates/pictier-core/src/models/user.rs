use serde::Serialize;
use uuid::Uuid;

/// An authenticated account. API keys are stored as SHA-256 hex digests only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub tier_id: Option<Uuid>,
}
