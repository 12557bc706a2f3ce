use async_trait::async_trait;
use pictier_core::{AppError, User, UserDirectory};
use sha2::{Digest, Sha256};
use sqlx::PgPool;

/// Lowercase hex SHA-256 of an API key, the form stored in `users.api_key_hash`.
pub fn hash_api_key(api_key: &str) -> String {
    hex::encode(Sha256::digest(api_key.as_bytes()))
}

#[derive(Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_by_api_key_hash(&self, key_hash: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, tier_id
            FROM users
            WHERE api_key_hash = $1
            "#,
        )
        .bind(key_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up API key: {}", e);
            AppError::Internal("Failed to authenticate".to_string())
        })?;

        Ok(user)
    }
}
