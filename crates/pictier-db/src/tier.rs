use async_trait::async_trait;
use pictier_core::{AccessTier, AppError, ThumbnailSpec, TierRegistry, User};
use sqlx::PgPool;

#[derive(Clone)]
pub struct PgTierRegistry {
    pool: PgPool,
}

impl PgTierRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TierRegistry for PgTierRegistry {
    #[tracing::instrument(skip(self, user), fields(username = %user.username))]
    async fn capabilities_for(&self, user: &User) -> Result<AccessTier, AppError> {
        let tier_id = user
            .tier_id
            .ok_or_else(|| AppError::TierNotAssigned(user.username.clone()))?;

        let tier = sqlx::query_as::<_, AccessTier>(
            r#"
            SELECT id, name, original_links, expiring_links, expiration_time
            FROM access_tiers
            WHERE id = $1
            "#,
        )
        .bind(tier_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch access tier: {}", e);
            AppError::Internal("Failed to fetch access tier".to_string())
        })?
        .ok_or_else(|| AppError::TierNotAssigned(user.username.clone()))?;

        tier.ensure_consistent()?;
        Ok(tier)
    }

    #[tracing::instrument(skip(self, tier), fields(tier = %tier.name))]
    async fn thumbnail_specs_for(&self, tier: &AccessTier) -> Result<Vec<ThumbnailSpec>, AppError> {
        let specs = sqlx::query_as::<_, ThumbnailSpec>(
            r#"
            SELECT id, tier_id, name, max_width, max_height
            FROM thumbnail_specs
            WHERE tier_id = $1
            ORDER BY name
            "#,
        )
        .bind(tier.id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list thumbnail specs: {}", e);
            AppError::Internal("Failed to list thumbnail specs".to_string())
        })?;

        for spec in &specs {
            spec.ensure_consistent()?;
        }
        Ok(specs)
    }
}
