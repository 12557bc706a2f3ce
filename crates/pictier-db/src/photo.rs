use async_trait::async_trait;
use pictier_core::{AppError, NewPhoto, Photo, PhotoCatalog};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct PgPhotoCatalog {
    pool: PgPool,
}

impl PgPhotoCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PhotoCatalog for PgPhotoCatalog {
    async fn list_for_owner(&self, owner: &str) -> Result<Vec<Photo>, AppError> {
        let photos = sqlx::query_as::<_, Photo>(
            r#"
            SELECT id, name, owner, storage_path, created_at
            FROM photos
            WHERE owner = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list photos: {}", e);
            AppError::Internal("Failed to list photos".to_string())
        })?;

        Ok(photos)
    }

    async fn get(&self, owner: &str, id: Uuid) -> Result<Option<Photo>, AppError> {
        let photo = sqlx::query_as::<_, Photo>(
            r#"
            SELECT id, name, owner, storage_path, created_at
            FROM photos
            WHERE owner = $1 AND id = $2
            "#,
        )
        .bind(owner)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch photo by ID: {}", e);
            AppError::Internal("Failed to fetch photo".to_string())
        })?;

        Ok(photo)
    }

    async fn create(&self, photo: NewPhoto) -> Result<Photo, AppError> {
        let photo = sqlx::query_as::<_, Photo>(
            r#"
            INSERT INTO photos (name, owner, storage_path)
            VALUES ($1, $2, $3)
            RETURNING id, name, owner, storage_path, created_at
            "#,
        )
        .bind(&photo.name)
        .bind(&photo.owner)
        .bind(&photo.storage_path)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create photo: {}", e);
            AppError::Internal("Failed to create photo".to_string())
        })?;

        tracing::info!(photo_id = %photo.id, owner = %photo.owner, "Created photo");
        Ok(photo)
    }

    async fn delete(&self, owner: &str, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM photos WHERE owner = $1 AND id = $2")
            .bind(owner)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete photo: {}", e);
                AppError::Internal("Failed to delete photo".to_string())
            })?;

        Ok(result.rows_affected() > 0)
    }
}
