use sqlx::{Sqlite, SqlitePool};
use std::sync::Arc;
use tracing::{info, warn};

use super::models::{CreateMediaRequest, Media, MediaType, UploadUrlRequest, UploadUrlResponse};
use super::validators::MediaValidator;
use crate::cars::models::Car;
use crate::common::{
    authorize_owned, find_by_id, generate_media_id, now_millis, ApiError, Validator,
};
use crate::services::StorageService;

pub(crate) fn build_media(car: &Car, request: &CreateMediaRequest, now: i64) -> Media {
    Media {
        id: generate_media_id(),
        car_id: car.id.clone(),
        user_id: car.user_id.clone(),
        url: request.url.trim().to_string(),
        media_type: request.media_type.as_str().to_string(),
        uploaded_at: now,
    }
}

pub(crate) async fn insert_media<'e, E>(executor: E, row: &Media) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO media (id, car_id, user_id, url, media_type, uploaded_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&row.id)
    .bind(&row.car_id)
    .bind(&row.user_id)
    .bind(&row.url)
    .bind(&row.media_type)
    .bind(row.uploaded_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub struct MediaService {
    db: SqlitePool,
    storage: Arc<StorageService>,
}

impl MediaService {
    pub fn new(db: SqlitePool, storage: Arc<StorageService>) -> Self {
        Self { db, storage }
    }

    /// Media of a car the viewer may see (public car or own car)
    pub async fn list_for_car(
        &self,
        car_id: &str,
        viewer_id: Option<&str>,
    ) -> Result<Vec<Media>, ApiError> {
        let car = find_by_id::<Car>(&self.db, car_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Car not found".to_string()))?;
        if !car.is_public && viewer_id != Some(car.user_id.as_str()) {
            return Err(ApiError::NotFound("Car not found".to_string()));
        }

        let media = sqlx::query_as::<_, Media>(
            "SELECT * FROM media WHERE car_id = ? ORDER BY uploaded_at ASC",
        )
        .bind(car_id)
        .fetch_all(&self.db)
        .await?;
        Ok(media)
    }

    pub async fn add_media(
        &self,
        user_id: &str,
        car_id: &str,
        request: &CreateMediaRequest,
    ) -> Result<Media, ApiError> {
        let car = authorize_owned::<Car>(&self.db, car_id, user_id).await?;

        let validation_result = MediaValidator.validate(request);
        if !validation_result.is_valid {
            warn!(car_id = %car_id, errors = ?validation_result.errors, "Media validation failed");
            return Err(ApiError::from(validation_result));
        }

        let now = now_millis();
        let row = build_media(&car, request, now);

        let mut tx = self.db.begin().await?;
        insert_media(&mut *tx, &row).await?;
        if request.is_main {
            sqlx::query("UPDATE cars SET main_image_url = ?, updated_at = ? WHERE id = ?")
                .bind(&row.url)
                .bind(now)
                .bind(car_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        info!(
            user_id = %user_id,
            car_id = %car_id,
            media_id = %row.id,
            media_type = %row.media_type,
            is_main = request.is_main,
            "Media added"
        );
        Ok(row)
    }

    /// Removes the record only; the stored object is left in the bucket.
    /// Clears the car's main image when it pointed at this media.
    pub async fn delete_media(&self, user_id: &str, media_id: &str) -> Result<(), ApiError> {
        let row = authorize_owned::<Media>(&self.db, media_id, user_id).await?;

        let mut tx = self.db.begin().await?;
        sqlx::query("DELETE FROM media WHERE id = ?")
            .bind(media_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "UPDATE cars SET main_image_url = NULL, updated_at = ? WHERE id = ? AND main_image_url = ?",
        )
        .bind(now_millis())
        .bind(&row.car_id)
        .bind(&row.url)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        info!(user_id = %user_id, media_id = %media_id, car_id = %row.car_id, "Media deleted");
        Ok(())
    }

    /// Make an image the main image of its car
    pub async fn set_main(&self, user_id: &str, media_id: &str) -> Result<Car, ApiError> {
        let row = authorize_owned::<Media>(&self.db, media_id, user_id).await?;
        if row.media_type != MediaType::Image.as_str() {
            return Err(ApiError::ValidationError(
                "only images can be the main image".to_string(),
            ));
        }

        let result = sqlx::query("UPDATE cars SET main_image_url = ?, updated_at = ? WHERE id = ?")
            .bind(&row.url)
            .bind(now_millis())
            .bind(&row.car_id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Car not found".to_string()));
        }

        info!(user_id = %user_id, media_id = %media_id, car_id = %row.car_id, "Main image set");

        find_by_id::<Car>(&self.db, &row.car_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Car not found".to_string()))
    }

    pub async fn create_upload_url(
        &self,
        user_id: &str,
        request: &UploadUrlRequest,
    ) -> Result<UploadUrlResponse, ApiError> {
        let validation_result = MediaValidator.validate(request);
        if !validation_result.is_valid {
            return Err(ApiError::from(validation_result));
        }

        let key = StorageService::object_key(user_id, &request.file_name);
        let upload_url = self
            .storage
            .presigned_upload_url(&key, &request.content_type)
            .await?;
        let public_url = self.storage.public_url(&key)?;

        Ok(UploadUrlResponse {
            upload_url,
            public_url,
            key,
            expires_in: self.storage.upload_url_ttl_secs(),
        })
    }
}
