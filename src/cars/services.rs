use sqlx::{Sqlite, SqlitePool};
use tracing::{info, warn};

use super::models::{Car, CreateCarRequest, UpdateCarRequest, WizardResult, WizardSubmission};
use super::validators::{CarValidator, WizardValidator};
use crate::common::{
    authorize_owned, find_by_id, generate_car_id, now_millis, ApiError, Validator,
};
use crate::media::services::{build_media, insert_media};
use crate::mods::services::{build_mod, insert_mod};

pub struct CarsService {
    db: SqlitePool,
}

/// Row for a new car owned by `user_id`; views start at zero
pub(crate) fn build_car(user_id: &str, request: &CreateCarRequest, now: i64) -> Car {
    Car {
        id: generate_car_id(),
        user_id: user_id.to_string(),
        make: request.make.trim().to_string(),
        model: request.model.trim().to_string(),
        year: request.year,
        title: request.title.trim().to_string(),
        description: request.description.clone(),
        main_image_url: request.main_image_url.clone(),
        is_public: request.is_public,
        views: 0,
        created_at: now,
        updated_at: now,
    }
}

pub(crate) async fn insert_car<'e, E>(executor: E, car: &Car) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO cars (id, user_id, make, model, year, title, description, main_image_url,
                          is_public, views, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&car.id)
    .bind(&car.user_id)
    .bind(&car.make)
    .bind(&car.model)
    .bind(car.year)
    .bind(&car.title)
    .bind(&car.description)
    .bind(&car.main_image_url)
    .bind(car.is_public)
    .bind(car.views)
    .bind(car.created_at)
    .bind(car.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

impl CarsService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    // ============================================================================
    // Queries
    // ============================================================================

    /// Public cars are visible to anyone, private cars only to their owner
    pub async fn get_car(&self, car_id: &str, viewer_id: Option<&str>) -> Result<Car, ApiError> {
        let car = find_by_id::<Car>(&self.db, car_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Car not found".to_string()))?;

        if car.is_public || viewer_id == Some(car.user_id.as_str()) {
            Ok(car)
        } else {
            Err(ApiError::NotFound("Car not found".to_string()))
        }
    }

    pub async fn list_user_cars(&self, user_id: &str) -> Result<Vec<Car>, ApiError> {
        let cars = sqlx::query_as::<_, Car>(
            "SELECT * FROM cars WHERE user_id = ? ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(cars)
    }

    pub async fn list_public_cars(&self, user_id: &str) -> Result<Vec<Car>, ApiError> {
        let cars = sqlx::query_as::<_, Car>(
            "SELECT * FROM cars WHERE user_id = ? AND is_public = 1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(cars)
    }

    // ============================================================================
    // Mutations
    // ============================================================================

    pub async fn create_car(&self, user_id: &str, request: &CreateCarRequest) -> Result<Car, ApiError> {
        let validation_result = CarValidator.validate(request);
        if !validation_result.is_valid {
            warn!(user_id = %user_id, errors = ?validation_result.errors, "Car creation validation failed");
            return Err(ApiError::from(validation_result));
        }

        let car = build_car(user_id, request, now_millis());
        insert_car(&self.db, &car).await?;

        info!(user_id = %user_id, car_id = %car.id, title = %car.title, "Car created");
        Ok(car)
    }

    pub async fn update_car(
        &self,
        user_id: &str,
        car_id: &str,
        request: &UpdateCarRequest,
    ) -> Result<Car, ApiError> {
        authorize_owned::<Car>(&self.db, car_id, user_id).await?;

        let validation_result = CarValidator.validate(request);
        if !validation_result.is_valid {
            warn!(car_id = %car_id, errors = ?validation_result.errors, "Car update validation failed");
            return Err(ApiError::from(validation_result));
        }

        sqlx::query(
            r#"
            UPDATE cars
            SET make = COALESCE(?, make),
                model = COALESCE(?, model),
                year = COALESCE(?, year),
                title = COALESCE(?, title),
                description = COALESCE(?, description),
                main_image_url = COALESCE(?, main_image_url),
                is_public = COALESCE(?, is_public),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(request.make.as_deref().map(str::trim))
        .bind(request.model.as_deref().map(str::trim))
        .bind(request.year)
        .bind(request.title.as_deref().map(str::trim))
        .bind(request.description.as_deref())
        .bind(request.main_image_url.as_deref())
        .bind(request.is_public)
        .bind(now_millis())
        .bind(car_id)
        .execute(&self.db)
        .await?;

        info!(user_id = %user_id, car_id = %car_id, "Car updated");

        find_by_id::<Car>(&self.db, car_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Car not found".to_string()))
    }

    pub async fn delete_car(&self, user_id: &str, car_id: &str) -> Result<(), ApiError> {
        authorize_owned::<Car>(&self.db, car_id, user_id).await?;

        // TODO: cascade to the car's mods and media rows; they are orphaned today
        sqlx::query("DELETE FROM cars WHERE id = ?")
            .bind(car_id)
            .execute(&self.db)
            .await?;

        info!(user_id = %user_id, car_id = %car_id, "Car deleted");
        Ok(())
    }

    /// Create the car with its mods and media in one transaction
    pub async fn submit_wizard(
        &self,
        user_id: &str,
        submission: &WizardSubmission,
    ) -> Result<WizardResult, ApiError> {
        let validation_result = WizardValidator.validate(submission);
        if !validation_result.is_valid {
            warn!(user_id = %user_id, errors = ?validation_result.errors, "Wizard submission validation failed");
            return Err(ApiError::from(validation_result));
        }

        let now = now_millis();
        let mut car = build_car(user_id, &submission.car, now);
        if let Some(main) = submission
            .main_media_index
            .and_then(|i| submission.media.get(i))
            .or_else(|| submission.media.iter().find(|m| m.is_main))
        {
            car.main_image_url = Some(main.url.clone());
        }

        let mods: Vec<_> = submission
            .mods
            .iter()
            .map(|request| build_mod(&car, request, now))
            .collect();
        let media: Vec<_> = submission
            .media
            .iter()
            .map(|request| build_media(&car, request, now))
            .collect();

        let mut tx = self.db.begin().await?;
        insert_car(&mut *tx, &car).await?;
        for row in &mods {
            insert_mod(&mut *tx, row).await?;
        }
        for row in &media {
            insert_media(&mut *tx, row).await?;
        }
        tx.commit().await?;

        info!(
            user_id = %user_id,
            car_id = %car.id,
            mod_count = mods.len(),
            media_count = media.len(),
            "Car created from wizard"
        );

        Ok(WizardResult { car, mods, media })
    }
}
