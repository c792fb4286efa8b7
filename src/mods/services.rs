use sqlx::{Sqlite, SqlitePool};
use tracing::{info, warn};

use super::models::{CreateModRequest, Mod, UpdateModRequest};
use super::validators::ModValidator;
use crate::cars::models::Car;
use crate::common::{
    authorize_owned, find_by_id, generate_mod_id, now_millis, ApiError, Validator,
};

/// Row for a new mod under `car`; clicks start at zero
pub(crate) fn build_mod(car: &Car, request: &CreateModRequest, now: i64) -> Mod {
    Mod {
        id: generate_mod_id(),
        car_id: car.id.clone(),
        user_id: car.user_id.clone(),
        title: request.title.trim().to_string(),
        brand: request.brand.clone(),
        category: request.category.as_str().to_string(),
        description: request.description.clone(),
        affiliate_link: request.affiliate_link.clone(),
        price: request.price,
        clicks: 0,
        created_at: now,
        updated_at: now,
    }
}

pub(crate) async fn insert_mod<'e, E>(executor: E, row: &Mod) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO mods (id, car_id, user_id, title, brand, category, description,
                          affiliate_link, price, clicks, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&row.id)
    .bind(&row.car_id)
    .bind(&row.user_id)
    .bind(&row.title)
    .bind(&row.brand)
    .bind(&row.category)
    .bind(&row.description)
    .bind(&row.affiliate_link)
    .bind(row.price)
    .bind(row.clicks)
    .bind(row.created_at)
    .bind(row.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub struct ModsService {
    db: SqlitePool,
}

impl ModsService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn list_for_car(&self, car_id: &str) -> Result<Vec<Mod>, ApiError> {
        let mods = sqlx::query_as::<_, Mod>(
            "SELECT * FROM mods WHERE car_id = ? ORDER BY created_at ASC",
        )
        .bind(car_id)
        .fetch_all(&self.db)
        .await?;
        Ok(mods)
    }

    /// Visible when the parent car is public or the viewer owns the mod
    pub async fn get_mod(&self, mod_id: &str, viewer_id: Option<&str>) -> Result<Mod, ApiError> {
        let row = find_by_id::<Mod>(&self.db, mod_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Mod not found".to_string()))?;

        if viewer_id == Some(row.user_id.as_str()) {
            return Ok(row);
        }

        let car = find_by_id::<Car>(&self.db, &row.car_id).await?;
        match car {
            Some(car) if car.is_public => Ok(row),
            _ => Err(ApiError::NotFound("Mod not found".to_string())),
        }
    }

    pub async fn create_mod(
        &self,
        user_id: &str,
        car_id: &str,
        request: &CreateModRequest,
    ) -> Result<Mod, ApiError> {
        let car = authorize_owned::<Car>(&self.db, car_id, user_id).await?;

        let validation_result = ModValidator.validate(request);
        if !validation_result.is_valid {
            warn!(car_id = %car_id, errors = ?validation_result.errors, "Mod creation validation failed");
            return Err(ApiError::from(validation_result));
        }

        let row = build_mod(&car, request, now_millis());
        insert_mod(&self.db, &row).await?;

        info!(
            user_id = %user_id,
            car_id = %car_id,
            mod_id = %row.id,
            category = %row.category,
            "Mod created"
        );
        Ok(row)
    }

    pub async fn update_mod(
        &self,
        user_id: &str,
        mod_id: &str,
        request: &UpdateModRequest,
    ) -> Result<Mod, ApiError> {
        authorize_owned::<Mod>(&self.db, mod_id, user_id).await?;

        let validation_result = ModValidator.validate(request);
        if !validation_result.is_valid {
            warn!(mod_id = %mod_id, errors = ?validation_result.errors, "Mod update validation failed");
            return Err(ApiError::from(validation_result));
        }

        sqlx::query(
            r#"
            UPDATE mods
            SET title = COALESCE(?, title),
                brand = COALESCE(?, brand),
                category = COALESCE(?, category),
                description = COALESCE(?, description),
                affiliate_link = COALESCE(?, affiliate_link),
                price = COALESCE(?, price),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(request.title.as_deref().map(str::trim))
        .bind(request.brand.as_deref())
        .bind(request.category.map(|c| c.as_str()))
        .bind(request.description.as_deref())
        .bind(request.affiliate_link.as_deref())
        .bind(request.price)
        .bind(now_millis())
        .bind(mod_id)
        .execute(&self.db)
        .await?;

        info!(user_id = %user_id, mod_id = %mod_id, "Mod updated");

        find_by_id::<Mod>(&self.db, mod_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Mod not found".to_string()))
    }

    pub async fn delete_mod(&self, user_id: &str, mod_id: &str) -> Result<(), ApiError> {
        authorize_owned::<Mod>(&self.db, mod_id, user_id).await?;

        sqlx::query("DELETE FROM mods WHERE id = ?")
            .bind(mod_id)
            .execute(&self.db)
            .await?;

        info!(user_id = %user_id, mod_id = %mod_id, "Mod deleted");
        Ok(())
    }
}
