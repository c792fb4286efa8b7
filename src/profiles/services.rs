// src/profiles/services.rs

use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::debug;

use super::models::{ProfileCar, PublicProfile};
use crate::auth::UsersService;
use crate::cars::CarsService;
use crate::common::ApiError;
use crate::mods::Mod;

pub struct ProfilesService {
    db: SqlitePool,
}

impl ProfilesService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Public user fields plus public cars, each with its mods. Private cars never appear.
    pub async fn get_public_profile(&self, username: &str) -> Result<PublicProfile, ApiError> {
        let user = UsersService::new(self.db.clone())
            .get_by_username(username)
            .await?;
        let cars = CarsService::new(self.db.clone())
            .list_public_cars(&user.id)
            .await?;

        let mods = sqlx::query_as::<_, Mod>(
            r#"
            SELECT m.* FROM mods m
            JOIN cars c ON c.id = m.car_id
            WHERE c.user_id = ? AND c.is_public = 1
            ORDER BY m.created_at ASC
            "#,
        )
        .bind(&user.id)
        .fetch_all(&self.db)
        .await?;

        let mut mods_by_car: HashMap<String, Vec<Mod>> = HashMap::new();
        for row in mods {
            mods_by_car.entry(row.car_id.clone()).or_default().push(row);
        }

        let total_views = cars.iter().map(|car| car.views).sum();
        let cars: Vec<ProfileCar> = cars
            .into_iter()
            .map(|car| ProfileCar {
                mods: mods_by_car.remove(&car.id).unwrap_or_default(),
                car,
            })
            .collect();

        debug!(username = %username, cars = cars.len(), "Public profile loaded");

        Ok(PublicProfile {
            user: user.into(),
            cars,
            total_views,
        })
    }
}
