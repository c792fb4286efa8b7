// src/profiles/models.rs

use serde::Serialize;

use crate::auth::models::PublicUser;
use crate::cars::Car;
use crate::mods::Mod;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCar {
    #[serde(flatten)]
    pub car: Car,
    pub mods: Vec<Mod>,
}

/// Everything the public profile page renders for one user
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub user: PublicUser,
    pub cars: Vec<ProfileCar>,
    pub total_views: i64,
}
