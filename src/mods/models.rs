// src/mods/models.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use crate::common::Owned;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModCategory {
    Engine,
    Suspension,
    Wheels,
    Exterior,
    Interior,
    Electronics,
    Other,
}

impl ModCategory {
    pub const ALL: [ModCategory; 7] = [
        ModCategory::Engine,
        ModCategory::Suspension,
        ModCategory::Wheels,
        ModCategory::Exterior,
        ModCategory::Interior,
        ModCategory::Electronics,
        ModCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModCategory::Engine => "Engine",
            ModCategory::Suspension => "Suspension",
            ModCategory::Wheels => "Wheels",
            ModCategory::Exterior => "Exterior",
            ModCategory::Interior => "Interior",
            ModCategory::Electronics => "Electronics",
            ModCategory::Other => "Other",
        }
    }
}

impl fmt::Display for ModCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModCategory::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown mod category: {}", s))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Mod {
    pub id: String,
    pub car_id: String,
    pub user_id: String,
    pub title: String,
    pub brand: Option<String>,
    /// Stored as the category's display name
    pub category: String,
    pub description: Option<String>,
    pub affiliate_link: Option<String>,
    pub price: Option<f64>,
    pub clicks: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Owned for Mod {
    const KIND: &'static str = "Mod";
    const TABLE: &'static str = "mods";

    fn owner_id(&self) -> &str {
        &self.user_id
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateModRequest {
    pub title: String,
    pub brand: Option<String>,
    pub category: ModCategory,
    pub description: Option<String>,
    pub affiliate_link: Option<String>,
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateModRequest {
    pub title: Option<String>,
    pub brand: Option<String>,
    pub category: Option<ModCategory>,
    pub description: Option<String>,
    pub affiliate_link: Option<String>,
    pub price: Option<f64>,
}
