// src/cars/models.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::common::Owned;
use crate::media::models::{CreateMediaRequest, Media};
use crate::mods::models::{CreateModRequest, Mod};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub id: String,
    pub user_id: String,
    pub make: String,
    pub model: String,
    pub year: i64,
    pub title: String,
    pub description: Option<String>,
    pub main_image_url: Option<String>,
    pub is_public: bool,
    pub views: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Owned for Car {
    const KIND: &'static str = "Car";
    const TABLE: &'static str = "cars";

    fn owner_id(&self) -> &str {
        &self.user_id
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCarRequest {
    pub make: String,
    pub model: String,
    pub year: i64,
    pub title: String,
    pub description: Option<String>,
    pub main_image_url: Option<String>,
    #[serde(default = "default_is_public")]
    pub is_public: bool,
}

fn default_is_public() -> bool {
    true
}

/// Only the fields present are applied
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCarRequest {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub main_image_url: Option<String>,
    pub is_public: Option<bool>,
}

// ============================================================================
// Car creation wizard
// ============================================================================

/// Everything collected by the multi-step creation flow:
/// basic info → mods → media → review
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardSubmission {
    pub car: CreateCarRequest,
    #[serde(default)]
    pub mods: Vec<CreateModRequest>,
    #[serde(default)]
    pub media: Vec<CreateMediaRequest>,
    /// Index into `media` of the item to use as the car's main image
    pub main_media_index: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardResult {
    pub car: Car,
    pub mods: Vec<Mod>,
    pub media: Vec<Media>,
}
