// src/media/models.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::common::Owned;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: String,
    pub car_id: String,
    pub user_id: String,
    pub url: String,
    #[serde(rename = "type")]
    pub media_type: String,
    pub uploaded_at: i64,
}

impl Owned for Media {
    const KIND: &'static str = "Media";
    const TABLE: &'static str = "media";

    fn owner_id(&self) -> &str {
        &self.user_id
    }
}

/// Persist a URL after the client finished uploading to object storage
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMediaRequest {
    pub url: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    /// Also copy the URL onto the car as its main image
    #[serde(default)]
    pub is_main: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlRequest {
    pub file_name: String,
    pub content_type: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlResponse {
    /// Presigned PUT URL the client uploads the bytes to
    pub upload_url: String,
    /// URL to store in Media/Car records once the upload completes
    pub public_url: String,
    pub key: String,
    pub expires_in: u64,
}
