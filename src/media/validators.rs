// src/media/validators.rs

use super::models::*;
use crate::common::validation::is_http_url;
use crate::common::{ValidationResult, Validator};

pub struct MediaValidator;

impl Validator<CreateMediaRequest> for MediaValidator {
    fn validate(&self, data: &CreateMediaRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if !is_http_url(&data.url) {
            result.add_error("url", "must be an http(s) URL");
        }
        if data.is_main && data.media_type != MediaType::Image {
            result.add_error("isMain", "main media must be an image");
        }

        result
    }
}

impl Validator<UploadUrlRequest> for MediaValidator {
    fn validate(&self, data: &UploadUrlRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        let name = data.file_name.trim();
        if name.is_empty() {
            result.add_error("fileName", "is required");
        } else if name.len() > 255 || name.contains('/') || name.contains('\\') {
            result.add_error("fileName", "must be a plain file name");
        }

        if !(data.content_type.starts_with("image/") || data.content_type.starts_with("video/")) {
            result.add_error("contentType", "only image and video uploads are allowed");
        }

        result
    }
}
