// src/cars/validators.rs

use chrono::{Datelike, Utc};

use super::models::*;
use crate::common::validation::{check_optional_text, check_optional_url, check_required_text};
use crate::common::{ValidationResult, Validator};
use crate::media::validators::MediaValidator;
use crate::mods::validators::ModValidator;

/// First production automobile
const MIN_YEAR: i64 = 1886;

fn max_year() -> i64 {
    Utc::now().year() as i64 + 1
}

fn check_year(result: &mut ValidationResult, year: i64) {
    if year < MIN_YEAR || year > max_year() {
        result.add_error(
            "year",
            &format!("must be between {} and {}", MIN_YEAR, max_year()),
        );
    }
}

pub struct CarValidator;

impl Validator<CreateCarRequest> for CarValidator {
    fn validate(&self, data: &CreateCarRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        check_required_text(&mut result, "make", &data.make, 100);
        check_required_text(&mut result, "model", &data.model, 100);
        check_required_text(&mut result, "title", &data.title, 100);
        check_year(&mut result, data.year);
        check_optional_text(&mut result, "description", data.description.as_deref(), 2000);
        check_optional_url(&mut result, "mainImageUrl", data.main_image_url.as_deref());

        result
    }
}

impl Validator<UpdateCarRequest> for CarValidator {
    fn validate(&self, data: &UpdateCarRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.make.is_none()
            && data.model.is_none()
            && data.year.is_none()
            && data.title.is_none()
            && data.description.is_none()
            && data.main_image_url.is_none()
            && data.is_public.is_none()
        {
            result.add_error("general", "At least one field must be provided for update");
            return result;
        }

        if let Some(make) = &data.make {
            check_required_text(&mut result, "make", make, 100);
        }
        if let Some(model) = &data.model {
            check_required_text(&mut result, "model", model, 100);
        }
        if let Some(title) = &data.title {
            check_required_text(&mut result, "title", title, 100);
        }
        if let Some(year) = data.year {
            check_year(&mut result, year);
        }
        check_optional_text(&mut result, "description", data.description.as_deref(), 2000);
        check_optional_url(&mut result, "mainImageUrl", data.main_image_url.as_deref());

        result
    }
}

/// Validates every wizard step, reporting errors with step-qualified field paths
pub struct WizardValidator;

impl Validator<WizardSubmission> for WizardValidator {
    fn validate(&self, data: &WizardSubmission) -> ValidationResult {
        let mut result = ValidationResult::new();

        result.merge_prefixed("car", CarValidator.validate(&data.car));

        for (i, mod_request) in data.mods.iter().enumerate() {
            result.merge_prefixed(&format!("mods[{}]", i), ModValidator.validate(mod_request));
        }

        for (i, media_request) in data.media.iter().enumerate() {
            result.merge_prefixed(
                &format!("media[{}]", i),
                MediaValidator.validate(media_request),
            );
        }

        if let Some(index) = data.main_media_index {
            match data.media.get(index) {
                None => result.add_error("mainMediaIndex", "does not refer to an uploaded item"),
                Some(media) if media.media_type != crate::media::models::MediaType::Image => {
                    result.add_error("mainMediaIndex", "main media must be an image")
                }
                Some(_) => {}
            }
        }

        result
    }
}
