// src/mods/validators.rs

use super::models::*;
use crate::common::validation::{check_optional_text, check_optional_url, check_required_text};
use crate::common::{ValidationResult, Validator};

fn check_price(result: &mut ValidationResult, price: Option<f64>) {
    if let Some(price) = price {
        if !price.is_finite() || price < 0.0 {
            result.add_error("price", "must be a non-negative amount");
        }
    }
}

pub struct ModValidator;

impl Validator<CreateModRequest> for ModValidator {
    fn validate(&self, data: &CreateModRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        check_required_text(&mut result, "title", &data.title, 100);
        check_optional_text(&mut result, "brand", data.brand.as_deref(), 100);
        check_optional_text(&mut result, "description", data.description.as_deref(), 2000);
        check_optional_url(&mut result, "affiliateLink", data.affiliate_link.as_deref());
        check_price(&mut result, data.price);

        result
    }
}

impl Validator<UpdateModRequest> for ModValidator {
    fn validate(&self, data: &UpdateModRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.title.is_none()
            && data.brand.is_none()
            && data.category.is_none()
            && data.description.is_none()
            && data.affiliate_link.is_none()
            && data.price.is_none()
        {
            result.add_error("general", "At least one field must be provided for update");
            return result;
        }

        if let Some(title) = &data.title {
            check_required_text(&mut result, "title", title, 100);
        }
        check_optional_text(&mut result, "brand", data.brand.as_deref(), 100);
        check_optional_text(&mut result, "description", data.description.as_deref(), 2000);
        check_optional_url(&mut result, "affiliateLink", data.affiliate_link.as_deref());
        check_price(&mut result, data.price);

        result
    }
}
