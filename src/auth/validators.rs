// src/auth/validators.rs

use regex::Regex;
use std::sync::OnceLock;

use super::models::UpdateProfileRequest;
use crate::common::validation::{check_optional_text, check_optional_url};
use crate::common::{ValidationResult, Validator};

fn username_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_-]{3,30}$").expect("valid username regex"))
}

pub fn is_valid_username(username: &str) -> bool {
    username_regex().is_match(username)
}

pub struct ProfileValidator;

impl Validator<UpdateProfileRequest> for ProfileValidator {
    fn validate(&self, data: &UpdateProfileRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.name.is_none()
            && data.username.is_none()
            && data.bio.is_none()
            && data.avatar_url.is_none()
        {
            result.add_error("general", "At least one field must be provided for update");
            return result;
        }

        if let Some(username) = &data.username {
            if !is_valid_username(username) {
                result.add_error(
                    "username",
                    "must be 3-30 characters of letters, digits, '_' or '-'",
                );
            }
        }

        check_optional_text(&mut result, "name", data.name.as_deref(), 100);
        check_optional_text(&mut result, "bio", data.bio.as_deref(), 500);
        check_optional_url(&mut result, "avatarUrl", data.avatar_url.as_deref());

        result
    }
}
