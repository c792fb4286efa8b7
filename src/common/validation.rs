// Common validation types and traits

use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.is_valid = false;
        self.errors.push(ValidationError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn merge(&mut self, other: ValidationResult) {
        if !other.is_valid {
            self.is_valid = false;
            self.errors.extend(other.errors);
        }
    }

    /// Merge another result, prefixing its field names (e.g. `mods[1].title`)
    pub fn merge_prefixed(&mut self, prefix: &str, other: ValidationResult) {
        if !other.is_valid {
            self.is_valid = false;
            self.errors
                .extend(other.errors.into_iter().map(|e| ValidationError {
                    field: format!("{}.{}", prefix, e.field),
                    message: e.message,
                }));
        }
    }

    #[cfg(test)]
    pub fn has_error_for(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

pub trait Validator<T> {
    fn validate(&self, data: &T) -> ValidationResult;
}

// ============================================================================
// Shared field checks
// ============================================================================

/// Required text field: non-blank and at most `max` characters
pub fn check_required_text(result: &mut ValidationResult, field: &str, value: &str, max: usize) {
    if value.trim().is_empty() {
        result.add_error(field, "is required");
    } else if value.chars().count() > max {
        result.add_error(field, &format!("must be at most {} characters", max));
    }
}

pub fn check_optional_text(
    result: &mut ValidationResult,
    field: &str,
    value: Option<&str>,
    max: usize,
) {
    if let Some(value) = value {
        if value.chars().count() > max {
            result.add_error(field, &format!("must be at most {} characters", max));
        }
    }
}

fn http_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("valid url regex"))
}

pub fn is_http_url(value: &str) -> bool {
    http_url_regex().is_match(value.trim())
}

pub fn check_optional_url(result: &mut ValidationResult, field: &str, value: Option<&str>) {
    if let Some(value) = value {
        if !value.trim().is_empty() && !is_http_url(value) {
            result.add_error(field, "must be an http(s) URL");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_url_check() {
        assert!(is_http_url("https://amzn.to/3xyz"));
        assert!(is_http_url("http://example.com/turbo?ref=carfolio"));
        assert!(!is_http_url("ftp://example.com"));
        assert!(!is_http_url("javascript:alert(1)"));
        assert!(!is_http_url("https://"));
    }

    #[test]
    fn test_merge_prefixed_rewrites_fields() {
        let mut inner = ValidationResult::new();
        inner.add_error("title", "is required");

        let mut outer = ValidationResult::new();
        outer.merge_prefixed("mods[1]", inner);

        assert!(!outer.is_valid);
        assert!(outer.has_error_for("mods[1].title"));
    }

    #[test]
    fn test_required_text_counts_chars() {
        let mut result = ValidationResult::new();
        check_required_text(&mut result, "title", "Ünïcödé", 7);
        assert!(result.is_valid);

        check_required_text(&mut result, "title", "   ", 7);
        assert!(result.has_error_for("title"));
    }
}
