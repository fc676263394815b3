use crate::utils::error::{PreshowError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(PreshowError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(PreshowError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(PreshowError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(PreshowError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(PreshowError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(PreshowError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| PreshowError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PreshowError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(PreshowError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Accepts `#rgb` and `#rrggbb`. Empty values are allowed (template defaults apply).
pub fn validate_hex_color(field_name: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Ok(());
    }
    let digits = value.strip_prefix('#').unwrap_or("");
    let valid = matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        return Err(PreshowError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Expected a hex color like #e86a4f".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("weather.endpoint", "https://example.com").is_ok());
        assert!(validate_url("weather.endpoint", "http://example.com").is_ok());
        assert!(validate_url("weather.endpoint", "").is_err());
        assert!(validate_url("weather.endpoint", "invalid-url").is_err());
        assert!(validate_url("weather.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("theatre.radius_meters", 500, 1).is_ok());
        assert!(validate_positive_number("theatre.radius_meters", 0, 1).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("latitude", 40.7, -90.0, 90.0).is_ok());
        assert!(validate_range("latitude", 91.0, -90.0, 90.0).is_err());
    }

    #[test]
    fn test_validate_hex_color() {
        assert!(validate_hex_color("branding.primary_color", "#e86a4f").is_ok());
        assert!(validate_hex_color("branding.primary_color", "#fff").is_ok());
        assert!(validate_hex_color("branding.primary_color", "").is_ok());
        assert!(validate_hex_color("branding.primary_color", "e86a4f").is_err());
        assert!(validate_hex_color("branding.primary_color", "#zzzzzz").is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let present = Some("abc".to_string());
        let missing: Option<String> = None;
        assert_eq!(validate_required_field("list_id", &present).unwrap(), "abc");
        assert!(validate_required_field("list_id", &missing).is_err());
    }
}
