//! Identifier and parameter validation.

use crate::error::{RadianceError, Result};

/// Maximum identifier length accepted by the external engine's tooling.
pub const MAX_IDENTIFIER_LENGTH: usize = 100;

fn is_legal(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

/// Validate an identifier used as a join key in text and abridged dictionaries.
///
/// Identifiers must be non-empty, at most 100 characters long and only use
/// `[.A-Za-z0-9_-]`.
pub fn valid_rad_string(value: &str, kind: &str) -> Result<String> {
    let invalid = |reason: String| RadianceError::InvalidIdentifier {
        kind: kind.to_string(),
        value: value.to_string(),
        reason,
    };
    if value.is_empty() {
        return Err(invalid("identifier cannot be empty".into()));
    }
    if let Some(c) = value.chars().find(|c| !is_legal(*c)) {
        return Err(invalid(format!(
            "illegal character \"{}\"; use only [.A-Za-z0-9_-]",
            c
        )));
    }
    if value.len() > MAX_IDENTIFIER_LENGTH {
        return Err(invalid(format!(
            "more than {} characters",
            MAX_IDENTIFIER_LENGTH
        )));
    }
    Ok(value.to_string())
}

/// Strip illegal characters and truncate so the result passes [`valid_rad_string`].
pub fn clean_rad_string(value: &str) -> String {
    let mut cleaned: String = value
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| is_legal(*c))
        .collect();
    cleaned.truncate(MAX_IDENTIFIER_LENGTH);
    cleaned
}

/// Check that `value` lies in `[min, max]`.
pub fn float_in_range(value: f64, min: f64, max: f64, name: &str) -> Result<f64> {
    if value >= min && value <= max {
        Ok(value)
    } else {
        Err(RadianceError::OutOfRange {
            name: name.to_string(),
            value,
            min,
            max,
        })
    }
}

/// Check that `value` is zero or positive.
pub fn float_positive(value: f64, name: &str) -> Result<f64> {
    float_in_range(value, 0.0, f64::INFINITY, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_rad_string() {
        assert_eq!(valid_rad_string("generic_wall_0.50", "modifier").unwrap(), "generic_wall_0.50");
        assert!(valid_rad_string("has space", "modifier").is_err());
        assert!(valid_rad_string("", "modifier").is_err());
        assert!(valid_rad_string(&"a".repeat(101), "modifier").is_err());
    }

    #[test]
    fn test_clean_rad_string() {
        assert_eq!(clean_rad_string("Wall #1 (north)"), "Wall_1_north");
    }

    #[test]
    fn test_ranges() {
        assert!(float_in_range(0.5, 0.0, 1.0, "reflectance").is_ok());
        let err = float_in_range(1.5, 0.0, 1.0, "reflectance").unwrap_err();
        assert!(err.to_string().contains("reflectance"));
        assert!(float_positive(-0.1, "radius").is_err());
        assert!(float_in_range(f64::NAN, 0.0, 1.0, "nan").is_err());
    }
}
