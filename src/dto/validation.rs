//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a required text field holds something other than whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Validates a display dimension: empty, or a run of ASCII digits.
///
/// # Examples
///
/// ```ignore
/// validate_dimension("800") // Ok
/// validate_dimension("")    // Ok - dimension unknown
/// validate_dimension("80%") // Err
/// ```
pub fn validate_dimension(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.chars().all(|c| c.is_ascii_digit()) {
        return Ok(());
    }

    let mut err = ValidationError::new("dimension_format");
    err.message = Some(format!("dimension must be a whole number of pixels (got `{value}`)").into());
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Action").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank("   ").is_err());
    }

    #[test]
    fn test_validate_dimension_valid() {
        assert!(validate_dimension("800").is_ok());
        assert!(validate_dimension("0").is_ok());
        assert!(validate_dimension("").is_ok());
    }

    #[test]
    fn test_validate_dimension_invalid() {
        assert!(validate_dimension("80%").is_err());
        assert!(validate_dimension("-1").is_err());
        assert!(validate_dimension("12.5").is_err());
        assert!(validate_dimension("800 ").is_err());
    }
}
