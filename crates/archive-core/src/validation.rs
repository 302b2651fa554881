//! # Validation Module
//!
//! Input validation for item names and path components.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller (UI, CLI)                                             │
//! │  └── Basic format checks, immediate user feedback                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: archive-core (THIS MODULE)                                   │
//! │  └── Name rules shared by rename, import and path parsing              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Archive engine                                               │
//! │  └── Identity rules (AlreadyExists, restore conflicts)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use archive_core::validation::validate_name;
//!
//! assert_eq!(validate_name("  garage.sub ").unwrap(), "garage.sub");
//! assert!(validate_name("a/b").is_err());
//! ```

use crate::error::ValidationError;
use crate::MAX_NAME_LENGTH;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates an item name (the leaf segment of a path).
///
/// ## Rules
/// - Must not be empty after trimming surrounding whitespace
/// - At most [`MAX_NAME_LENGTH`] bytes
/// - No `/` separator, no control characters
/// - Not one of the reserved names `.` and `..`
///
/// ## Returns
/// The trimmed name.
pub fn validate_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    validate_component(name)?;
    Ok(name.to_string())
}

/// Validates a single path component.
///
/// Same rules as [`validate_name`] except that surrounding whitespace is
/// significant: path components are taken verbatim.
pub fn validate_component(component: &str) -> ValidationResult<()> {
    if component.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if component.len() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    if component == "." || component == ".." {
        return Err(ValidationError::InvalidFormat {
            field: "name".to_string(),
            reason: format!("'{}' is reserved", component),
        });
    }

    if component.contains('/') {
        return Err(ValidationError::InvalidFormat {
            field: "name".to_string(),
            reason: "must not contain '/'".to_string(),
        });
    }

    if component.chars().any(char::is_control) {
        return Err(ValidationError::InvalidFormat {
            field: "name".to_string(),
            reason: "must not contain control characters".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("garage.sub").unwrap(), "garage.sub");
        assert_eq!(validate_name("  office.nfc\t").unwrap(), "office.nfc");
        assert!(matches!(
            validate_name("   "),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_name("a/b.txt"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            validate_name(".."),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_validate_name_length() {
        let longest = "a".repeat(MAX_NAME_LENGTH);
        assert!(validate_name(&longest).is_ok());

        let too_long = "a".repeat(MAX_NAME_LENGTH + 1);
        assert!(matches!(
            validate_name(&too_long),
            Err(ValidationError::TooLong { max, .. }) if max == MAX_NAME_LENGTH
        ));
    }

    #[test]
    fn test_validate_component_rejects_control_chars() {
        assert!(validate_component("bad\nname").is_err());
        assert!(validate_component("bad\0name").is_err());
        assert!(validate_component(" spaced ").is_ok());
    }
}
