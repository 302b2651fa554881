//! # Error Types
//!
//! Domain-specific error types for archive-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  archive-core errors (this file)                                       │
//! │  ├── CoreError        - Path and identity errors                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  archive-store errors (separate crate)                                 │
//! │  └── StoreError       - Store operation failures                       │
//! │                                                                         │
//! │  archive-sync errors (separate crate)                                  │
//! │  └── ArchiveError     - What callers of the engine see                 │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ArchiveError → caller             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Item model errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A path string could not be turned into an archive path.
    ///
    /// ## When This Occurs
    /// - Relative path (`a.txt` instead of `/a.txt`)
    /// - Path points at the archive root
    /// - A component is `.` or `..`
    #[error("Invalid archive path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an InvalidPath error.
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before any store is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} bytes")]
    TooLong { field: String, max: usize },

    /// Invalid format (separator in a name, reserved name, ...).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::invalid_path("a.txt", "must start with '/'");
        assert_eq!(
            err.to_string(),
            "Invalid archive path 'a.txt': must start with '/'"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::TooLong {
            field: "name".to_string(),
            max: 255,
        };
        assert_eq!(err.to_string(), "name must be at most 255 bytes");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
