//! # Archive Error Types
//!
//! Error types for archive engine operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Archive Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │   User-facing   │  │  Collaborators  │  │     Configuration       │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  AlreadyExists  │  │  Store          │  │  InvalidConfig          │ │
//! │  │  RestoreConflict│  │  Sync           │  │  ConfigLoadFailed       │ │
//! │  │  Validation     │  │                 │  │  ConfigSaveFailed       │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐                                                   │
//! │  │    Lifecycle    │                                                   │
//! │  │                 │                                                   │
//! │  │  ShuttingDown   │                                                   │
//! │  │  ChannelError   │                                                   │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use archive_core::CoreError;
use archive_store::StoreError;

use crate::channel::SyncChannelError;

/// Result type alias for archive operations.
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Archive error type covering every failure an engine caller can see.
///
/// Store and device failures are propagated as-is to the caller of the
/// operation that hit them. None of them stop the engine.
#[derive(Debug, Error)]
pub enum ArchiveError {
    // =========================================================================
    // User-facing Errors
    // =========================================================================
    /// Rename target collides with an existing active item.
    #[error("The name is already taken. Please choose a different name.")]
    AlreadyExists { path: String },

    /// Restore target path is already occupied by an active item.
    #[error("Cannot restore {path}: an item with this name already exists")]
    RestoreConflict { path: String },

    /// Name or path failed validation.
    #[error(transparent)]
    Validation(#[from] CoreError),

    // =========================================================================
    // Collaborator Errors
    // =========================================================================
    /// Active or Deleted store failure.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Remote device failure.
    #[error("Device sync error: {0}")]
    Sync(#[from] SyncChannelError),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid engine configuration.
    #[error("Invalid archive configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Lifecycle Errors
    // =========================================================================
    /// Engine has been shut down.
    #[error("Archive engine is shutting down")]
    ShuttingDown,

    /// Channel send/receive failed.
    #[error("Channel error: {0}")]
    ChannelError(String),
}

impl ArchiveError {
    /// Creates an AlreadyExists error for the given path.
    pub fn already_exists(path: impl ToString) -> Self {
        ArchiveError::AlreadyExists {
            path: path.to_string(),
        }
    }

    /// Creates a RestoreConflict error for the given path.
    pub fn restore_conflict(path: impl ToString) -> Self {
        ArchiveError::RestoreConflict {
            path: path.to_string(),
        }
    }

    /// Returns true if the caller can fix this by choosing different input.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            ArchiveError::AlreadyExists { .. }
                | ArchiveError::RestoreConflict { .. }
                | ArchiveError::Validation(_)
        )
    }

    /// Returns true if re-invoking the same operation may succeed.
    ///
    /// The engine never retries on its own.
    pub fn is_retryable(&self) -> bool {
        match self {
            ArchiveError::Store(e) => e.is_retryable(),
            ArchiveError::Sync(_) => true,
            _ => false,
        }
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ArchiveError::InvalidConfig(_)
                | ArchiveError::ConfigLoadFailed(_)
                | ArchiveError::ConfigSaveFailed(_)
        )
    }
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<std::io::Error> for ArchiveError {
    fn from(err: std::io::Error) -> Self {
        ArchiveError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ArchiveError {
    fn from(err: toml::de::Error) -> Self {
        ArchiveError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ArchiveError {
    fn from(err: toml::ser::Error) -> Self {
        ArchiveError::ConfigSaveFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archive_store::StoreKind;

    #[test]
    fn test_already_exists_message() {
        let err = ArchiveError::already_exists("/c.txt");
        assert_eq!(
            err.to_string(),
            "The name is already taken. Please choose a different name."
        );
        assert!(err.is_user_error());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_categorization() {
        assert!(ArchiveError::restore_conflict("/a.txt").is_user_error());
        assert!(ArchiveError::from(SyncChannelError::DeviceUnavailable).is_retryable());
        assert!(ArchiveError::from(StoreError::PoolExhausted).is_retryable());
        assert!(!ArchiveError::from(StoreError::not_found(StoreKind::Active, "/a.txt")).is_retryable());
        assert!(ArchiveError::InvalidConfig("bad".into()).is_config_error());
        assert!(!ArchiveError::ShuttingDown.is_user_error());
    }
}
