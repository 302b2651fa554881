//! # CLI Error Type
//!
//! Every failure a command can hit, mapped to a process exit code.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Exit codes                                                             │
//! │                                                                         │
//! │  0  success                                                            │
//! │  1  internal / store / device failure                                  │
//! │  2  user error (bad name, taken name, missing item)                    │
//! │  3  configuration error                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use archive_core::CoreError;
use archive_store::StoreError;
use archive_sync::ArchiveError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("Failed to open database: {0}")]
    Database(#[from] StoreError),

    #[error("No item at {path} in the {list}")]
    NotFound { path: String, list: &'static str },

    #[error("Cannot read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode output: {0}")]
    Output(String),
}

pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub fn not_found(path: impl Into<String>, list: &'static str) -> Self {
        CliError::NotFound {
            path: path.into(),
            list,
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CliError::Archive(e) if e.is_config_error() => ExitCode::from(3),
            CliError::Archive(e) if e.is_user_error() => ExitCode::from(2),
            CliError::NotFound { .. } | CliError::ReadFile { .. } => ExitCode::from(2),
            _ => ExitCode::FAILURE,
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        CliError::Archive(ArchiveError::Validation(err))
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Output(err.to_string())
    }
}

impl From<toml::ser::Error> for CliError {
    fn from(err: toml::ser::Error) -> Self {
        CliError::Output(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let taken = CliError::from(ArchiveError::already_exists("/a.key"));
        assert_eq!(taken.exit_code(), ExitCode::from(2));

        let config = CliError::from(ArchiveError::InvalidConfig("bad".into()));
        assert_eq!(config.exit_code(), ExitCode::from(3));

        let missing = CliError::not_found("/a.key", "trash");
        assert_eq!(missing.exit_code(), ExitCode::from(2));
        assert_eq!(missing.to_string(), "No item at /a.key in the trash");

        assert_eq!(
            CliError::from(ArchiveError::ShuttingDown).exit_code(),
            ExitCode::FAILURE
        );
    }
}
