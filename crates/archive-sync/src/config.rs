//! # Archive Configuration
//!
//! Configuration management for the archive engine and its host.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     ARCHIVE_DB_PATH=/data/archive.db                                   │
//! │     ARCHIVE_DEVICE_ID=abc-123                                          │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/key-archive/archive.toml (Linux)                         │
//! │     ~/Library/Application Support/com.keyarchive.archive/archive.toml  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     auto-generated device id, archive.db in the data dir               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # archive.toml
//! [device]
//! id = "550e8400-e29b-41d4-a716-446655440000"
//! name = "Pocket Reader"
//!
//! [storage]
//! database_path = "/home/me/.local/share/key-archive/archive.db"
//! max_connections = 4
//!
//! [engine]
//! mailbox_capacity = 64
//! snapshot_capacity = 32
//! load_on_start = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{ArchiveError, ArchiveResult};

// =============================================================================
// Device Configuration
// =============================================================================

/// Identity of the device this archive mirrors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Unique device identifier (UUID v4).
    /// Auto-generated on first run if not provided.
    pub id: String,

    /// Human-readable device name.
    #[serde(default = "default_device_name")]
    pub name: String,
}

fn default_device_name() -> String {
    "Key Reader".to_string()
}

impl Default for DeviceConfig {
    fn default() -> Self {
        DeviceConfig {
            id: Uuid::new_v4().to_string(),
            name: default_device_name(),
        }
    }
}

// =============================================================================
// Storage Configuration
// =============================================================================

/// Where the Active and Deleted stores live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database file holding both stores.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Maximum pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> PathBuf {
    directories::ProjectDirs::from("com", "keyarchive", "archive")
        .map(|dirs| dirs.data_dir().join("archive.db"))
        .unwrap_or_else(|| PathBuf::from("archive.db"))
}

fn default_max_connections() -> u32 {
    4
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            database_path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

// =============================================================================
// Engine Settings
// =============================================================================

/// Tuning for the archive actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Queued commands before callers wait for room.
    /// Default: 64
    #[serde(default = "default_mailbox_capacity")]
    pub mailbox_capacity: usize,

    /// Snapshots buffered per subscriber before it starts lagging.
    /// Default: 32
    #[serde(default = "default_snapshot_capacity")]
    pub snapshot_capacity: usize,

    /// Whether the engine loads both stores as soon as it starts.
    /// Default: true
    #[serde(default = "default_true")]
    pub load_on_start: bool,
}

fn default_mailbox_capacity() -> usize {
    64
}

fn default_snapshot_capacity() -> usize {
    32
}

fn default_true() -> bool {
    true
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            mailbox_capacity: default_mailbox_capacity(),
            snapshot_capacity: default_snapshot_capacity(),
            load_on_start: default_true(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete archive configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Device identity.
    #[serde(default)]
    pub device: DeviceConfig,

    /// Store location.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Engine tuning.
    #[serde(default)]
    pub engine: EngineSettings,
}

impl ArchiveConfig {
    /// Creates a new config with defaults and a generated device ID.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (archive.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ArchiveResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading archive config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load archive config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ArchiveResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ArchiveError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ArchiveError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ArchiveError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Archive config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ArchiveResult<()> {
        if self.device.id.trim().is_empty() {
            return Err(ArchiveError::InvalidConfig(
                "device.id must not be empty".into(),
            ));
        }

        if self.storage.database_path.as_os_str().is_empty() {
            return Err(ArchiveError::InvalidConfig(
                "storage.database_path must not be empty".into(),
            ));
        }

        if self.storage.max_connections == 0 {
            return Err(ArchiveError::InvalidConfig(
                "storage.max_connections must be greater than 0".into(),
            ));
        }

        // Zero-capacity tokio channels panic on creation
        if self.engine.mailbox_capacity == 0 {
            return Err(ArchiveError::InvalidConfig(
                "engine.mailbox_capacity must be greater than 0".into(),
            ));
        }

        if self.engine.snapshot_capacity == 0 {
            return Err(ArchiveError::InvalidConfig(
                "engine.snapshot_capacity must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(id) = std::env::var("ARCHIVE_DEVICE_ID") {
            debug!(device_id = %id, "Overriding device ID from environment");
            self.device.id = id;
        }

        if let Ok(name) = std::env::var("ARCHIVE_DEVICE_NAME") {
            self.device.name = name;
        }

        if let Ok(path) = std::env::var("ARCHIVE_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.database_path = PathBuf::from(path);
        }

        if let Ok(capacity) = std::env::var("ARCHIVE_MAILBOX_CAPACITY") {
            match capacity.parse::<usize>() {
                Ok(c) => self.engine.mailbox_capacity = c,
                Err(_) => warn!(value = %capacity, "Ignoring invalid ARCHIVE_MAILBOX_CAPACITY"),
            }
        }

        if let Ok(capacity) = std::env::var("ARCHIVE_SNAPSHOT_CAPACITY") {
            match capacity.parse::<usize>() {
                Ok(c) => self.engine.snapshot_capacity = c,
                Err(_) => warn!(value = %capacity, "Ignoring invalid ARCHIVE_SNAPSHOT_CAPACITY"),
            }
        }

        if let Ok(flag) = std::env::var("ARCHIVE_LOAD_ON_START") {
            match flag.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.engine.load_on_start = true,
                "0" | "false" | "no" => self.engine.load_on_start = false,
                _ => warn!(value = %flag, "Ignoring invalid ARCHIVE_LOAD_ON_START"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "keyarchive", "archive")
            .map(|dirs| dirs.config_dir().join("archive.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the device ID.
    pub fn device_id(&self) -> &str {
        &self.device.id
    }

    /// Returns the database path.
    pub fn database_path(&self) -> &PathBuf {
        &self.storage.database_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ArchiveConfig::default();
        assert!(!config.device.id.is_empty()); // Auto-generated
        assert_eq!(config.engine.mailbox_capacity, 64);
        assert!(config.engine.load_on_start);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ArchiveConfig::default();

        config.device.id = String::new();
        assert!(config.validate().unwrap_err().is_config_error());

        config.device.id = "reader-1".to_string();
        config.engine.mailbox_capacity = 0;
        assert!(config.validate().is_err());

        config.engine.mailbox_capacity = 8;
        config.storage.max_connections = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ArchiveConfig = toml::from_str(
            r#"
            [device]
            id = "reader-1"

            [engine]
            load_on_start = false
            "#,
        )
        .unwrap();

        assert_eq!(config.device.name, "Key Reader");
        assert!(!config.engine.load_on_start);
        assert_eq!(config.engine.snapshot_capacity, 32);
        assert_eq!(config.storage.max_connections, 4);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("archive.toml");

        let mut config = ArchiveConfig::default();
        config.device.name = "Bench Reader".to_string();
        config.storage.database_path = dir.path().join("archive.db");
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[device]"));
        assert!(contents.contains("[engine]"));

        let loaded: ArchiveConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded.device.id, config.device.id);
        assert_eq!(loaded.device.name, "Bench Reader");
        assert_eq!(loaded.storage.database_path, config.storage.database_path);
    }
}
