//! # archive-sync: Archive Engine for the Key Archive
//!
//! This crate keeps the local key archive consistent across three places:
//! the Active store, the Deleted (trash) store, and the remote device.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Archive Engine                                   │
//! │                                                                         │
//! │   UI / CLI                                Remote device                 │
//! │      │                                         │                        │
//! │      │ ArchiveHandle                           │ SyncChannel            │
//! │      ▼                                         ▼                        │
//! │  ┌───────────────────────────────────────────────────────────────┐     │
//! │  │                      Archive actor                            │     │
//! │  │                                                               │     │
//! │  │   commands (upsert, delete, rename, wipe, restore, load)      │     │
//! │  │   events   (imported, exported, deleted)                      │     │
//! │  │                                                               │     │
//! │  │   ┌──────────────┐                    ┌──────────────┐        │     │
//! │  │   │ active list  │  ── delete ──►     │ deleted list │        │     │
//! │  │   │              │  ◄── restore ──    │   (trash)    │        │     │
//! │  │   └──────┬───────┘                    └──────┬───────┘        │     │
//! │  └──────────┼───────────────────────────────────┼────────────────┘     │
//! │             ▼                                   ▼                       │
//! │      Active store                         Deleted store                 │
//! │                                                                         │
//! │   Every change publishes an ArchiveSnapshot (watch + broadcast).       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use std::sync::Arc;
//! use archive_store::{Database, DbConfig};
//! use archive_sync::{Archive, ArchiveConfig, LocalSyncChannel};
//!
//! let config = ArchiveConfig::load_or_default(None);
//! let db = Database::new(DbConfig::new(config.database_path())).await?;
//!
//! let archive = Archive::spawn(
//!     Arc::new(db.active_store()),
//!     Arc::new(db.deleted_store()),
//!     Arc::new(LocalSyncChannel::detached()),
//!     &config.engine,
//! );
//!
//! archive.load().await?;
//! for item in archive.items() {
//!     println!("{} ({})", item.path, item.status);
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod archive;
pub mod channel;
pub mod config;
pub mod error;
pub mod state;

mod inbound;

#[cfg(test)]
mod properties;

// =============================================================================
// Re-exports
// =============================================================================

pub use archive::{Archive, ArchiveHandle, ArchiveSubscription, SyncOutcome};
pub use channel::{
    LocalSyncChannel, SyncChannel, SyncChannelError, SyncChannelResult, SyncEvent,
};
pub use config::{ArchiveConfig, DeviceConfig, EngineSettings, StorageConfig};
pub use error::{ArchiveError, ArchiveResult};
pub use state::ArchiveSnapshot;
