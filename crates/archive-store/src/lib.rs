//! # archive-store: Store Layer for the Key Archive
//!
//! This crate provides the two durable stores the archive engine reads
//! from and writes to: the Active store and the Deleted (trash) store.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Key Archive Data Flow                            │
//! │                                                                         │
//! │  Archive engine (archive-sync)                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   archive-store (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ ArchiveStore  │    │   Database    │    │  Migrations  │  │   │
//! │  │   │  (store.rs)   │    │   (pool.rs)   │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ Memory impl   │    │ SqlitePool    │    │ 001_archive_ │  │   │
//! │  │   │ SQLite impl   │◄───│ active/trash  │    │   items.sql  │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   one table, rows keyed by (location, path)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - The store contract, [`StoreKind`] and [`Manifest`]
//! - [`memory`] - Map-backed store
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`repository`] - SQLite-backed store
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use archive_store::{ArchiveStore, Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/archive.db")).await?;
//!
//! let active = db.active_store();
//! let trash = db.deleted_store();
//! let manifest = active.manifest().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use memory::MemoryArchiveStore;
pub use pool::{Database, DbConfig};
pub use store::{ArchiveStore, Manifest, StoreKind};

// Repository re-exports for convenience
pub use repository::items::SqliteArchiveStore;
