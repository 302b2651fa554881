//! # archive-core: Pure Item Model for the Key Archive
//!
//! This crate defines what an archived item IS: its path-derived identity,
//! its opaque content and its synchronization status. It has zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Key Archive Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Host (CLI, UI bindings)                         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        archive-sync (Archive engine, sync channel contract)     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        archive-store (Active + Deleted stores)                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ archive-core (THIS CRATE) ★                     │   │
//! │  │   ArchivePath • ItemId • ItemStatus • ArchiveItem • validation  │   │
//! │  │   NO I/O • NO ASYNC • PURE FUNCTIONS                            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (ArchivePath, ItemId, ItemStatus, ArchiveItem)
//! - [`error`] - Domain error types
//! - [`validation`] - Name validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use archive_core::{ArchiveItem, ArchivePath, ItemStatus};
//!
//! let path: ArchivePath = "/subghz/garage.sub".parse().unwrap();
//! let item = ArchiveItem::new(path, "Filetype: Flipper SubGhz Key File");
//!
//! assert_eq!(item.name(), "garage.sub");
//! assert_eq!(item.id().as_str(), "/subghz/garage.sub");
//! assert_eq!(item.status, ItemStatus::NotSynchronized);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of an item name in bytes.
///
/// Matches the common filesystem limit for a single path component on the
/// device side.
pub const MAX_NAME_LENGTH: usize = 255;
