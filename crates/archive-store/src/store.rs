//! # Store Contract
//!
//! The byte-level CRUD capability the archive engine is built on.
//!
//! ## Two Instances, One Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        ArchiveStore                                     │
//! │                                                                         │
//! │  ┌──────────────────────────┐      ┌──────────────────────────┐        │
//! │  │   StoreKind::Active      │      │   StoreKind::Deleted     │        │
//! │  │                          │      │                          │        │
//! │  │  items in normal use     │      │  trash, status=deleted   │        │
//! │  └──────────────────────────┘      └──────────────────────────┘        │
//! │                                                                         │
//! │  manifest()  → ordered set of paths                                    │
//! │  read(id)    → ArchiveItem        (NotFound if absent)                 │
//! │  upsert(item)                                                          │
//! │  delete(id)                       (NotFound if absent)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stores are the source of truth on cold start; the engine's lists are a
//! cache rebuilt from them.

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::fmt;

use archive_core::{ArchiveItem, ArchivePath, ItemId};

use crate::error::StoreResult;

// =============================================================================
// Store Kind
// =============================================================================

/// Which of the two archive stores an instance backs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKind {
    /// Items currently in normal use.
    Active,
    /// Soft-deleted items (trash).
    Deleted,
}

impl StoreKind {
    /// Returns the stable string form used as the storage location.
    pub const fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Active => "active",
            StoreKind::Deleted => "deleted",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Manifest
// =============================================================================

/// Ordered set of paths present in a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    paths: BTreeSet<ArchivePath>,
}

impl Manifest {
    /// Creates an empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the path is present.
    pub fn contains(&self, path: &ArchivePath) -> bool {
        self.paths.contains(path)
    }

    /// Iterates the paths in order.
    pub fn iter(&self) -> impl Iterator<Item = &ArchivePath> {
        self.paths.iter()
    }

    /// Number of paths.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Returns true if the store holds nothing.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl FromIterator<ArchivePath> for Manifest {
    fn from_iter<I: IntoIterator<Item = ArchivePath>>(iter: I) -> Self {
        Manifest {
            paths: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Manifest {
    type Item = ArchivePath;
    type IntoIter = std::collections::btree_set::IntoIter<ArchivePath>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.into_iter()
    }
}

// =============================================================================
// Store Trait
// =============================================================================

/// Path-addressed item storage.
///
/// Implementations own their durability and timeouts; the engine never
/// retries on their behalf.
#[async_trait]
pub trait ArchiveStore: Send + Sync {
    /// Which archive location this store backs.
    fn kind(&self) -> StoreKind;

    /// Lists every stored path.
    async fn manifest(&self) -> StoreResult<Manifest>;

    /// Reads one item.
    async fn read(&self, id: &ItemId) -> StoreResult<ArchiveItem>;

    /// Inserts or replaces the item at its path.
    async fn upsert(&self, item: &ArchiveItem) -> StoreResult<()>;

    /// Removes the item at the given identity.
    async fn delete(&self, id: &ItemId) -> StoreResult<()>;
}
