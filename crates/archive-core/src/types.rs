//! # Domain Types
//!
//! Core domain types used throughout the key archive.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  ArchivePath    │   │     ItemId      │   │   ItemStatus    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  "/nfc/a.nfc"   │──►│  derived from   │   │  Synchronized   │       │
//! │  │  normalized     │   │  the path       │   │  NotSynchronized│       │
//! │  │  absolute       │   │                 │   │  Deleted        │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌───────────────────────────────────────────────────────────────┐     │
//! │  │                       ArchiveItem                             │     │
//! │  │  path + content (opaque bytes) + status                       │     │
//! │  │  id() and name() are derived from path                        │     │
//! │  └───────────────────────────────────────────────────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Path-Derived Identity
//! An item has no identifier of its own: its identity IS its normalized path.
//! Renaming an item therefore produces a new identity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::validation::{validate_component, validate_name};

// =============================================================================
// Archive Path
// =============================================================================

/// Absolute, normalized location of an item inside an archive namespace.
///
/// ## Rules
/// - Starts with `/`
/// - Repeated separators collapse, a trailing separator is dropped
/// - No empty, `.` or `..` components
/// - Case-sensitive
///
/// ## Example
/// ```rust
/// use archive_core::ArchivePath;
///
/// let path: ArchivePath = "//subghz//garage.sub/".parse().unwrap();
/// assert_eq!(path.as_str(), "/subghz/garage.sub");
/// assert_eq!(path.name(), "garage.sub");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArchivePath(String);

impl ArchivePath {
    /// Parses and normalizes a path string.
    pub fn parse(raw: &str) -> CoreResult<Self> {
        if !raw.starts_with('/') {
            return Err(CoreError::invalid_path(raw, "must start with '/'"));
        }

        let mut normalized = String::with_capacity(raw.len());
        for component in raw.split('/').filter(|c| !c.is_empty()) {
            validate_component(component)
                .map_err(|e| CoreError::invalid_path(raw, e.to_string()))?;
            normalized.push('/');
            normalized.push_str(component);
        }

        if normalized.is_empty() {
            return Err(CoreError::invalid_path(raw, "points at the archive root"));
        }

        Ok(ArchivePath(normalized))
    }

    /// Returns the normalized path string.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the leaf segment (the item name).
    pub fn name(&self) -> &str {
        match self.0.rfind('/') {
            Some(idx) => &self.0[idx + 1..],
            None => &self.0,
        }
    }

    /// Returns the parent directory, `/` for top-level items.
    pub fn parent(&self) -> &str {
        match self.0.rfind('/') {
            Some(0) | None => "/",
            Some(idx) => &self.0[..idx],
        }
    }

    /// Returns the path components, root first.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|c| !c.is_empty())
    }

    /// Returns the sibling path with the leaf replaced by `name`.
    ///
    /// The name is validated and trimmed first.
    pub fn with_name(&self, name: &str) -> CoreResult<ArchivePath> {
        let name = validate_name(name)?;
        let parent = self.parent();

        let joined = if parent == "/" {
            format!("/{}", name)
        } else {
            format!("{}/{}", parent, name)
        };

        Ok(ArchivePath(joined))
    }
}

impl fmt::Display for ArchivePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl FromStr for ArchivePath {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ArchivePath::parse(s)
    }
}

impl TryFrom<String> for ArchivePath {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ArchivePath::parse(&value)
    }
}

impl TryFrom<&str> for ArchivePath {
    type Error = CoreError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        ArchivePath::parse(value)
    }
}

impl From<ArchivePath> for String {
    fn from(path: ArchivePath) -> Self {
        path.0
    }
}

impl AsRef<str> for ArchivePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// Item Identifier
// =============================================================================

/// Identity of an archive item, derived deterministically from its path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(ArchivePath);

impl ItemId {
    /// Returns the path this identity was derived from.
    #[inline]
    pub fn path(&self) -> &ArchivePath {
        &self.0
    }

    /// Returns the identity as a string.
    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<ArchivePath> for ItemId {
    fn from(path: ArchivePath) -> Self {
        ItemId(path)
    }
}

impl From<&ArchivePath> for ItemId {
    fn from(path: &ArchivePath) -> Self {
        ItemId(path.clone())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for ItemId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ArchivePath::parse(s).map(ItemId)
    }
}

// =============================================================================
// Item Status
// =============================================================================

/// Synchronization state of an item relative to the remote device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// The device holds the same version.
    Synchronized,
    /// Local changes not yet seen by the device.
    #[default]
    NotSynchronized,
    /// The item lives in the trash.
    Deleted,
}

impl ItemStatus {
    /// Returns the stable string form used in storage.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Synchronized => "synchronized",
            ItemStatus::NotSynchronized => "not_synchronized",
            ItemStatus::Deleted => "deleted",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "synchronized" => Ok(ItemStatus::Synchronized),
            "not_synchronized" => Ok(ItemStatus::NotSynchronized),
            "deleted" => Ok(ItemStatus::Deleted),
            other => Err(CoreError::Validation(
                crate::error::ValidationError::InvalidFormat {
                    field: "status".to_string(),
                    reason: format!("unknown status '{}'", other),
                },
            )),
        }
    }
}

// =============================================================================
// Archive Item
// =============================================================================

/// One archived unit: a path, an opaque payload and a sync status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ArchiveItem {
    /// Location within the archive namespace. Also the item's identity.
    #[ts(as = "String")]
    pub path: ArchivePath,

    /// Raw payload, never interpreted by the archive.
    pub content: Vec<u8>,

    /// Sync status as last reported by the device channel.
    pub status: ItemStatus,
}

impl ArchiveItem {
    /// Creates a new, not yet synchronized item.
    pub fn new(path: ArchivePath, content: impl Into<Vec<u8>>) -> Self {
        ArchiveItem {
            path,
            content: content.into(),
            status: ItemStatus::NotSynchronized,
        }
    }

    /// Returns the identity derived from the path.
    #[inline]
    pub fn id(&self) -> ItemId {
        ItemId::from(&self.path)
    }

    /// Returns the leaf segment of the path.
    #[inline]
    pub fn name(&self) -> &str {
        self.path.name()
    }

    /// Returns a copy of this item with the given status.
    pub fn with_status(mut self, status: ItemStatus) -> Self {
        self.status = status;
        self
    }

    /// Returns the item moved to a sibling path named `name`.
    ///
    /// Content and status are carried over unchanged.
    pub fn renamed(&self, name: &str) -> CoreResult<ArchiveItem> {
        Ok(ArchiveItem {
            path: self.path.with_name(name)?,
            content: self.content.clone(),
            status: self.status,
        })
    }

    /// Returns the content as UTF-8 text, if it is valid UTF-8.
    pub fn content_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.content).ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
