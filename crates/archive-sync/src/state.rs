//! # Archive State
//!
//! The two in-memory lists owned by the archive actor, and the immutable
//! snapshots it publishes after every change.
//!
//! ## List Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         ArchiveState                                    │
//! │                                                                         │
//! │  items (active)                  deleted (trash)                        │
//! │  ──────────────                  ───────────────                        │
//! │  • one entry per id              • one entry per id                     │
//! │  • replace = remove + append     • replace = remove + append            │
//! │                                                                         │
//! │  An id entering `items` drops any `deleted` entry with the same id,    │
//! │  so the two id sets never overlap in a published snapshot.             │
//! │                                                                         │
//! │  snapshot() → ArchiveSnapshot { items, deleted_items,                  │
//! │                                 is_synchronizing, revision }           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lists are plain vectors; lookups are linear scans over tens to low
//! hundreds of items.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use archive_core::{ArchiveItem, ItemId, ItemStatus};

// =============================================================================
// Snapshot
// =============================================================================

/// Immutable view of the archive at one revision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ArchiveSnapshot {
    /// Active items in list order.
    pub items: Vec<ArchiveItem>,

    /// Trashed items in list order.
    pub deleted_items: Vec<ArchiveItem>,

    /// True while a load is reading the stores.
    pub is_synchronizing: bool,

    /// Increases by one with every published change.
    #[ts(type = "number")]
    pub revision: u64,
}

impl ArchiveSnapshot {
    /// Returns the active item with this id.
    pub fn get(&self, id: &ItemId) -> Option<&ArchiveItem> {
        self.items.iter().find(|item| &item.id() == id)
    }

    /// Returns the trashed item with this id.
    pub fn get_deleted(&self, id: &ItemId) -> Option<&ArchiveItem> {
        self.deleted_items.iter().find(|item| &item.id() == id)
    }

    /// Returns true if an active item has this id.
    pub fn contains(&self, id: &ItemId) -> bool {
        self.get(id).is_some()
    }
}

// =============================================================================
// State
// =============================================================================

/// Mutable lists behind the snapshots. Only the actor touches this.
#[derive(Debug, Default)]
pub(crate) struct ArchiveState {
    items: Vec<ArchiveItem>,
    deleted: Vec<ArchiveItem>,
    synchronizing: bool,
    revision: u64,
}

impl ArchiveState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Active item with this id.
    pub(crate) fn get(&self, id: &ItemId) -> Option<&ArchiveItem> {
        self.items.iter().find(|item| &item.id() == id)
    }

    pub(crate) fn contains_active(&self, id: &ItemId) -> bool {
        self.get(id).is_some()
    }

    /// Ids of the trashed items, in list order.
    pub(crate) fn deleted_ids(&self) -> Vec<ItemId> {
        self.deleted.iter().map(ArchiveItem::id).collect()
    }

    pub(crate) fn active_len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn deleted_len(&self) -> usize {
        self.deleted.len()
    }

    /// Replaces or appends an active item.
    ///
    /// Returns true if a trash entry with the same id was dropped.
    pub(crate) fn put_active(&mut self, item: ArchiveItem) -> bool {
        let id = item.id();
        self.items.retain(|existing| existing.id() != id);
        self.items.push(item);
        self.remove_deleted(&id).is_some()
    }

    pub(crate) fn remove_active(&mut self, id: &ItemId) -> Option<ArchiveItem> {
        let index = self.items.iter().position(|item| &item.id() == id)?;
        Some(self.items.remove(index))
    }

    /// Replaces or appends a trashed item.
    pub(crate) fn put_deleted(&mut self, item: ArchiveItem) {
        let id = item.id();
        self.deleted.retain(|existing| existing.id() != id);
        self.deleted.push(item);
    }

    pub(crate) fn remove_deleted(&mut self, id: &ItemId) -> Option<ArchiveItem> {
        let index = self.deleted.iter().position(|item| &item.id() == id)?;
        Some(self.deleted.remove(index))
    }

    /// Sets the status of an active item in place.
    ///
    /// Returns true only if the stored status actually changed.
    pub(crate) fn set_status(&mut self, id: &ItemId, status: ItemStatus) -> bool {
        match self.items.iter_mut().find(|item| &item.id() == id) {
            Some(item) if item.status != status => {
                item.status = status;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn set_synchronizing(&mut self, synchronizing: bool) {
        self.synchronizing = synchronizing;
    }

    /// Replaces both lists with freshly loaded content.
    ///
    /// Duplicate ids keep their first occurrence. A trashed id that is also
    /// active is left out of the trash list; those ids are returned so the
    /// caller can report them.
    pub(crate) fn replace(
        &mut self,
        items: Vec<ArchiveItem>,
        deleted: Vec<ArchiveItem>,
    ) -> Vec<ItemId> {
        self.items.clear();
        for item in items {
            if !self.contains_active(&item.id()) {
                self.items.push(item);
            }
        }

        self.deleted.clear();
        let mut shadowed = Vec::new();
        for item in deleted {
            let id = item.id();
            if self.contains_active(&id) {
                shadowed.push(id);
            } else if !self.deleted.iter().any(|existing| existing.id() == id) {
                self.deleted.push(item);
            }
        }

        shadowed
    }

    /// Captures the current lists under a new revision.
    pub(crate) fn snapshot(&mut self) -> ArchiveSnapshot {
        self.revision += 1;

        ArchiveSnapshot {
            items: self.items.clone(),
            deleted_items: self.deleted.clone(),
            is_synchronizing: self.synchronizing,
            revision: self.revision,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(path: &str, status: ItemStatus) -> ArchiveItem {
        ArchiveItem::new(path.parse().unwrap(), path.as_bytes()).with_status(status)
    }

    fn id(path: &str) -> ItemId {
        path.parse().unwrap()
    }

    #[test]
    fn test_put_active_moves_replacement_to_end() {
        let mut state = ArchiveState::new();
        state.put_active(item("/a.txt", ItemStatus::NotSynchronized));
        state.put_active(item("/b.txt", ItemStatus::NotSynchronized));
        state.put_active(item("/a.txt", ItemStatus::Synchronized));

        let snapshot = state.snapshot();
        let paths: Vec<&str> = snapshot.items.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["/b.txt", "/a.txt"]);
        assert_eq!(
            snapshot.get(&id("/a.txt")).unwrap().status,
            ItemStatus::Synchronized
        );
    }

    #[test]
    fn test_active_shadows_trash() {
        let mut state = ArchiveState::new();
        state.put_deleted(item("/a.txt", ItemStatus::Deleted));

        assert!(state.put_active(item("/a.txt", ItemStatus::NotSynchronized)));
        assert_eq!(state.deleted_len(), 0);
        assert!(!state.put_active(item("/b.txt", ItemStatus::NotSynchronized)));
    }

    #[test]
    fn test_put_deleted_keeps_one_entry_per_id() {
        let mut state = ArchiveState::new();
        state.put_deleted(item("/a.txt", ItemStatus::Deleted));
        state.put_deleted(item("/a.txt", ItemStatus::Deleted));

        assert_eq!(state.deleted_ids(), vec![id("/a.txt")]);
    }

    #[test]
    fn test_set_status_reports_change() {
        let mut state = ArchiveState::new();
        state.put_active(item("/a.txt", ItemStatus::NotSynchronized));

        assert!(state.set_status(&id("/a.txt"), ItemStatus::Synchronized));
        assert!(!state.set_status(&id("/a.txt"), ItemStatus::Synchronized));
        assert!(!state.set_status(&id("/missing.txt"), ItemStatus::Synchronized));
    }

    #[test]
    fn test_replace_reconciles_overlap() {
        let mut state = ArchiveState::new();
        state.put_active(item("/stale.txt", ItemStatus::Synchronized));

        let shadowed = state.replace(
            vec![
                item("/a.txt", ItemStatus::Synchronized),
                item("/b.txt", ItemStatus::Synchronized),
            ],
            vec![
                item("/b.txt", ItemStatus::Deleted),
                item("/c.txt", ItemStatus::Deleted),
            ],
        );

        assert_eq!(shadowed, vec![id("/b.txt")]);
        assert_eq!(state.active_len(), 2);
        assert!(!state.contains_active(&id("/stale.txt")));
        assert_eq!(state.deleted_ids(), vec![id("/c.txt")]);
    }

    #[test]
    fn test_snapshot_revision_increases() {
        let mut state = ArchiveState::new();
        let first = state.snapshot();
        state.set_synchronizing(true);
        let second = state.snapshot();

        assert_eq!(first.revision + 1, second.revision);
        assert!(second.is_synchronizing);
        assert!(!first.is_synchronizing);
    }
}
