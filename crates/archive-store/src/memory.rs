//! # In-Memory Store
//!
//! [`ArchiveStore`] backed by a map. Used for tests and for hosts that keep
//! the archive purely in memory.
//!
//! Clones share the same underlying map, so a test can hand one clone to
//! the engine and inspect the other.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use archive_core::{ArchiveItem, ItemId};

use crate::error::{StoreError, StoreResult};
use crate::store::{ArchiveStore, Manifest, StoreKind};

/// Map-backed archive store.
#[derive(Debug, Clone)]
pub struct MemoryArchiveStore {
    kind: StoreKind,
    items: Arc<RwLock<BTreeMap<ItemId, ArchiveItem>>>,
}

impl MemoryArchiveStore {
    /// Creates an empty store.
    pub fn new(kind: StoreKind) -> Self {
        MemoryArchiveStore {
            kind,
            items: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Creates a store pre-populated with the given items.
    pub fn with_items(kind: StoreKind, items: impl IntoIterator<Item = ArchiveItem>) -> Self {
        let map = items.into_iter().map(|item| (item.id(), item)).collect();
        MemoryArchiveStore {
            kind,
            items: Arc::new(RwLock::new(map)),
        }
    }

    /// Returns true if an item with this identity is stored.
    pub async fn contains(&self, id: &ItemId) -> bool {
        self.items.read().await.contains_key(id)
    }

    /// Returns a copy of the stored item, if any.
    pub async fn get(&self, id: &ItemId) -> Option<ArchiveItem> {
        self.items.read().await.get(id).cloned()
    }

    /// Number of stored items.
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    /// Returns true if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl ArchiveStore for MemoryArchiveStore {
    fn kind(&self) -> StoreKind {
        self.kind
    }

    async fn manifest(&self) -> StoreResult<Manifest> {
        let items = self.items.read().await;
        Ok(items.values().map(|item| item.path.clone()).collect())
    }

    async fn read(&self, id: &ItemId) -> StoreResult<ArchiveItem> {
        self.items
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(self.kind, id))
    }

    async fn upsert(&self, item: &ArchiveItem) -> StoreResult<()> {
        debug!(store = %self.kind, id = %item.id(), "Upserting item");
        self.items.write().await.insert(item.id(), item.clone());
        Ok(())
    }

    async fn delete(&self, id: &ItemId) -> StoreResult<()> {
        match self.items.write().await.remove(id) {
            Some(_) => {
                debug!(store = %self.kind, id = %id, "Deleted item");
                Ok(())
            }
            None => Err(StoreError::not_found(self.kind, id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archive_core::ArchivePath;

    fn item(path: &str) -> ArchiveItem {
        ArchiveItem::new(path.parse::<ArchivePath>().unwrap(), path.as_bytes())
    }

    #[tokio::test]
    async fn test_crud() {
        let store = MemoryArchiveStore::new(StoreKind::Active);
        let a = item("/a.txt");

        store.upsert(&a).await.unwrap();
        assert_eq!(store.read(&a.id()).await.unwrap(), a);
        assert_eq!(store.manifest().await.unwrap().len(), 1);

        store.delete(&a.id()).await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_missing_item_is_not_found() {
        let store = MemoryArchiveStore::new(StoreKind::Deleted);
        let id = item("/gone.txt").id();

        assert!(store.read(&id).await.unwrap_err().is_not_found());
        assert!(store.delete(&id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MemoryArchiveStore::with_items(StoreKind::Active, vec![item("/a.txt")]);
        let observer = store.clone();

        store.upsert(&item("/b.txt")).await.unwrap();
        assert_eq!(observer.len().await, 2);
    }
}
