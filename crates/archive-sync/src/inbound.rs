//! # Inbound Event Handling
//!
//! Applies change events from the remote device to the archive.
//!
//! ## Event Effects
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Inbound Event Handling                             │
//! │                                                                         │
//! │  IMPORTED(id)                                                          │
//! │  ────────────                                                          │
//! │  • Re-read the item from the Active store (device wrote new content)   │
//! │  • status = synchronized                                               │
//! │  • Replace in the active list (remove, then append)                    │
//! │                                                                         │
//! │  EXPORTED(id)                                                          │
//! │  ────────────                                                          │
//! │  • If active: status = synchronized in place                           │
//! │  • No store read; applying it twice changes nothing the second time    │
//! │                                                                         │
//! │  DELETED(id)                                                           │
//! │  ───────────                                                           │
//! │  • If active: write a trashed copy to the Deleted store                │
//! │  • Drop from the active list, add to the trash list                    │
//! │  • Active store is left alone (the device already removed it)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Events run inside the actor one at a time, in arrival order, between
//! commands. A failed event is logged and the next one is processed.

use tracing::{debug, error, info};

use archive_core::{ItemId, ItemStatus};

use crate::archive::Engine;
use crate::channel::SyncEvent;
use crate::error::ArchiveResult;

impl Engine {
    /// Applies one device event, logging any failure.
    pub(crate) async fn apply_event(&mut self, event: SyncEvent) {
        debug!(event = %event, "Applying sync event");

        let result = match &event {
            SyncEvent::Imported(id) => self.on_imported(id).await,
            SyncEvent::Exported(id) => {
                self.on_exported(id);
                Ok(())
            }
            SyncEvent::Deleted(id) => self.on_deleted(id).await,
        };

        if let Err(e) = result {
            error!(?e, event = %event, "Failed to apply sync event");
        }
    }

    async fn on_imported(&mut self, id: &ItemId) -> ArchiveResult<()> {
        let item = self
            .active
            .read(id)
            .await?
            .with_status(ItemStatus::Synchronized);

        self.put_active(item).await;

        info!(id = %id, "Imported item from device");
        self.publish();
        Ok(())
    }

    fn on_exported(&mut self, id: &ItemId) {
        if self.state.set_status(id, ItemStatus::Synchronized) {
            debug!(id = %id, "Item exported to device");
            self.publish();
        }
    }

    async fn on_deleted(&mut self, id: &ItemId) -> ArchiveResult<()> {
        let Some(item) = self.state.get(id).cloned() else {
            debug!(id = %id, "Device deleted an item that is not active");
            return Ok(());
        };

        let backup = self.write_backup(item).await?;

        self.state.remove_active(id);
        self.state.put_deleted(backup);

        info!(id = %id, "Device deleted item, moved to trash");
        self.publish();
        Ok(())
    }
}
