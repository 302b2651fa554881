//! # Sync Channel
//!
//! The engine's view of the remote peripheral device.
//!
//! ## Channel Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          SyncChannel                                    │
//! │                                                                         │
//! │  status_of(item)     → ItemStatus         (Io on failure)              │
//! │  events()            → stream of SyncEvent                             │
//! │                         lazy, ordered, never restarts                  │
//! │  sync_with_device()  → ()                 (Io | DeviceUnavailable)     │
//! │                                                                         │
//! │  EVENTS                                                                │
//! │  ──────                                                                │
//! │  Imported(id)  device pushed new content for id into the Active store  │
//! │  Exported(id)  device confirmed it holds the current content of id     │
//! │  Deleted(id)   device removed id; mirror into the local trash          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`LocalSyncChannel`] is an in-process channel for hosts with no device
//! attached, and for tests.

use async_trait::async_trait;
use futures_util::stream::{BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, RwLock};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, info, warn};

use archive_core::{ArchiveItem, ItemId, ItemStatus};

/// Buffered events per subscriber before a slow reader starts lagging.
const EVENT_BUFFER: usize = 256;

// =============================================================================
// Events
// =============================================================================

/// Change notification pushed by the remote device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum SyncEvent {
    /// New content for the item has landed in the Active store.
    Imported(ItemId),

    /// The device holds the current content of the item.
    Exported(ItemId),

    /// The device removed the item.
    Deleted(ItemId),
}

impl SyncEvent {
    /// Returns the item this event refers to.
    pub fn id(&self) -> &ItemId {
        match self {
            SyncEvent::Imported(id) | SyncEvent::Exported(id) | SyncEvent::Deleted(id) => id,
        }
    }

    /// Returns the event name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SyncEvent::Imported(_) => "imported",
            SyncEvent::Exported(_) => "exported",
            SyncEvent::Deleted(_) => "deleted",
        }
    }
}

impl fmt::Display for SyncEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind(), self.id())
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Failures reported by the device side.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncChannelError {
    /// Communication with the device failed.
    #[error("Device I/O failed: {0}")]
    Io(String),

    /// No device is attached or reachable.
    #[error("Device is not available")]
    DeviceUnavailable,
}

/// Result type for sync channel calls.
pub type SyncChannelResult<T> = Result<T, SyncChannelError>;

// =============================================================================
// Channel Trait
// =============================================================================

/// Abstraction over communication with the remote device.
#[async_trait]
pub trait SyncChannel: Send + Sync {
    /// Asks the device for the current status of an item.
    async fn status_of(&self, item: &ArchiveItem) -> SyncChannelResult<ItemStatus>;

    /// Subscribes to device change events.
    ///
    /// The engine calls this once, before its first load, and holds the
    /// stream for its whole lifetime.
    fn events(&self) -> BoxStream<'static, SyncEvent>;

    /// Runs the device's own synchronization routine.
    async fn sync_with_device(&self) -> SyncChannelResult<()>;
}

// =============================================================================
// Local Channel
// =============================================================================

/// Broadcast-backed channel living in the same process as the engine.
///
/// Clones share state, so a host can hand one clone to the engine and keep
/// another to [`emit`](LocalSyncChannel::emit) events.
#[derive(Debug, Clone)]
pub struct LocalSyncChannel {
    inner: Arc<LocalInner>,
}

#[derive(Debug)]
struct LocalInner {
    events_tx: broadcast::Sender<SyncEvent>,
    default_status: RwLock<ItemStatus>,
    overrides: RwLock<HashMap<ItemId, ItemStatus>>,
    device_available: AtomicBool,
    sync_count: AtomicUsize,
}

impl LocalSyncChannel {
    /// Creates a channel with an attached device reporting every item as
    /// not synchronized.
    pub fn new() -> Self {
        Self::with_default_status(ItemStatus::NotSynchronized)
    }

    /// Creates a channel whose device reports `status` for every item.
    pub fn with_default_status(status: ItemStatus) -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_BUFFER);

        LocalSyncChannel {
            inner: Arc::new(LocalInner {
                events_tx,
                default_status: RwLock::new(status),
                overrides: RwLock::new(HashMap::new()),
                device_available: AtomicBool::new(true),
                sync_count: AtomicUsize::new(0),
            }),
        }
    }

    /// Creates a channel with no device attached.
    pub fn detached() -> Self {
        let channel = Self::new();
        channel.set_device_available(false);
        channel
    }

    /// Pushes an event to every subscriber. Returns how many received it.
    pub fn emit(&self, event: SyncEvent) -> usize {
        debug!(event = %event, "Emitting local sync event");
        self.inner.events_tx.send(event).unwrap_or(0)
    }

    /// Changes the status reported for items without an override.
    pub async fn set_default_status(&self, status: ItemStatus) {
        *self.inner.default_status.write().await = status;
    }

    /// Reports `status` for one item regardless of the default.
    pub async fn set_status(&self, id: ItemId, status: ItemStatus) {
        self.inner.overrides.write().await.insert(id, status);
    }

    /// Attaches or detaches the simulated device.
    pub fn set_device_available(&self, available: bool) {
        self.inner
            .device_available
            .store(available, Ordering::SeqCst);
    }

    /// Returns true if a device is attached.
    pub fn is_device_available(&self) -> bool {
        self.inner.device_available.load(Ordering::SeqCst)
    }

    /// Number of completed device syncs.
    pub fn sync_count(&self) -> usize {
        self.inner.sync_count.load(Ordering::SeqCst)
    }
}

impl Default for LocalSyncChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SyncChannel for LocalSyncChannel {
    async fn status_of(&self, item: &ArchiveItem) -> SyncChannelResult<ItemStatus> {
        if let Some(status) = self.inner.overrides.read().await.get(&item.id()) {
            return Ok(*status);
        }
        Ok(*self.inner.default_status.read().await)
    }

    fn events(&self) -> BoxStream<'static, SyncEvent> {
        BroadcastStream::new(self.inner.events_tx.subscribe())
            .filter_map(|received| async move {
                match received {
                    Ok(event) => Some(event),
                    Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                        warn!(skipped, "Sync event subscriber lagged, events dropped");
                        None
                    }
                }
            })
            .boxed()
    }

    async fn sync_with_device(&self) -> SyncChannelResult<()> {
        if !self.is_device_available() {
            return Err(SyncChannelError::DeviceUnavailable);
        }

        let count = self.inner.sync_count.fetch_add(1, Ordering::SeqCst) + 1;
        info!(count, "Local device sync complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archive_core::ArchivePath;

    fn item(path: &str) -> ArchiveItem {
        ArchiveItem::new(path.parse::<ArchivePath>().unwrap(), "data")
    }

    #[tokio::test]
    async fn test_status_overrides() {
        let channel = LocalSyncChannel::with_default_status(ItemStatus::Synchronized);
        let a = item("/a.txt");
        let b = item("/b.txt");

        channel
            .set_status(b.id(), ItemStatus::NotSynchronized)
            .await;

        assert_eq!(channel.status_of(&a).await.unwrap(), ItemStatus::Synchronized);
        assert_eq!(
            channel.status_of(&b).await.unwrap(),
            ItemStatus::NotSynchronized
        );
    }

    #[tokio::test]
    async fn test_events_are_delivered_in_order() {
        let channel = LocalSyncChannel::new();
        let mut events = channel.events();

        let id = item("/a.txt").id();
        assert_eq!(channel.emit(SyncEvent::Imported(id.clone())), 1);
        channel.emit(SyncEvent::Exported(id.clone()));

        assert_eq!(events.next().await, Some(SyncEvent::Imported(id.clone())));
        assert_eq!(events.next().await, Some(SyncEvent::Exported(id)));
    }

    #[tokio::test]
    async fn test_detached_device() {
        let channel = LocalSyncChannel::detached();
        assert_eq!(
            channel.sync_with_device().await,
            Err(SyncChannelError::DeviceUnavailable)
        );

        channel.set_device_available(true);
        channel.sync_with_device().await.unwrap();
        assert_eq!(channel.sync_count(), 1);
    }

    #[test]
    fn test_event_serialization() {
        let event = SyncEvent::Deleted("/nfc/door.nfc".parse().unwrap());
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"kind":"deleted","id":"/nfc/door.nfc"}"#);
        assert_eq!(event.to_string(), "deleted(/nfc/door.nfc)");
    }
}
