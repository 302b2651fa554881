//! # Archive Engine
//!
//! The actor that owns the active and deleted lists and mediates every
//! mutation through the two stores.
//!
//! ## Actor Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Archive Actor Architecture                        │
//! │                                                                         │
//! │  ArchiveHandle (Clone)                                                 │
//! │   │  upsert / delete / rename / wipe / restore / load / subscribe      │
//! │   ▼                                                                     │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐                │
//! │  │ command mpsc │   │ SyncEvent    │   │ shutdown     │                │
//! │  │ + oneshot    │   │ stream       │   │ mpsc         │                │
//! │  └──────┬───────┘   └──────┬───────┘   └──────┬───────┘                │
//! │         └──────────────────┼──────────────────┘                        │
//! │                            ▼                                            │
//! │                 ┌─────────────────────┐                                 │
//! │                 │ Archive::run        │  one operation at a time        │
//! │                 │ tokio::select!      │  store I/O, then lists,         │
//! │                 │                     │  then one snapshot              │
//! │                 └──────────┬──────────┘                                 │
//! │                            ▼                                            │
//! │           watch (latest snapshot)  +  broadcast (every snapshot)       │
//! │                            │                                            │
//! │                            ▼                                            │
//! │  get / items / deleted_items / is_synchronizing read `watch`           │
//! │  without waiting on I/O                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ordering
//! Every mutation writes the stores first and touches the lists last, then
//! publishes exactly one snapshot. A failed store call returns before the
//! lists change, so readers never see an item in both lists or an item gone
//! from Active before it is durably in Deleted.
//!
//! Commands are not cancellable: once queued, dropping the caller's future
//! does not stop the actor from applying it.

use futures_util::stream::{BoxStream, StreamExt};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{debug, error, info, warn};

use archive_core::{ArchiveItem, ItemId, ItemStatus};
use archive_store::{ArchiveStore, StoreResult};

use crate::channel::{SyncChannel, SyncEvent};
use crate::config::EngineSettings;
use crate::error::{ArchiveError, ArchiveResult};
use crate::state::{ArchiveSnapshot, ArchiveState};

// =============================================================================
// Public Types
// =============================================================================

/// What a device sync request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The device routine ran to completion.
    Completed,

    /// A load was in progress; nothing was started.
    Skipped,
}

/// Snapshot at subscription time plus every later snapshot.
///
/// Both halves are taken inside the actor, so no change published after
/// `current` can be missed by `next`.
#[derive(Debug)]
pub struct ArchiveSubscription {
    current: ArchiveSnapshot,
    updates: broadcast::Receiver<ArchiveSnapshot>,
}

impl ArchiveSubscription {
    /// Snapshot that was current when subscribing.
    pub fn current(&self) -> &ArchiveSnapshot {
        &self.current
    }

    /// Waits for the next published snapshot.
    ///
    /// Returns `None` once the engine has stopped. A subscriber that falls
    /// more than `snapshot_capacity` snapshots behind skips ahead to the
    /// oldest one still buffered.
    pub async fn next(&mut self) -> Option<ArchiveSnapshot> {
        loop {
            match self.updates.recv().await {
                Ok(snapshot) => return Some(snapshot),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Archive subscriber lagged behind");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

// =============================================================================
// Commands
// =============================================================================

type Reply<T> = oneshot::Sender<ArchiveResult<T>>;

/// Requests handled by the actor, each with its reply channel.
enum Command {
    Load { reply: Reply<()> },
    Upsert { item: ArchiveItem, reply: Reply<()> },
    Import { item: ArchiveItem, reply: Reply<bool> },
    Delete { id: ItemId, reply: Reply<()> },
    Rename { id: ItemId, name: String, reply: Reply<Option<ArchiveItem>> },
    Wipe { id: ItemId, reply: Reply<()> },
    WipeAll { reply: Reply<usize> },
    Restore { item: ArchiveItem, reply: Reply<()> },
    Subscribe { reply: oneshot::Sender<ArchiveSubscription> },
}

// =============================================================================
// Handle
// =============================================================================

/// Handle for talking to a running archive engine.
///
/// Cheap to clone; every clone addresses the same actor.
#[derive(Clone)]
pub struct ArchiveHandle {
    command_tx: mpsc::Sender<Command>,
    shutdown_tx: mpsc::Sender<oneshot::Sender<()>>,
    snapshot_rx: watch::Receiver<ArchiveSnapshot>,
    sync: Arc<dyn SyncChannel>,
}

impl ArchiveHandle {
    async fn request<T>(&self, command: impl FnOnce(Reply<T>) -> Command) -> ArchiveResult<T> {
        let (reply, response) = oneshot::channel();

        self.command_tx
            .send(command(reply))
            .await
            .map_err(|_| ArchiveError::ShuttingDown)?;

        // The reply sender is dropped unanswered only when the actor stops
        response.await.map_err(|_| ArchiveError::ShuttingDown)?
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Rebuilds both lists from the stores.
    ///
    /// All or nothing: on failure the previous lists stay in place.
    pub async fn load(&self) -> ArchiveResult<()> {
        self.request(|reply| Command::Load { reply }).await
    }

    /// Writes the item to the Active store and replaces or appends it.
    pub async fn upsert(&self, item: ArchiveItem) -> ArchiveResult<()> {
        self.request(|reply| Command::Upsert { item, reply }).await
    }

    /// Upserts the item only if no active item has its id.
    ///
    /// Returns true if it was inserted.
    pub async fn import_item(&self, item: ArchiveItem) -> ArchiveResult<bool> {
        self.request(|reply| Command::Import { item, reply }).await
    }

    /// Moves an active item to the trash. Absent ids are a no-op.
    pub async fn delete(&self, id: ItemId) -> ArchiveResult<()> {
        self.request(|reply| Command::Delete { id, reply }).await
    }

    /// Renames an active item within its folder.
    ///
    /// Returns the renamed item, or `None` if no active item has `id`.
    /// Fails with [`ArchiveError::AlreadyExists`] if the target name is
    /// taken, including when it equals the current name.
    ///
    /// The new path is written before the old one is removed. If removing the
    /// old path fails, both paths stay in the Active store and in the list,
    /// and the error is returned.
    pub async fn rename(
        &self,
        id: ItemId,
        new_name: impl Into<String>,
    ) -> ArchiveResult<Option<ArchiveItem>> {
        let name = new_name.into();
        self.request(|reply| Command::Rename { id, name, reply }).await
    }

    /// Permanently removes a trashed item. Absent ids are a no-op.
    pub async fn wipe(&self, id: ItemId) -> ArchiveResult<()> {
        self.request(|reply| Command::Wipe { id, reply }).await
    }

    /// Wipes every trashed item in list order, stopping at the first failure.
    ///
    /// Returns how many were wiped. On failure the items wiped before it are
    /// gone from the trash list and the rest remain.
    pub async fn wipe_all(&self) -> ArchiveResult<usize> {
        self.request(|reply| Command::WipeAll { reply }).await
    }

    /// Moves a trashed item back to Active.
    ///
    /// Fails with [`ArchiveError::RestoreConflict`] without touching
    /// anything if an active item already occupies the path.
    pub async fn restore(&self, item: ArchiveItem) -> ArchiveResult<()> {
        self.request(|reply| Command::Restore { item, reply }).await
    }

    /// Runs the device's sync routine unless a load is in progress.
    ///
    /// Failures are logged and returned; they never change the lists.
    pub async fn sync_with_device(&self) -> ArchiveResult<SyncOutcome> {
        if self.command_tx.is_closed() {
            return Err(ArchiveError::ShuttingDown);
        }

        if self.is_synchronizing() {
            debug!("Load in progress, skipping device sync");
            return Ok(SyncOutcome::Skipped);
        }

        match self.sync.sync_with_device().await {
            Ok(()) => {
                info!("Device sync complete");
                Ok(SyncOutcome::Completed)
            }
            Err(e) => {
                error!(?e, "Device sync failed");
                Err(e.into())
            }
        }
    }

    /// Subscribes to every snapshot published from now on.
    pub async fn subscribe(&self) -> ArchiveResult<ArchiveSubscription> {
        let (reply, response) = oneshot::channel();

        self.command_tx
            .send(Command::Subscribe { reply })
            .await
            .map_err(|_| ArchiveError::ShuttingDown)?;

        response.await.map_err(|_| ArchiveError::ShuttingDown)
    }

    /// Stops the actor. Later calls fail with [`ArchiveError::ShuttingDown`].
    pub async fn shutdown(&self) -> ArchiveResult<()> {
        let (ack, done) = oneshot::channel();

        self.shutdown_tx
            .send(ack)
            .await
            .map_err(|_| ArchiveError::ShuttingDown)?;

        done.await
            .map_err(|_| ArchiveError::ChannelError("Shutdown acknowledgement dropped".into()))
    }

    // =========================================================================
    // Queries (latest published snapshot, never wait on I/O)
    // =========================================================================

    /// Returns the active item with this id.
    pub fn get(&self, id: &ItemId) -> Option<ArchiveItem> {
        self.snapshot_rx.borrow().get(id).cloned()
    }

    /// Returns the active items.
    pub fn items(&self) -> Vec<ArchiveItem> {
        self.snapshot_rx.borrow().items.clone()
    }

    /// Returns the trashed items.
    pub fn deleted_items(&self) -> Vec<ArchiveItem> {
        self.snapshot_rx.borrow().deleted_items.clone()
    }

    /// Returns true while a load is reading the stores.
    pub fn is_synchronizing(&self) -> bool {
        self.snapshot_rx.borrow().is_synchronizing
    }

    /// Returns the latest published snapshot.
    pub fn snapshot(&self) -> ArchiveSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Returns a latest-value receiver for cheap polling.
    pub fn watch(&self) -> watch::Receiver<ArchiveSnapshot> {
        self.snapshot_rx.clone()
    }
}

// =============================================================================
// Actor
// =============================================================================

/// The archive engine actor.
///
/// Hosts construct exactly one per process and share its
/// [`ArchiveHandle`] with everything that reads or edits the archive.
pub struct Archive {
    pub(crate) engine: Engine,
    load_on_start: bool,
    events: BoxStream<'static, SyncEvent>,
    command_rx: mpsc::Receiver<Command>,
    shutdown_rx: mpsc::Receiver<oneshot::Sender<()>>,
}

/// Lists, collaborators and publishers. Every operation runs on this.
pub(crate) struct Engine {
    pub(crate) active: Arc<dyn ArchiveStore>,
    pub(crate) deleted: Arc<dyn ArchiveStore>,
    pub(crate) sync: Arc<dyn SyncChannel>,
    pub(crate) state: ArchiveState,
    snapshot_tx: watch::Sender<ArchiveSnapshot>,
    updates_tx: broadcast::Sender<ArchiveSnapshot>,
}

impl Archive {
    /// Creates the actor and its handle.
    ///
    /// Subscribes to the channel's events before returning, so nothing the
    /// device sends after this call is lost.
    pub fn new(
        active: Arc<dyn ArchiveStore>,
        deleted: Arc<dyn ArchiveStore>,
        sync: Arc<dyn SyncChannel>,
        settings: &EngineSettings,
    ) -> (Self, ArchiveHandle) {
        let events = sync.events();

        let (command_tx, command_rx) = mpsc::channel(settings.mailbox_capacity.max(1));
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let (snapshot_tx, snapshot_rx) = watch::channel(ArchiveSnapshot::default());
        let (updates_tx, _) = broadcast::channel(settings.snapshot_capacity.max(1));

        let archive = Archive {
            engine: Engine {
                active,
                deleted,
                sync: Arc::clone(&sync),
                state: ArchiveState::new(),
                snapshot_tx,
                updates_tx,
            },
            load_on_start: settings.load_on_start,
            events,
            command_rx,
            shutdown_rx,
        };

        let handle = ArchiveHandle {
            command_tx,
            shutdown_tx,
            snapshot_rx,
            sync,
        };

        (archive, handle)
    }

    /// Creates the actor, spawns it on the current tokio runtime and returns
    /// its handle. The initial load, if enabled, is the first thing it runs.
    pub fn spawn(
        active: Arc<dyn ArchiveStore>,
        deleted: Arc<dyn ArchiveStore>,
        sync: Arc<dyn SyncChannel>,
        settings: &EngineSettings,
    ) -> ArchiveHandle {
        let (archive, handle) = Archive::new(active, deleted, sync, settings);
        tokio::spawn(archive.run());
        handle
    }

    /// Runs the actor loop until shutdown or until every handle is dropped.
    pub async fn run(self) {
        let Archive {
            mut engine,
            load_on_start,
            events,
            mut command_rx,
            mut shutdown_rx,
        } = self;

        info!("Archive engine starting");

        if load_on_start {
            if let Err(e) = engine.load().await {
                error!(?e, "Initial archive load failed");
            }
        }

        let mut events = Some(events);

        loop {
            tokio::select! {
                biased;

                Some(ack) = shutdown_rx.recv() => {
                    info!("Archive engine shutting down");
                    command_rx.close();
                    let _ = ack.send(());
                    break;
                }

                command = command_rx.recv() => match command {
                    Some(command) => engine.handle_command(command).await,
                    None => {
                        info!("All archive handles dropped");
                        break;
                    }
                },

                event = next_event(&mut events) => match event {
                    Some(event) => engine.apply_event(event).await,
                    None => {
                        warn!("Sync event stream ended, serving commands only");
                        events = None;
                    }
                },
            }
        }

        info!("Archive engine stopped");
    }
}

impl Engine {
    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Load { reply } => {
                let _ = reply.send(self.load().await);
            }
            Command::Upsert { item, reply } => {
                let _ = reply.send(self.upsert(item).await);
            }
            Command::Import { item, reply } => {
                let _ = reply.send(self.import_item(item).await);
            }
            Command::Delete { id, reply } => {
                let _ = reply.send(self.delete(&id).await);
            }
            Command::Rename { id, name, reply } => {
                let _ = reply.send(self.rename(&id, &name).await);
            }
            Command::Wipe { id, reply } => {
                let _ = reply.send(self.wipe(&id).await);
            }
            Command::WipeAll { reply } => {
                let _ = reply.send(self.wipe_all().await);
            }
            Command::Restore { item, reply } => {
                let _ = reply.send(self.restore(item).await);
            }
            Command::Subscribe { reply } => {
                let subscription = ArchiveSubscription {
                    current: self.snapshot_tx.borrow().clone(),
                    updates: self.updates_tx.subscribe(),
                };
                let _ = reply.send(subscription);
            }
        }
    }

    /// Latest published snapshot.
    pub(crate) fn current(&self) -> ArchiveSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// Publishes the current lists as a new snapshot.
    pub(crate) fn publish(&mut self) {
        let snapshot = self.state.snapshot();
        debug!(
            revision = snapshot.revision,
            active = snapshot.items.len(),
            deleted = snapshot.deleted_items.len(),
            "Publishing archive snapshot"
        );

        self.snapshot_tx.send_replace(snapshot.clone());
        // No subscribers is fine
        let _ = self.updates_tx.send(snapshot);
    }

    // =========================================================================
    // Load
    // =========================================================================

    pub(crate) async fn load(&mut self) -> ArchiveResult<()> {
        info!("Loading archive");

        self.state.set_synchronizing(true);
        self.publish();

        let result = self.read_stores().await;
        self.state.set_synchronizing(false);

        let outcome = match result {
            Ok((items, deleted)) => {
                for id in self.state.replace(items, deleted) {
                    warn!(id = %id, "Item found in both stores, keeping the active copy");
                    self.drop_trash_row(&id).await;
                }
                info!(
                    active = self.state.active_len(),
                    deleted = self.state.deleted_len(),
                    "Archive loaded"
                );
                Ok(())
            }
            Err(e) => {
                warn!(?e, "Archive load aborted, keeping previous lists");
                Err(e)
            }
        };

        self.publish();
        outcome
    }

    async fn read_stores(&self) -> ArchiveResult<(Vec<ArchiveItem>, Vec<ArchiveItem>)> {
        let manifest = self.active.manifest().await?;
        let mut items = Vec::with_capacity(manifest.len());

        for path in manifest {
            let mut item = self.active.read(&ItemId::from(path)).await?;
            item.status = self.sync.status_of(&item).await?;
            items.push(item);
        }

        let manifest = self.deleted.manifest().await?;
        let mut deleted = Vec::with_capacity(manifest.len());

        for path in manifest {
            let item = self.deleted.read(&ItemId::from(path)).await?;
            deleted.push(item.with_status(ItemStatus::Deleted));
        }

        Ok((items, deleted))
    }

    // =========================================================================
    // Active Set
    // =========================================================================

    pub(crate) async fn upsert(&mut self, item: ArchiveItem) -> ArchiveResult<()> {
        self.active.upsert(&item).await?;

        let id = item.id();
        self.put_active(item).await;

        debug!(id = %id, "Upserted item");
        self.publish();
        Ok(())
    }

    pub(crate) async fn import_item(&mut self, item: ArchiveItem) -> ArchiveResult<bool> {
        if self.state.contains_active(&item.id()) {
            debug!(id = %item.id(), "Import skipped, item already active");
            return Ok(false);
        }

        self.upsert(item).await?;
        Ok(true)
    }

    pub(crate) async fn delete(&mut self, id: &ItemId) -> ArchiveResult<()> {
        let Some(item) = self.state.get(id).cloned() else {
            debug!(id = %id, "Delete of unknown item ignored");
            return Ok(());
        };

        let backup = self.write_backup(item).await?;
        ignore_not_found(self.active.delete(id).await)?;

        self.state.remove_active(id);
        self.state.put_deleted(backup);

        info!(id = %id, "Moved item to trash");
        self.publish();
        Ok(())
    }

    pub(crate) async fn rename(
        &mut self,
        id: &ItemId,
        new_name: &str,
    ) -> ArchiveResult<Option<ArchiveItem>> {
        let Some(current) = self.state.get(id).cloned() else {
            debug!(id = %id, "Rename of unknown item ignored");
            return Ok(None);
        };

        let renamed = current.renamed(new_name)?;
        let new_id = renamed.id();

        if self.state.contains_active(&new_id) {
            return Err(ArchiveError::already_exists(&renamed.path));
        }

        // New path first, so the content always exists in at least one place
        self.active.upsert(&renamed).await?;
        if let Err(e) = ignore_not_found(self.active.delete(id).await) {
            // Both paths are durable now; mirror that before reporting
            self.put_active(renamed).await;
            self.publish();
            return Err(e.into());
        }

        self.state.remove_active(id);
        self.put_active(renamed.clone()).await;

        info!(from = %id, to = %new_id, "Renamed item");
        self.publish();
        Ok(Some(renamed))
    }

    // =========================================================================
    // Deleted Set
    // =========================================================================

    pub(crate) async fn wipe(&mut self, id: &ItemId) -> ArchiveResult<()> {
        ignore_not_found(self.deleted.delete(id).await)?;

        if self.state.remove_deleted(id).is_some() {
            info!(id = %id, "Wiped item");
            self.publish();
        }

        Ok(())
    }

    pub(crate) async fn wipe_all(&mut self) -> ArchiveResult<usize> {
        let ids = self.state.deleted_ids();
        let mut wiped = 0;
        let mut failure = None;

        for id in ids {
            if let Err(e) = ignore_not_found(self.deleted.delete(&id).await) {
                error!(?e, id = %id, "Wipe failed, stopping");
                failure = Some(e);
                break;
            }

            self.state.remove_deleted(&id);
            wiped += 1;
        }

        if wiped > 0 {
            self.publish();
        }

        info!(wiped, "Wiped trash");
        match failure {
            Some(e) => Err(e.into()),
            None => Ok(wiped),
        }
    }

    pub(crate) async fn restore(&mut self, item: ArchiveItem) -> ArchiveResult<()> {
        let id = item.id();

        let occupied = self.state.contains_active(&id)
            || self.active.manifest().await?.contains(&item.path);
        if occupied {
            warn!(path = %item.path, "Restore target already exists, item stays in trash");
            return Err(ArchiveError::restore_conflict(&item.path));
        }

        let status = self.sync.status_of(&item).await?;
        let restored = item.with_status(status);

        self.active.upsert(&restored).await?;
        let trash_result = ignore_not_found(self.deleted.delete(&id).await);

        // Active copy is durable either way; it shadows any leftover trash row
        self.state.put_active(restored);
        info!(id = %id, status = %status, "Restored item");
        self.publish();

        trash_result.map_err(ArchiveError::from)
    }

    /// Replaces or appends an active item whose Active store write has
    /// already succeeded.
    ///
    /// A trashed copy with the same id is dropped from the trash list and
    /// from the Deleted store, so a later load or `wipe_all` cannot bring it
    /// back.
    pub(crate) async fn put_active(&mut self, item: ArchiveItem) {
        let id = item.id();
        if self.state.put_active(item) {
            debug!(id = %id, "Active item shadows trashed copy");
            self.drop_trash_row(&id).await;
        }
    }

    /// Removes a shadowed row from the Deleted store. Failures are logged;
    /// the next load retries.
    async fn drop_trash_row(&self, id: &ItemId) {
        if let Err(e) = ignore_not_found(self.deleted.delete(id).await) {
            warn!(?e, id = %id, "Failed to drop shadowed trash row");
        }
    }

    // =========================================================================
    // Backup
    // =========================================================================

    /// Writes a trashed copy of the item to the Deleted store.
    ///
    /// The caller puts the returned copy in the trash list once the rest of
    /// its store work has succeeded.
    pub(crate) async fn write_backup(&self, item: ArchiveItem) -> ArchiveResult<ArchiveItem> {
        let backup = item.with_status(ItemStatus::Deleted);
        self.deleted.upsert(&backup).await?;
        debug!(id = %backup.id(), "Backed up item to trash");
        Ok(backup)
    }
}

/// Treats a store NotFound as success.
pub(crate) fn ignore_not_found(result: StoreResult<()>) -> StoreResult<()> {
    match result {
        Err(e) if e.is_not_found() => Ok(()),
        other => other,
    }
}

async fn next_event(events: &mut Option<BoxStream<'static, SyncEvent>>) -> Option<SyncEvent> {
    match events {
        Some(stream) => stream.next().await,
        None => std::future::pending().await,
    }
}
