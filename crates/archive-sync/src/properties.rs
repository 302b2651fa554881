//! Random operation sequences checked against the list invariants.
//!
//! Each case drives an engine directly (no actor) over memory stores.
//! Device events are preceded by the store write the device itself makes,
//! so after every step the lists must mirror the two stores exactly.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use proptest::prelude::*;

use archive_core::{ArchiveItem, ItemId};
use archive_store::{ArchiveStore, MemoryArchiveStore, StoreKind};

use crate::archive::{Archive, Engine};
use crate::channel::{LocalSyncChannel, SyncEvent};
use crate::config::EngineSettings;
use crate::error::ArchiveError;
use crate::state::ArchiveSnapshot;

const PATHS: [&str; 4] = ["/k/a.key", "/k/b.key", "/k/c.key", "/d.key"];
const NAMES: [&str; 3] = ["a.key", "b.key", "c.key"];

#[derive(Debug, Clone)]
enum Op {
    Upsert { path: usize, content: u8 },
    Delete(usize),
    Rename { path: usize, name: usize },
    /// Index into the current trash list.
    Restore(usize),
    Wipe(usize),
    WipeAll,
    Imported { path: usize, content: u8 },
    Exported(usize),
    Deleted(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let path = 0..PATHS.len();
    prop_oneof![
        3 => (path.clone(), any::<u8>())
            .prop_map(|(path, content)| Op::Upsert { path, content }),
        2 => path.clone().prop_map(Op::Delete),
        2 => (path.clone(), 0..NAMES.len())
            .prop_map(|(path, name)| Op::Rename { path, name }),
        2 => (0..PATHS.len()).prop_map(Op::Restore),
        1 => (0..PATHS.len()).prop_map(Op::Wipe),
        1 => Just(Op::WipeAll),
        1 => (path.clone(), any::<u8>())
            .prop_map(|(path, content)| Op::Imported { path, content }),
        1 => path.clone().prop_map(Op::Exported),
        1 => path.prop_map(Op::Deleted),
    ]
}

fn id(path: usize) -> ItemId {
    PATHS[path].parse().unwrap()
}

fn item(path: usize, content: u8) -> ArchiveItem {
    ArchiveItem::new(PATHS[path].parse().unwrap(), vec![content])
}

fn engine_over(active: &MemoryArchiveStore, deleted: &MemoryArchiveStore) -> Engine {
    let (archive, _handle) = Archive::new(
        Arc::new(active.clone()),
        Arc::new(deleted.clone()),
        Arc::new(LocalSyncChannel::new()),
        &EngineSettings::default(),
    );
    archive.engine
}

async fn apply(engine: &mut Engine, active: &MemoryArchiveStore, op: &Op) {
    match *op {
        Op::Upsert { path, content } => engine.upsert(item(path, content)).await.unwrap(),
        Op::Delete(path) => engine.delete(&id(path)).await.unwrap(),
        Op::Rename { path, name } => match engine.rename(&id(path), NAMES[name]).await {
            Ok(_) | Err(ArchiveError::AlreadyExists { .. }) => {}
            Err(e) => panic!("rename failed: {e}"),
        },
        Op::Restore(index) => {
            if let Some(trashed) = engine.current().deleted_items.get(index).cloned() {
                engine.restore(trashed).await.unwrap();
            }
        }
        Op::Wipe(index) => {
            let target = engine
                .current()
                .deleted_items
                .get(index)
                .map(ArchiveItem::id)
                .unwrap_or_else(|| id(index));
            engine.wipe(&target).await.unwrap();
        }
        Op::WipeAll => {
            engine.wipe_all().await.unwrap();
        }
        Op::Imported { path, content } => {
            active.upsert(&item(path, content)).await.unwrap();
            engine.apply_event(SyncEvent::Imported(id(path))).await;
        }
        Op::Exported(path) => engine.apply_event(SyncEvent::Exported(id(path))).await,
        Op::Deleted(path) => {
            let _ = active.delete(&id(path)).await;
            engine.apply_event(SyncEvent::Deleted(id(path))).await;
        }
    }
}

fn ids(items: &[ArchiveItem]) -> BTreeSet<ItemId> {
    items.iter().map(ArchiveItem::id).collect()
}

async fn stored_ids(store: &MemoryArchiveStore) -> BTreeSet<ItemId> {
    store
        .manifest()
        .await
        .unwrap()
        .iter()
        .map(ItemId::from)
        .collect()
}

async fn check(
    snapshot: &ArchiveSnapshot,
    active: &MemoryArchiveStore,
    deleted: &MemoryArchiveStore,
    step: &str,
) {
    let active_ids: HashSet<ItemId> = snapshot.items.iter().map(ArchiveItem::id).collect();
    assert_eq!(active_ids.len(), snapshot.items.len(), "duplicate active id after {step}");

    let deleted_ids: HashSet<ItemId> =
        snapshot.deleted_items.iter().map(ArchiveItem::id).collect();
    assert_eq!(deleted_ids.len(), snapshot.deleted_items.len(), "duplicate trash id after {step}");

    assert!(active_ids.is_disjoint(&deleted_ids), "lists overlap after {step}");

    assert_eq!(ids(&snapshot.items), stored_ids(active).await, "active list drifted after {step}");
    assert_eq!(
        ids(&snapshot.deleted_items),
        stored_ids(deleted).await,
        "trash list drifted after {step}"
    );
}

fn run_sequence(ops: &[Op]) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    runtime.block_on(async {
        let active = MemoryArchiveStore::with_items(StoreKind::Active, vec![item(0, 0), item(3, 0)]);
        let deleted = MemoryArchiveStore::new(StoreKind::Deleted);

        let mut engine = engine_over(&active, &deleted);
        engine.load().await.unwrap();

        for op in ops {
            apply(&mut engine, &active, op).await;
            check(&engine.current(), &active, &deleted, &format!("{op:?}")).await;
        }

        let before = engine.current();
        let mut reloaded = engine_over(&active, &deleted);
        reloaded.load().await.unwrap();
        let after = reloaded.current();

        check(&after, &active, &deleted, "reload").await;
        assert_eq!(ids(&after.items), ids(&before.items));
        assert_eq!(ids(&after.deleted_items), ids(&before.deleted_items));
    });
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn lists_stay_unique_disjoint_and_match_the_stores(
        ops in prop::collection::vec(op_strategy(), 1..40)
    ) {
        run_sequence(&ops);
    }
}
