//! # Repository Module
//!
//! SQLite-backed [`ArchiveStore`](crate::ArchiveStore) implementations.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Archive engine                                                        │
//! │       │                                                                 │
//! │       │  active.read(&id)                                               │
//! │       ▼                                                                 │
//! │  SqliteArchiveStore (location = 'active' | 'deleted')                  │
//! │  ├── manifest(&self)                                                   │
//! │  ├── read(&self, id)                                                   │
//! │  ├── upsert(&self, item)                                               │
//! │  └── delete(&self, id)                                                 │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  archive_items table                                                   │
//! │                                                                         │
//! │  Both stores share one table; the location column keeps them apart,   │
//! │  so the same path can live once in each.                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod items;
