//! # Archive Item Repository
//!
//! Rows of the `archive_items` table, scoped to one store location.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use archive_core::{ArchiveItem, ArchivePath, ItemId, ItemStatus};

use crate::error::{StoreError, StoreResult};
use crate::store::{ArchiveStore, Manifest, StoreKind};

/// SQLite-backed archive store for one location.
#[derive(Debug, Clone)]
pub struct SqliteArchiveStore {
    pool: SqlitePool,
    kind: StoreKind,
}

impl SqliteArchiveStore {
    /// Creates a store over the given pool and location.
    pub fn new(pool: SqlitePool, kind: StoreKind) -> Self {
        SqliteArchiveStore { pool, kind }
    }

    /// Counts stored items.
    pub async fn count(&self) -> StoreResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM archive_items WHERE location = ?1")
                .bind(self.kind.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    fn parse_path(raw: &str) -> StoreResult<ArchivePath> {
        raw.parse().map_err(|e: archive_core::CoreError| StoreError::Corrupted {
            path: raw.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl ArchiveStore for SqliteArchiveStore {
    fn kind(&self) -> StoreKind {
        self.kind
    }

    async fn manifest(&self) -> StoreResult<Manifest> {
        let rows: Vec<String> = sqlx::query_scalar(
            "SELECT path FROM archive_items WHERE location = ?1 ORDER BY path ASC",
        )
        .bind(self.kind.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(|raw| Self::parse_path(raw)).collect()
    }

    async fn read(&self, id: &ItemId) -> StoreResult<ArchiveItem> {
        let row: Option<(String, Vec<u8>, String)> = sqlx::query_as(
            r#"
            SELECT path, content, status
            FROM archive_items
            WHERE location = ?1 AND path = ?2
            "#,
        )
        .bind(self.kind.as_str())
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let (raw_path, content, raw_status) =
            row.ok_or_else(|| StoreError::not_found(self.kind, id))?;

        let status: ItemStatus = raw_status.parse().map_err(|e: archive_core::CoreError| {
            StoreError::Corrupted {
                path: raw_path.clone(),
                reason: e.to_string(),
            }
        })?;

        Ok(ArchiveItem {
            path: Self::parse_path(&raw_path)?,
            content,
            status,
        })
    }

    async fn upsert(&self, item: &ArchiveItem) -> StoreResult<()> {
        debug!(store = %self.kind, id = %item.id(), "Upserting item");

        sqlx::query(
            r#"
            INSERT INTO archive_items (location, path, content, status, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (location, path) DO UPDATE SET
                content = excluded.content,
                status = excluded.status,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(self.kind.as_str())
        .bind(item.path.as_str())
        .bind(item.content.as_slice())
        .bind(item.status.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: &ItemId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM archive_items WHERE location = ?1 AND path = ?2")
            .bind(self.kind.as_str())
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(self.kind, id));
        }

        debug!(store = %self.kind, id = %id, "Deleted item");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn item(path: &str, content: &str) -> ArchiveItem {
        ArchiveItem::new(path.parse().unwrap(), content)
    }

    #[tokio::test]
    async fn test_upsert_and_read() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let active = db.active_store();

        let a = item("/a.txt", "alpha").with_status(ItemStatus::Synchronized);
        active.upsert(&a).await.unwrap();

        assert_eq!(active.read(&a.id()).await.unwrap(), a);

        let updated = item("/a.txt", "alpha v2");
        active.upsert(&updated).await.unwrap();
        assert_eq!(active.read(&a.id()).await.unwrap().content, b"alpha v2");
        assert_eq!(active.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_locations_are_separate() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let active = db.active_store();
        let deleted = db.deleted_store();

        let a = item("/a.txt", "alpha");
        active.upsert(&a).await.unwrap();
        deleted
            .upsert(&a.clone().with_status(ItemStatus::Deleted))
            .await
            .unwrap();

        active.delete(&a.id()).await.unwrap();

        assert!(active.manifest().await.unwrap().is_empty());
        let trashed = deleted.read(&a.id()).await.unwrap();
        assert_eq!(trashed.status, ItemStatus::Deleted);
    }

    #[tokio::test]
    async fn test_manifest_order_and_not_found() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let active = db.active_store();

        active.upsert(&item("/b.txt", "b")).await.unwrap();
        active.upsert(&item("/a.txt", "a")).await.unwrap();

        let paths: Vec<String> = active
            .manifest()
            .await
            .unwrap()
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(paths, vec!["/a.txt", "/b.txt"]);

        let missing: ItemId = "/missing.txt".parse().unwrap();
        assert!(active.read(&missing).await.unwrap_err().is_not_found());
        assert!(active.delete(&missing).await.unwrap_err().is_not_found());
    }
}
