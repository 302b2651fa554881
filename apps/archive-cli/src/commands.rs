//! # Command Handlers
//!
//! Each subcommand maps to one call on the [`ArchiveHandle`].
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  list / trash       snapshot queries, no I/O                           │
//! │  add / import       read file → upsert / import_item                   │
//! │  delete / rename    active id → delete / rename                        │
//! │  restore / wipe     trashed item → restore / wipe                      │
//! │  wipe-all           wipe_all                                           │
//! │  sync               sync_with_device                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Output goes to a caller-supplied writer so handlers can run against an
//! in-memory engine in tests.

use std::io::Write;
use std::path::Path;

use serde_json::json;
use tracing::debug;

use archive_core::{ArchiveItem, ArchivePath, ItemId};
use archive_sync::{ArchiveHandle, SyncOutcome};

use crate::cli::Command;
use crate::error::{CliError, CliResult};

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

/// Runs one archive command.
///
/// `Config` is handled by the caller before the engine starts.
pub async fn execute(
    command: Command,
    archive: &ArchiveHandle,
    format: Format,
    out: &mut impl Write,
) -> CliResult<()> {
    debug!(?command, "Executing command");

    match command {
        Command::List => print_items(out, format, &archive.items()),
        Command::Trash => print_items(out, format, &archive.deleted_items()),
        Command::Add { path, file } => {
            let item = read_item(&path, &file)?;
            archive.upsert(item).await?;
            report(out, format, "added", &path)
        }
        Command::Import { path, file } => {
            let item = read_item(&path, &file)?;
            if archive.import_item(item).await? {
                report(out, format, "imported", &path)
            } else {
                report(out, format, "skipped", &path)
            }
        }
        Command::Delete { path } => {
            let id = active_id(archive, &path)?;
            archive.delete(id).await?;
            report(out, format, "deleted", &path)
        }
        Command::Rename { path, name } => {
            let id = active_id(archive, &path)?;
            let renamed = archive
                .rename(id, name)
                .await?
                .ok_or_else(|| CliError::not_found(&path, "archive"))?;
            report(out, format, "renamed", renamed.path.as_str())
        }
        Command::Restore { path } => {
            let item = trashed_item(archive, &path)?;
            archive.restore(item).await?;
            report(out, format, "restored", &path)
        }
        Command::Wipe { path } => {
            let item = trashed_item(archive, &path)?;
            archive.wipe(item.id()).await?;
            report(out, format, "wiped", &path)
        }
        Command::WipeAll => {
            let count = archive.wipe_all().await?;
            match format {
                Format::Text => writeln!(out, "wiped {} item(s)", count)?,
                Format::Json => writeln!(out, "{}", json!({ "wiped": count }))?,
            }
            Ok(())
        }
        Command::Sync => {
            let outcome = archive.sync_with_device().await?;
            let label = match outcome {
                SyncOutcome::Completed => "completed",
                SyncOutcome::Skipped => "skipped (load in progress)",
            };
            match format {
                Format::Text => writeln!(out, "sync {}", label)?,
                Format::Json => writeln!(
                    out,
                    "{}",
                    json!({ "sync": outcome == SyncOutcome::Completed })
                )?,
            }
            Ok(())
        }
        Command::Config { .. } => Ok(()),
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn read_item(path: &str, file: &Path) -> CliResult<ArchiveItem> {
    let path = ArchivePath::parse(path)?;
    let content = std::fs::read(file).map_err(|source| CliError::ReadFile {
        path: file.to_path_buf(),
        source,
    })?;
    Ok(ArchiveItem::new(path, content))
}

fn active_id(archive: &ArchiveHandle, path: &str) -> CliResult<ItemId> {
    let id: ItemId = path.parse()?;
    if archive.get(&id).is_none() {
        return Err(CliError::not_found(path, "archive"));
    }
    Ok(id)
}

fn trashed_item(archive: &ArchiveHandle, path: &str) -> CliResult<ArchiveItem> {
    let id: ItemId = path.parse()?;
    archive
        .snapshot()
        .get_deleted(&id)
        .cloned()
        .ok_or_else(|| CliError::not_found(path, "trash"))
}

fn report(out: &mut impl Write, format: Format, action: &str, path: &str) -> CliResult<()> {
    match format {
        Format::Text => writeln!(out, "{} {}", action, path)?,
        Format::Json => writeln!(out, "{}", json!({ "action": action, "path": path }))?,
    }
    Ok(())
}

fn print_items(out: &mut impl Write, format: Format, items: &[ArchiveItem]) -> CliResult<()> {
    match format {
        Format::Text => {
            if items.is_empty() {
                writeln!(out, "(empty)")?;
            }
            for item in items {
                writeln!(
                    out,
                    "{:<40} {:>8} B  {}",
                    item.path,
                    item.content.len(),
                    item.status
                )?;
            }
        }
        Format::Json => {
            let rows: Vec<_> = items
                .iter()
                .map(|item| {
                    json!({
                        "path": item.path.as_str(),
                        "name": item.name(),
                        "status": item.status.to_string(),
                        "size": item.content.len(),
                    })
                })
                .collect();
            writeln!(out, "{}", serde_json::to_string_pretty(&rows)?)?;
        }
    }
    Ok(())
}
