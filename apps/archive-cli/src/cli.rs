//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Key archive command-line tool.
#[derive(Debug, Parser)]
#[command(name = "archive")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the config file (defaults to the platform config dir)
    #[arg(global = true, short, long)]
    pub config: Option<PathBuf>,

    /// Path to the SQLite database, overriding the config
    #[arg(global = true, long)]
    pub db: Option<PathBuf>,

    /// Print results as JSON
    #[arg(global = true, long)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List active items
    List,

    /// List trashed items
    Trash,

    /// Add or replace an item with the contents of a file
    Add {
        /// Archive path, e.g. /keys/door.key
        path: String,
        /// File to read the content from
        file: PathBuf,
    },

    /// Add an item only if the path is free
    Import {
        /// Archive path, e.g. /keys/door.key
        path: String,
        /// File to read the content from
        file: PathBuf,
    },

    /// Move an item to the trash
    Delete {
        path: String,
    },

    /// Rename an item within its folder
    Rename {
        path: String,
        /// New file name, without folder
        name: String,
    },

    /// Move a trashed item back to the archive
    Restore {
        path: String,
    },

    /// Permanently remove a trashed item
    Wipe {
        path: String,
    },

    /// Permanently remove everything in the trash
    WipeAll,

    /// Run the device sync routine
    Sync,

    /// Show the effective configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        save: bool,
    },
}
