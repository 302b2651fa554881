//! # Seed Data Generator
//!
//! Populates the Active store with sample key files for development.
//!
//! ## Usage
//! ```bash
//! # Generate 50 keys (default)
//! cargo run -p archive-store --bin seed
//!
//! # Generate custom amount
//! cargo run -p archive-store --bin seed -- --count 200
//!
//! # Specify database path
//! cargo run -p archive-store --bin seed -- --db ./data/archive.db
//! ```
//!
//! Keys land under one folder per kind, e.g. `/nfc/Front Door 007.nfc`.
//! Every item starts out not synchronized.

use archive_core::{ArchiveItem, ArchivePath};
use archive_store::{ArchiveStore, Database, DbConfig};
use std::env;

/// Key folders with their file extension and sample names.
const KINDS: &[(&str, &str, &[&str])] = &[
    (
        "nfc",
        "nfc",
        &["Front Door", "Office Badge", "Gym Locker", "Hotel Room", "Bike Lock"],
    ),
    (
        "subghz",
        "sub",
        &["Garage", "Gate Remote", "Doorbell", "Weather Station", "Car Fob"],
    ),
    (
        "lfrfid",
        "rfid",
        &["Parking", "Warehouse", "Elevator", "Mailroom"],
    ),
    (
        "infrared",
        "ir",
        &["TV Remote", "Air Conditioner", "Projector", "Soundbar"],
    ),
    ("ibutton", "ibtn", &["Intercom", "Storage Room"]),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 50;
    let mut db_path = String::from("./archive_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(50);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Key Archive Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of keys to generate (default: 50)");
                println!("  -d, --db <PATH>    Database file path (default: ./archive_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Key Archive Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!("Keys: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let active = db.active_store();

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = active.count().await?;
    if existing > 0 {
        println!("⚠ Active store already has {} keys", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating keys...");

    let start = std::time::Instant::now();
    let mut generated = 0;

    for seed in 0..count {
        let item = generate_key(seed)?;

        if let Err(e) = active.upsert(&item).await {
            eprintln!("Failed to insert {}: {}", item.path, e);
            continue;
        }

        generated += 1;
    }

    println!();
    println!("✓ Generated {} keys in {:?}", generated, start.elapsed());

    let manifest = active.manifest().await?;
    println!("  Active store now lists {} paths", manifest.len());

    Ok(())
}

/// Generates one key file. Names repeat across rounds with a numeric suffix.
fn generate_key(seed: usize) -> Result<ArchiveItem, Box<dyn std::error::Error>> {
    let (folder, extension, names) = KINDS[seed % KINDS.len()];
    let name = names[(seed / KINDS.len()) % names.len()];

    let path: ArchivePath = format!("/{}/{} {:03}.{}", folder, name, seed, extension).parse()?;
    let content = format!("Filetype: {}\nVersion: 1\nSeed: {}\n", folder, seed);

    Ok(ArchiveItem::new(path, content))
}
