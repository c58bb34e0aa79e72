//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `parse_date` / `parse_date_opt` - Date flag parsing
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tally_core::{db::Database, Taxonomy};

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

/// Parse a YYYY-MM-DD flag value
pub fn parse_date(value: &str, flag: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid --{} date format (use YYYY-MM-DD)", flag))
}

pub fn parse_date_opt(value: Option<&str>, flag: &str) -> Result<Option<NaiveDate>> {
    value.map(|v| parse_date(v, flag)).transpose()
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool, taxonomy: Option<&Path>) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path, no_encrypt)?;

    if let Some(path) = taxonomy {
        let taxonomy = Taxonomy::load(path)
            .with_context(|| format!("Failed to load taxonomy {}", path.display()))?;
        let seeded = db
            .seed_taxonomy(&taxonomy)
            .context("Failed to seed categories")?;
        println!(
            "   Seeded {} categories ({} keywords)",
            seeded.categories_created, seeded.values_added
        );
    }

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Seed categories: tally categories seed --file categories.json");
    println!("  2. Normalize statements: tally normalize --dir ~/Downloads");
    println!("  3. Review the month: tally report overview");

    Ok(())
}
