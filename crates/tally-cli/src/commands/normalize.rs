//! Statement normalization command

use std::path::Path;

use anyhow::{Context, Result};
use tally_core::models::Source;
use tally_core::{db::Database, normalize_all, parse_allowed, Taxonomy};
use tracing::info;

pub fn cmd_normalize(
    db: &Database,
    dir: &Path,
    taxonomy: Option<&Path>,
    source: Option<&str>,
) -> Result<()> {
    if !dir.is_dir() {
        anyhow::bail!("Statements directory not found: {}", dir.display());
    }

    let only = source
        .map(parse_allowed::<Source>)
        .transpose()
        .context("Invalid --source")?;

    // Citi rows are matched against the file taxonomy when given, else stored categories
    let taxonomy = match taxonomy {
        Some(path) => Taxonomy::load(path)
            .with_context(|| format!("Failed to load taxonomy {}", path.display()))?,
        None => db.load_taxonomy()?,
    };
    if taxonomy.is_empty() {
        println!("   💡 Tip: No categories loaded; everything will be uncategorized");
    }

    println!("📥 Normalizing statements in {}...", dir.display());
    info!(dir = %dir.display(), categories = taxonomy.len(), "Starting normalize run");

    let report = normalize_all(db, &taxonomy, dir, only)?;

    println!();
    println!("✅ Normalize complete!");
    println!("   Files processed:  {}", report.files_processed);
    println!("   Imported:         {} transactions", report.transactions_imported);
    println!("   Categorized:      {}", report.categorized);
    if report.uncategorized() > 0 {
        println!(
            "   Uncategorized:    {} (see: tally review)",
            report.uncategorized()
        );
    }
    if report.files_failed > 0 {
        println!(
            "   ⚠️  {} file(s) could not be read and were left in place",
            report.files_failed
        );
    }
    if report.transactions_failed > 0 {
        println!(
            "   ⚠️  {} transaction(s) failed to save",
            report.transactions_failed
        );
    }
    if report.delete_failures > 0 {
        println!(
            "   ⚠️  {} processed file(s) could not be deleted",
            report.delete_failures
        );
    }

    Ok(())
}
