//! Category command implementations

use std::path::Path;

use anyhow::{Context, Result};
use tally_core::{db::Database, Taxonomy};

pub fn cmd_categories_list(db: &Database) -> Result<()> {
    let categories = db.list_categories()?;

    if categories.is_empty() {
        println!("No categories yet. Seed some with:");
        println!("  tally categories seed --file categories.json");
        return Ok(());
    }

    println!();
    println!("🏷️  Categories (match order)");
    println!("   ─────────────────────────────────────────────────────────────");

    for category in categories {
        let priority = category
            .priority
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("   [{:>3}] {:>4} │ {}", category.id, priority, category.name);
    }

    Ok(())
}

pub fn cmd_categories_seed(db: &Database, file: &Path) -> Result<()> {
    let taxonomy = Taxonomy::load(file)
        .with_context(|| format!("Failed to load taxonomy {}", file.display()))?;

    let result = db.seed_taxonomy(&taxonomy)?;

    println!("✅ Seeded categories from {}", file.display());
    println!("   Created:  {}", result.categories_created);
    println!("   Existing: {}", result.categories_existing);
    println!("   Keywords: {} added", result.values_added);

    Ok(())
}

pub fn cmd_categories_add(
    db: &Database,
    name: &str,
    priority: Option<i64>,
    values: &[String],
) -> Result<()> {
    if db.get_category_by_name(name)?.is_some() {
        anyhow::bail!("Category '{}' already exists", name);
    }

    let id = db.create_category(name, priority)?;
    let mut added = 0;
    for value in values {
        if db.add_category_value(id, value)? {
            added += 1;
        }
    }

    println!("✅ Created category '{}' (id {}, {} keywords)", name, id, added);
    Ok(())
}

pub fn cmd_categories_search(db: &Database, texts: &[String]) -> Result<()> {
    println!();
    println!("🔎 Category matches");
    println!("   ─────────────────────────────────────────────────────────────");

    for text in texts {
        match db.match_category(text)? {
            Some(category) => println!("   {} → {}", text, category.name),
            None => println!("   {} → \x1b[33m(uncategorized)\x1b[0m", text),
        }
    }

    Ok(())
}
