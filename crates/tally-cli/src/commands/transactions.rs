//! Transaction command implementations

use anyhow::{Context, Result};
use tally_core::models::{CategoryPresence, Transaction, TransactionKind, TransactionUpdate};
use tally_core::{db::Database, parse_allowed, TransactionQuery};

use super::{format_amount, parse_date_opt, truncate};
use crate::cli::FilterArgs;

/// Build a query from the shared filter flags
///
/// Free-text type values go through the allow-list before reaching the builder.
pub fn query_from_filters(filters: &FilterArgs) -> Result<TransactionQuery> {
    let kind = filters
        .kind
        .as_deref()
        .map(parse_allowed::<TransactionKind>)
        .transpose()
        .context("Invalid --type")?;

    let presence = if filters.uncategorized {
        CategoryPresence::Missing
    } else if filters.categorized {
        CategoryPresence::Present
    } else {
        CategoryPresence::Any
    };

    Ok(TransactionQuery::new()
        .start_date(parse_date_opt(filters.from.as_deref(), "from")?)
        .end_date(parse_date_opt(filters.to.as_deref(), "to")?)
        .categories(filters.categories.iter().cloned())
        .exclude(filters.exclude.iter().cloned())
        .kind(kind)
        .presence(presence))
}

fn print_transaction_row(tx: &Transaction) {
    let category = tx.category.as_deref().unwrap_or("-");
    println!(
        "   {} │ {:>20} │ {:<14} │ {}",
        tx.date,
        format_amount(tx.amount),
        truncate(category, 14),
        truncate(&tx.name, 40)
    );
}

pub fn cmd_transactions_list(
    db: &Database,
    filters: &FilterArgs,
    sort: &str,
    direction: &str,
    limit: i64,
    json: bool,
) -> Result<()> {
    let query = query_from_filters(filters)?
        .sort_by_name(sort, direction)
        .context("Invalid sort")?
        .limit(Some(limit));

    let transactions = db.query_transactions(&query)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&transactions)?);
        return Ok(());
    }

    if transactions.is_empty() {
        println!("No transactions found. Normalize some with:");
        println!("  tally normalize --dir ~/Downloads");
        return Ok(());
    }

    println!();
    println!("📝 Transactions");
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in &transactions {
        print_transaction_row(tx);
    }

    println!();
    println!("   {} shown", transactions.len());

    Ok(())
}

pub fn cmd_transactions_show(db: &Database, id: &str) -> Result<()> {
    let tx = db
        .get_transaction(id)?
        .ok_or_else(|| anyhow::anyhow!("Transaction {} not found", id))?;

    println!();
    println!("📄 {}", tx.name);
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   ID:        {}", tx.id);
    println!("   Date:      {}", tx.date);
    println!("   Amount:    {}", format_amount(tx.amount));
    println!("   Source:    {} ({})", tx.source, tx.account);
    println!(
        "   Category:  {}",
        tx.category.as_deref().unwrap_or("(uncategorized)")
    );
    if let Some(ref raw) = tx.raw_category {
        println!("   Bank cat:  {}", raw);
    }
    if let Some(ref note) = tx.description {
        println!("   Note:      {}", note);
    }

    Ok(())
}

pub fn cmd_transactions_set_category(db: &Database, id: &str, category: &str) -> Result<()> {
    let found = db
        .get_category_by_name(category)?
        .ok_or_else(|| anyhow::anyhow!("Category '{}' not found", category))?;

    db.update_transaction(
        id,
        &TransactionUpdate {
            category_id: Some(found.id),
            ..Default::default()
        },
    )
    .with_context(|| format!("Failed to update transaction {}", id))?;

    println!("✅ Transaction {} → {}", id, found.name);
    Ok(())
}

pub fn cmd_transactions_note(db: &Database, id: &str, text: &str) -> Result<()> {
    db.update_transaction(
        id,
        &TransactionUpdate {
            description: Some(text.to_string()),
            ..Default::default()
        },
    )
    .with_context(|| format!("Failed to update transaction {}", id))?;

    println!("✅ Note saved on transaction {}", id);
    Ok(())
}

pub fn cmd_review(db: &Database, limit: i64) -> Result<()> {
    let queue = db.review_queue(Some(limit))?;

    if queue.is_empty() {
        println!("✅ Nothing to review, every transaction has a category.");
        return Ok(());
    }

    println!();
    println!("🧐 Uncategorized Transactions ({})", queue.len());
    println!("   ─────────────────────────────────────────────────────────────");

    for item in &queue {
        let tx = &item.transaction;
        let suggestion = item
            .suggestion
            .as_ref()
            .map(|c| format!("→ {}?", c.name))
            .unwrap_or_default();
        println!(
            "   {} │ {} │ {:>20} │ {} {}",
            tx.id,
            tx.date,
            format_amount(tx.amount),
            truncate(&tx.name, 32),
            suggestion
        );
    }

    println!();
    println!("   Assign with: tally transactions set-category <id> <category>");

    Ok(())
}
