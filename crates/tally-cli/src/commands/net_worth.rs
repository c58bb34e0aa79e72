//! Net worth snapshot commands

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use tally_core::db::Database;
use tally_core::models::{NetWorthUpdate, NewNetWorthItem};

use crate::cli::BalanceArgs;

pub fn cmd_networth_list(db: &Database, limit: i64) -> Result<()> {
    let history = db.net_worth_history(Some(limit))?;

    if history.is_empty() {
        println!("No net worth snapshots yet. Add one with:");
        println!("  tally networth add --cash 1000 --savings 5000");
        return Ok(());
    }

    println!();
    println!("💰 Net Worth");
    println!("   ─────────────────────────────────────────────────────────────");

    for entry in &history {
        let change = match entry.change {
            Some(c) if c < 0.0 => format!("\x1b[31m-${:.2}\x1b[0m", c.abs()),
            Some(c) => format!("\x1b[32m+${:.2}\x1b[0m", c),
            None => "-".to_string(),
        };
        println!(
            "   {} │ ${:>12.2} │ {:>20} │ {:>8} │ {}",
            entry.item.date,
            entry.net_worth,
            change,
            entry.change_percent.as_deref().unwrap_or("-"),
            entry.item.id
        );
    }

    Ok(())
}

pub fn cmd_networth_add(
    db: &Database,
    date: Option<NaiveDate>,
    balances: &BalanceArgs,
) -> Result<()> {
    let item = NewNetWorthItem {
        date: date.unwrap_or_else(|| Local::now().date_naive()),
        cash: balances.cash.unwrap_or(0.0),
        investment: balances.investment.unwrap_or(0.0),
        debit: balances.debit.unwrap_or(0.0),
        credit: balances.credit.unwrap_or(0.0),
        savings: balances.savings.unwrap_or(0.0),
        retirement: balances.retirement.unwrap_or(0.0),
        loans: balances.loans.unwrap_or(0.0),
    };

    let id = db
        .create_net_worth(&item)
        .context("Failed to save snapshot")?;

    println!("✅ Recorded snapshot for {} ({})", item.date, id);
    Ok(())
}

pub fn cmd_networth_update(
    db: &Database,
    id: &str,
    date: Option<NaiveDate>,
    balances: &BalanceArgs,
) -> Result<()> {
    let update = NetWorthUpdate {
        date,
        cash: balances.cash,
        investment: balances.investment,
        debit: balances.debit,
        credit: balances.credit,
        savings: balances.savings,
        retirement: balances.retirement,
        loans: balances.loans,
    };

    db.update_net_worth(id, &update)
        .with_context(|| format!("Failed to update snapshot {}", id))?;

    println!("✅ Snapshot {} updated", id);
    Ok(())
}
