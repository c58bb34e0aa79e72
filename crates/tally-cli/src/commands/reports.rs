//! Report command implementations

use anyhow::{Context, Result};
use tally_core::models::{BucketTotal, CategoryTotal, Granularity};
use tally_core::{db::Database, parse_allowed, NetTotal, OverviewOptions, ReportCategories};

use super::{format_amount, parse_date, query_from_filters, truncate};
use crate::cli::FilterArgs;

/// Resolve an explicit --from/--to pair; both or neither
pub fn resolve_range(
    from: Option<&str>,
    to: Option<&str>,
) -> Result<Option<(chrono::NaiveDate, chrono::NaiveDate)>> {
    match (from, to) {
        (Some(from), Some(to)) => {
            let from_date = parse_date(from, "from")?;
            let to_date = parse_date(to, "to")?;
            if from_date > to_date {
                anyhow::bail!("--from {} is after --to {}", from_date, to_date);
            }
            Ok(Some((from_date, to_date)))
        }
        (None, None) => Ok(None),
        _ => anyhow::bail!("--from and --to must be given together"),
    }
}

fn print_category_totals(totals: &[CategoryTotal]) {
    for total in totals {
        println!(
            "   {:<24} {:>20}",
            truncate(total.category.as_deref().unwrap_or("(uncategorized)"), 24),
            format_amount(total.total)
        );
    }
}

fn print_buckets(totals: &[BucketTotal]) {
    for total in totals {
        println!("   {:<10} {:>20}", total.key, format_amount(total.total));
    }
}

fn print_net(totals: &[NetTotal]) {
    for total in totals {
        // Negative net is a surplus
        println!("   {:<10} {:>20}", total.key, format_amount(total.net));
    }
}

pub fn cmd_report_overview(
    db: &Database,
    report_categories: &ReportCategories,
    range: Option<(chrono::NaiveDate, chrono::NaiveDate)>,
    categories: &[String],
    sort: &str,
    direction: &str,
) -> Result<()> {
    let options = OverviewOptions {
        range,
        categories: categories.to_vec(),
        sort: (
            parse_allowed(sort).context("Invalid --sort")?,
            parse_allowed(direction).context("Invalid --direction")?,
        ),
    };

    let overview = db.overview(&options, report_categories)?;

    println!();
    println!("📊 Overview: {} to {}", overview.start, overview.end);
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Spent:   \x1b[31m${:.2}\x1b[0m", overview.expense_total);
    println!("   Income:  \x1b[32m${:.2}\x1b[0m", overview.income_total);
    if overview.net < 0.0 {
        println!("   Net:     \x1b[31m-${:.2}\x1b[0m", overview.net.abs());
    } else {
        println!("   Net:     \x1b[32m${:.2}\x1b[0m", overview.net);
    }

    if !overview.expense_categories.is_empty() {
        println!();
        println!("   Spending by category:");
        print_category_totals(&overview.expense_categories);
    }
    if !overview.income_categories.is_empty() {
        println!();
        println!("   Income by category:");
        print_category_totals(&overview.income_categories);
    }

    if !overview.monthly_net.is_empty() {
        println!();
        println!("   Net by month (trailing year):");
        print_net(&overview.monthly_net);
    }

    if !overview.transactions.is_empty() {
        println!();
        println!("   Transactions ({}):", overview.transactions.len());
        for tx in &overview.transactions {
            println!(
                "   {} │ {:>20} │ {:<14} │ {}",
                tx.date,
                format_amount(tx.amount),
                truncate(tx.category.as_deref().unwrap_or("-"), 14),
                truncate(&tx.name, 36)
            );
        }
    }

    Ok(())
}

pub fn cmd_report_annual(db: &Database, report_categories: &ReportCategories) -> Result<()> {
    let annual = db.annual_report(report_categories)?;

    if annual.income.is_empty() && annual.expenses.is_empty() {
        println!("No transactions to report on.");
        return Ok(());
    }

    println!();
    println!("📅 Annual Report");
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Expenses:");
    print_buckets(&annual.expenses);
    println!();
    println!("   Income:");
    print_buckets(&annual.income);
    println!();
    println!("   Net:");
    print_net(&annual.net);

    Ok(())
}

pub fn cmd_report_categories(db: &Database, filters: &FilterArgs) -> Result<()> {
    let totals = db.category_totals(&query_from_filters(filters)?)?;

    if totals.is_empty() {
        println!("No transactions match these filters.");
        return Ok(());
    }

    println!();
    println!("🏷️  Totals by Category");
    println!("   ─────────────────────────────────────────────────────────────");
    print_category_totals(&totals);

    Ok(())
}

pub fn cmd_report_buckets(db: &Database, by: &str, filters: &FilterArgs) -> Result<()> {
    let granularity: Granularity = parse_allowed(by).context("Invalid --by")?;
    let totals = db.bucket_totals(&query_from_filters(filters)?, granularity)?;

    if totals.is_empty() {
        println!("No transactions match these filters.");
        return Ok(());
    }

    println!();
    println!("🗓️  Totals by {}", granularity.as_str());
    println!("   ─────────────────────────────────────────────────────────────");
    print_buckets(&totals);

    Ok(())
}
