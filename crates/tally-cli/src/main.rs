//! Tally CLI - Bank statement normalizer and spending reports
//!
//! Usage:
//!   tally init --taxonomy categories.json   Initialize database and seed categories
//!   tally normalize --dir ~/Downloads       Normalize downloaded statements
//!   tally review                            Categorize what the matcher missed
//!   tally report overview                   Month overview with trailing year

mod cli;
mod commands;


use anyhow::{Context, Result};
use clap::Parser;
use tally_core::Config;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    // Flags > env > tally.toml > defaults
    let config = Config::load(cli.config.as_deref()).context("Failed to load config")?;
    let db_path = cli.db.clone().unwrap_or_else(|| config.db_path.clone());
    debug!(db = %db_path.display(), "Resolved database path");

    match cli.command {
        Commands::Init { taxonomy } => {
            let taxonomy = taxonomy.or_else(|| config.taxonomy_path.clone());
            commands::cmd_init(&db_path, cli.no_encrypt, taxonomy.as_deref())
        }
        Commands::Categories { action } => {
            let db = commands::open_db(&db_path, cli.no_encrypt)?;
            match action {
                None | Some(CategoriesAction::List) => commands::cmd_categories_list(&db),
                Some(CategoriesAction::Seed { file }) => commands::cmd_categories_seed(&db, &file),
                Some(CategoriesAction::Add {
                    name,
                    priority,
                    values,
                }) => commands::cmd_categories_add(&db, &name, priority, &values),
                Some(CategoriesAction::Search { texts }) => {
                    commands::cmd_categories_search(&db, &texts)
                }
            }
        }
        Commands::Normalize {
            dir,
            taxonomy,
            source,
        } => {
            let db = commands::open_db(&db_path, cli.no_encrypt)?;
            let dir = dir.unwrap_or_else(|| config.statements_dir.clone());
            let taxonomy = taxonomy.or_else(|| config.taxonomy_path.clone());
            commands::cmd_normalize(&db, &dir, taxonomy.as_deref(), source.as_deref())
        }
        Commands::Transactions { action } => {
            let db = commands::open_db(&db_path, cli.no_encrypt)?;
            match action {
                None => commands::cmd_transactions_list(
                    &db,
                    &FilterArgs::default(),
                    "date",
                    "desc",
                    20,
                    false,
                ),
                Some(TransactionsAction::List {
                    filters,
                    sort,
                    direction,
                    limit,
                    json,
                }) => commands::cmd_transactions_list(
                    &db, &filters, &sort, &direction, limit, json,
                ),
                Some(TransactionsAction::Show { id }) => commands::cmd_transactions_show(&db, &id),
                Some(TransactionsAction::SetCategory { id, category }) => {
                    commands::cmd_transactions_set_category(&db, &id, &category)
                }
                Some(TransactionsAction::Note { id, text }) => {
                    commands::cmd_transactions_note(&db, &id, &text)
                }
            }
        }
        Commands::Review { limit } => {
            let db = commands::open_db(&db_path, cli.no_encrypt)?;
            commands::cmd_review(&db, limit)
        }
        Commands::Report { report_type } => {
            let db = commands::open_db(&db_path, cli.no_encrypt)?;
            let report_categories = &config.report_categories;
            match report_type {
                ReportType::Overview {
                    from,
                    to,
                    categories,
                    sort,
                    direction,
                } => {
                    let range = commands::resolve_range(from.as_deref(), to.as_deref())?;
                    commands::cmd_report_overview(
                        &db,
                        report_categories,
                        range,
                        &categories,
                        &sort,
                        &direction,
                    )
                }
                ReportType::Annual => commands::cmd_report_annual(&db, report_categories),
                ReportType::Categories { filters } => {
                    commands::cmd_report_categories(&db, &filters)
                }
                ReportType::Buckets { by, filters } => {
                    commands::cmd_report_buckets(&db, &by, &filters)
                }
            }
        }
        Commands::Networth { action } => {
            let db = commands::open_db(&db_path, cli.no_encrypt)?;
            match action {
                None => commands::cmd_networth_list(&db, 12),
                Some(NetWorthAction::List { limit }) => commands::cmd_networth_list(&db, limit),
                Some(NetWorthAction::Add { date, balances }) => {
                    let date = commands::parse_date_opt(date.as_deref(), "date")?;
                    commands::cmd_networth_add(&db, date, &balances)
                }
                Some(NetWorthAction::Update { id, date, balances }) => {
                    let date = commands::parse_date_opt(date.as_deref(), "date")?;
                    commands::cmd_networth_update(&db, &id, date, &balances)
                }
            }
        }
    }
}
