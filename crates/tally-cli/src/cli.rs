//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Tally - Normalize bank statements and report on spending
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Bank statement normalizer and spending reports", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path (overrides TALLY_DB and tally.toml)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Config file (default: ~/.config/tally/tally.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set TALLY_DB_KEY environment variable with your passphrase.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init {
        /// Seed categories from a taxonomy JSON file
        #[arg(short, long)]
        taxonomy: Option<PathBuf>,
    },

    /// Manage categories and their keywords
    Categories {
        #[command(subcommand)]
        action: Option<CategoriesAction>,
    },

    /// Normalize statement files from a directory into the database
    ///
    /// Processed files are deleted. Files that fail to parse are left in place.
    Normalize {
        /// Directory holding downloaded statements (overrides TALLY_STATEMENTS_DIR)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Taxonomy file for Citi categorization (default: stored categories)
        #[arg(short, long)]
        taxonomy: Option<PathBuf>,

        /// Only run one source: citi, schwab
        #[arg(short, long)]
        source: Option<String>,
    },

    /// List and edit transactions
    Transactions {
        #[command(subcommand)]
        action: Option<TransactionsAction>,
    },

    /// Show uncategorized transactions with suggested categories
    Review {
        /// Number of transactions to show
        #[arg(short, long, default_value = "50")]
        limit: i64,
    },

    /// Generate reports
    Report {
        #[command(subcommand)]
        report_type: ReportType,
    },

    /// Track net worth snapshots
    Networth {
        #[command(subcommand)]
        action: Option<NetWorthAction>,
    },
}

#[derive(Subcommand)]
pub enum CategoriesAction {
    /// List categories in match order
    List,

    /// Seed categories from a taxonomy JSON file (existing names are kept)
    Seed {
        /// Taxonomy file: {"name": ["kw", ...]} or {"name": {"values": [...], "priority": n}}
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Create a category
    Add {
        /// Category name
        name: String,

        /// Match priority (lower matches first)
        #[arg(short, long)]
        priority: Option<i64>,

        /// Keyword to match (repeatable)
        #[arg(short = 'k', long = "value")]
        values: Vec<String>,
    },

    /// Show which category each text would match
    Search {
        /// Texts to categorize
        #[arg(required = true)]
        texts: Vec<String>,
    },
}

/// Filters shared by transaction listings and reports
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// End date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,

    /// Only these categories (repeatable)
    #[arg(short, long = "category")]
    pub categories: Vec<String>,

    /// Leave out these categories (repeatable)
    #[arg(short = 'x', long)]
    pub exclude: Vec<String>,

    /// income or expenses
    #[arg(short = 't', long = "type")]
    pub kind: Option<String>,

    /// Only transactions without a category
    #[arg(long, conflicts_with = "categorized")]
    pub uncategorized: bool,

    /// Only transactions with a category
    #[arg(long)]
    pub categorized: bool,
}

#[derive(Subcommand)]
pub enum TransactionsAction {
    /// List transactions
    List {
        #[command(flatten)]
        filters: FilterArgs,

        /// Sort column: date, amount, name
        #[arg(long, default_value = "date")]
        sort: String,

        /// Sort direction: asc, desc
        #[arg(long, default_value = "desc")]
        direction: String,

        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: i64,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one transaction
    Show {
        /// Transaction ID
        id: String,
    },

    /// Assign a category to a transaction
    SetCategory {
        /// Transaction ID
        id: String,

        /// Category name
        category: String,
    },

    /// Set the note on a transaction
    Note {
        /// Transaction ID
        id: String,

        /// Note text
        text: String,
    },
}

#[derive(Subcommand)]
pub enum ReportType {
    /// Totals, category breakdown and trailing months for one period
    Overview {
        /// Start date (YYYY-MM-DD, default: month of the latest transaction)
        #[arg(long, requires = "to")]
        from: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long, requires = "from")]
        to: Option<String>,

        /// Only these categories (repeatable)
        #[arg(short, long = "category")]
        categories: Vec<String>,

        /// Sort column for the transaction list: date, amount, name
        #[arg(long, default_value = "amount")]
        sort: String,

        /// Sort direction: asc, desc
        #[arg(long, default_value = "desc")]
        direction: String,
    },

    /// Income, expenses and net per year
    Annual,

    /// Totals per category
    Categories {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Totals per calendar bucket
    Buckets {
        /// Bucket size: year, month
        #[arg(long, default_value = "month")]
        by: String,

        #[command(flatten)]
        filters: FilterArgs,
    },
}

/// Balance components of a snapshot
#[derive(Args, Debug, Default)]
pub struct BalanceArgs {
    #[arg(long)]
    pub cash: Option<f64>,
    #[arg(long)]
    pub investment: Option<f64>,
    /// Checking/debit balance
    #[arg(long)]
    pub debit: Option<f64>,
    /// Credit card balance (negative when owed)
    #[arg(long, allow_hyphen_values = true)]
    pub credit: Option<f64>,
    #[arg(long)]
    pub savings: Option<f64>,
    #[arg(long)]
    pub retirement: Option<f64>,
    /// Loan balance (negative when owed)
    #[arg(long, allow_hyphen_values = true)]
    pub loans: Option<f64>,
}

#[derive(Subcommand)]
pub enum NetWorthAction {
    /// List snapshots with change from the previous one
    List {
        /// Number of snapshots to show
        #[arg(short, long, default_value = "12")]
        limit: i64,
    },

    /// Record a snapshot (missing balances are 0)
    Add {
        /// Snapshot date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,

        #[command(flatten)]
        balances: BalanceArgs,
    },

    /// Change fields of a snapshot
    Update {
        /// Snapshot ID
        id: String,

        /// New date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        #[command(flatten)]
        balances: BalanceArgs,
    },
}
