//! Tally Core Library
//!
//! Shared functionality for the Tally statement tool:
//! - Database access and migrations
//! - Statement normalizers for Citi and Schwab exports
//! - Category taxonomy and keyword matcher
//! - Filtered query builder for detail and aggregate queries
//! - Reports and net worth history

pub mod config;
pub mod db;
pub mod error;
pub mod import;
pub mod models;
pub mod net_worth;
pub mod reports;
pub mod taxonomy;

pub use config::Config;
pub use db::{parse_allowed, Database, NetWorthQuery, SeedResult, TransactionQuery};
pub use error::{Error, Result};
pub use import::{
    normalize_all, parse_amount, CitiNormalizer, NormalizeReport, Normalizer, SchwabNormalizer,
};
pub use net_worth::{with_deltas, NetWorthEntry};
pub use reports::{
    month_bounds, net_totals, AnnualReport, NetTotal, Overview, OverviewOptions,
    ReportCategories,
};
pub use taxonomy::{Taxonomy, TaxonomyEntry};
