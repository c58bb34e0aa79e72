//! Statement normalizers for bank exports
//!
//! Each institution implements [`Normalizer`]: it names the file prefix its
//! export tool uses and parses one file into canonical transactions. The shared
//! driver discovers files, persists every parsed record (a failed insert is
//! logged and skipped) and deletes the file once all of its records were tried.
//! A file that can't be read or parsed is logged and left in place.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{unknown_date, NewTransaction, Source};
use crate::taxonomy::Taxonomy;

mod citi;
mod schwab;

pub use citi::CitiNormalizer;
pub use schwab::SchwabNormalizer;

/// Counts for one normalizer run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizeReport {
    /// Files parsed (and therefore attempted for deletion)
    pub files_processed: usize,
    /// Files that could not be read or parsed; left on disk
    pub files_failed: usize,
    pub transactions_imported: usize,
    pub transactions_failed: usize,
    /// Imported transactions that received a category
    pub categorized: usize,
    /// Processed files that could not be deleted
    pub delete_failures: usize,
}

impl NormalizeReport {
    pub fn merge(&mut self, other: &NormalizeReport) {
        self.files_processed += other.files_processed;
        self.files_failed += other.files_failed;
        self.transactions_imported += other.transactions_imported;
        self.transactions_failed += other.transactions_failed;
        self.categorized += other.categorized;
        self.delete_failures += other.delete_failures;
    }

    pub fn uncategorized(&self) -> usize {
        self.transactions_imported - self.categorized
    }
}

/// A source-specific statement grammar
pub trait Normalizer {
    fn source(&self) -> Source;

    /// File name prefix used by the institution's export tool
    fn file_prefix(&self) -> &'static str;

    /// Store the parsed transactions go to
    fn database(&self) -> &Database;

    /// Parse one statement file, with categories already resolved
    fn parse_file(&self, path: &Path) -> Result<Vec<NewTransaction>>;

    /// Normalize every matching file in `dir`
    fn normalize(&self, dir: &Path) -> Result<NormalizeReport> {
        run(self, dir)
    }
}

fn run<N: Normalizer + ?Sized>(normalizer: &N, dir: &Path) -> Result<NormalizeReport> {
    let source = normalizer.source();
    let files = discover_files(dir, normalizer.file_prefix())?;
    let mut report = NormalizeReport::default();

    debug!(%source, files = files.len(), dir = %dir.display(), "Discovered statements");

    for path in files {
        let transactions = match normalizer.parse_file(&path) {
            Ok(transactions) => transactions,
            Err(e) => {
                warn!(%source, file = %path.display(), error = %e, "Skipping unreadable statement");
                report.files_failed += 1;
                continue;
            }
        };

        for tx in &transactions {
            match normalizer.database().insert_transaction(tx) {
                Ok(()) => {
                    report.transactions_imported += 1;
                    if tx.category_id.is_some() {
                        report.categorized += 1;
                    }
                }
                Err(e) => {
                    warn!(%source, name = %tx.name, error = %e, "Failed to store transaction");
                    report.transactions_failed += 1;
                }
            }
        }
        report.files_processed += 1;

        if let Err(e) = std::fs::remove_file(&path) {
            warn!(file = %path.display(), error = %e, "Failed to delete statement");
            report.delete_failures += 1;
        }

        debug!(%source, file = %path.display(), records = transactions.len(), "Statement processed");
    }

    info!(
        %source,
        files = report.files_processed,
        imported = report.transactions_imported,
        categorized = report.categorized,
        failed = report.transactions_failed,
        "Normalize finished"
    );
    Ok(report)
}

/// Regular files in `dir` whose name starts with `prefix`, sorted by name
pub fn discover_files(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with(prefix) {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Parse a currency string like `"$1,234.56"`
pub fn parse_amount(s: &str) -> Result<f64> {
    let cleaned = s.trim().replace(['$', ','], "");
    cleaned
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::InvalidData(format!("Unable to parse amount: {}", s)))
}

/// Signed amount from an outflow/inflow column pair
///
/// Outflow (withdrawal, debit) is positive, inflow (deposit, credit) negated.
/// Neither populated gives 0. Malformed text is logged and counts as 0.
pub fn signed_amount(outflow: &str, inflow: &str, name: &str) -> f64 {
    let parse = |s: &str| {
        parse_amount(s).unwrap_or_else(|e| {
            warn!(name, error = %e, "Amount defaulted to 0");
            0.0
        })
    };

    if !outflow.trim().is_empty() {
        parse(outflow)
    } else if !inflow.trim().is_empty() {
        -parse(inflow)
    } else {
        0.0
    }
}

/// Parse a statement date, falling back to `unknown_date()` (logged)
pub fn parse_date_or_unknown(s: &str, format: &str, name: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s.trim(), format).unwrap_or_else(|e| {
        warn!(name, date = s, error = %e, "Unparseable date");
        unknown_date()
    })
}

/// Run the built-in normalizers over one directory (schwab, then citi)
///
/// `only` restricts the run to a single source.
pub fn normalize_all(
    db: &Database,
    taxonomy: &Taxonomy,
    dir: &Path,
    only: Option<Source>,
) -> Result<NormalizeReport> {
    let mut report = NormalizeReport::default();

    for source in Source::all() {
        if only.is_some_and(|s| s != *source) {
            continue;
        }
        let normalizer: Box<dyn Normalizer + '_> = match source {
            Source::Schwab => Box::new(SchwabNormalizer::new(db)),
            Source::Citi => Box::new(CitiNormalizer::new(db, taxonomy)),
        };
        report.merge(&normalizer.normalize(dir)?);
    }

    Ok(report)
}
