//! Schwab checking JSON exports
//!
//! Files start with `Checking` and hold a single statement object. Only posted
//! transactions are imported; pending ones show up again once they post.

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{parse_date_or_unknown, signed_amount, Normalizer};
use crate::db::Database;
use crate::error::Result;
use crate::models::{unknown_date, NewTransaction, Source};

const DATE_FORMAT: &str = "%m/%d/%Y";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Statement {
    #[serde(default)]
    from_date: Option<String>,
    #[serde(default)]
    to_date: Option<String>,
    #[serde(default)]
    posted_transactions: Vec<StatementTransaction>,
    #[serde(default)]
    pending_transactions: Vec<StatementTransaction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StatementTransaction {
    #[serde(default)]
    description: String,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    withdrawal: String,
    #[serde(default)]
    deposit: String,
}

/// Categorizes each description against the stored taxonomy
pub struct SchwabNormalizer<'a> {
    db: &'a Database,
}

impl<'a> SchwabNormalizer<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }
}

impl Normalizer for SchwabNormalizer<'_> {
    fn source(&self) -> Source {
        Source::Schwab
    }

    fn file_prefix(&self) -> &'static str {
        "Checking"
    }

    fn database(&self) -> &Database {
        self.db
    }

    fn parse_file(&self, path: &Path) -> Result<Vec<NewTransaction>> {
        let data = std::fs::read_to_string(path)?;
        let statement: Statement = serde_json::from_str(&data)?;

        debug!(
            from = statement.from_date.as_deref().unwrap_or("?"),
            to = statement.to_date.as_deref().unwrap_or("?"),
            posted = statement.posted_transactions.len(),
            pending = statement.pending_transactions.len(),
            "Parsed Schwab statement"
        );

        let mut transactions = Vec::with_capacity(statement.posted_transactions.len());
        for tx in &statement.posted_transactions {
            let name = tx.description.trim();
            let category = match self.db.match_category(name) {
                Ok(category) => category,
                Err(e) => {
                    warn!(name, error = %e, "Category lookup failed");
                    None
                }
            };
            if category.is_none() {
                debug!(name, "No category match");
            }

            let date = match tx.date.as_deref() {
                Some(d) => parse_date_or_unknown(d, DATE_FORMAT, name),
                None => unknown_date(),
            };

            transactions.push(NewTransaction {
                id: Uuid::new_v4().to_string(),
                name: name.to_string(),
                amount: signed_amount(&tx.withdrawal, &tx.deposit, name),
                date,
                source: Source::Schwab,
                account: Source::Schwab.as_str().to_string(),
                raw_category: None,
                category_id: category.map(|c| c.id),
                description: None,
            });
        }

        Ok(transactions)
    }
}
