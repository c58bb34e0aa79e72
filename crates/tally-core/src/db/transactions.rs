//! Transaction operations

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};
use tracing::debug;

use super::query::{TransactionQuery, TRANSACTION_COLUMNS};
use super::Database;
use crate::error::{Error, Result};
use crate::models::{
    CategoryPresence, NewTransaction, ReviewItem, SortField, SortOrder, Transaction,
    TransactionUpdate,
};

impl Database {
    /// Insert a normalized transaction
    ///
    /// No deduplication: inserting the same statement twice stores it twice.
    pub fn insert_transaction(&self, tx: &NewTransaction) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO transactions (id, name, amount, date, source, account, raw_category, category_id, description)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                tx.id,
                tx.name,
                tx.amount,
                tx.date.to_string(),
                tx.source.as_str(),
                tx.account,
                tx.raw_category,
                tx.category_id,
                tx.description,
            ],
        )?;
        Ok(())
    }

    /// Helper to convert a row to Transaction
    /// Column order: see `TRANSACTION_COLUMNS`
    pub(crate) fn row_to_transaction(row: &rusqlite::Row) -> rusqlite::Result<Transaction> {
        let date_str: String = row.get(3)?;
        Ok(Transaction {
            id: row.get(0)?,
            name: row.get(1)?,
            amount: row.get(2)?,
            date: NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").unwrap_or_default(),
            source: row.get(4)?,
            account: row.get(5)?,
            raw_category: row.get(6)?,
            category_id: row.get(7)?,
            category: row.get(8)?,
            description: row.get(9)?,
        })
    }

    /// Get a single transaction by ID
    pub fn get_transaction(&self, id: &str) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM transactions t LEFT JOIN categories c ON c.id = t.category_id WHERE t.id = ?",
            TRANSACTION_COLUMNS
        );
        let transaction = conn
            .query_row(&sql, params![id], |row| Self::row_to_transaction(row))
            .optional()?;
        Ok(transaction)
    }

    /// Apply a partial update (category and/or note)
    ///
    /// An empty update is a no-op; an unknown id is `Error::NotFound`.
    pub fn update_transaction(&self, id: &str, update: &TransactionUpdate) -> Result<()> {
        let conn = self.conn()?;

        let exists: Option<String> = conn
            .query_row(
                "SELECT id FROM transactions WHERE id = ?",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_none() {
            return Err(Error::NotFound(format!("transaction {}", id)));
        }

        if update.is_empty() {
            return Ok(());
        }

        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        if let Some(category_id) = update.category_id {
            sets.push("category_id = ?");
            values.push(Box::new(category_id));
        }
        if let Some(ref description) = update.description {
            sets.push("description = ?");
            values.push(Box::new(description.clone()));
        }
        values.push(Box::new(id.to_string()));

        let sql = format!("UPDATE transactions SET {} WHERE id = ?", sets.join(", "));
        let refs: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();
        conn.execute(&sql, refs.as_slice())?;

        debug!(id, fields = sets.len(), "Updated transaction");
        Ok(())
    }

    /// Count total transactions
    pub fn count_transactions(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Uncategorized transactions, oldest first, each with a suggested category
    ///
    /// The name is tried first, then the bank's own category text.
    pub fn review_queue(&self, limit: Option<i64>) -> Result<Vec<ReviewItem>> {
        let query = TransactionQuery::new()
            .presence(CategoryPresence::Missing)
            .sort_by(SortField::Date, SortOrder::Asc)
            .limit(limit);

        let mut items = Vec::new();
        for transaction in self.query_transactions(&query)? {
            let mut suggestion = self.match_category(&transaction.name)?;
            if suggestion.is_none() {
                if let Some(ref raw) = transaction.raw_category {
                    suggestion = self.match_category(raw)?;
                }
            }
            items.push(ReviewItem {
                transaction,
                suggestion,
            });
        }
        Ok(items)
    }

    /// Date of the most recent transaction, if any
    pub fn latest_transaction_date(&self) -> Result<Option<NaiveDate>> {
        let conn = self.conn()?;
        let latest: Option<String> =
            conn.query_row("SELECT MAX(date) FROM transactions", [], |row| row.get(0))?;
        Ok(latest.and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()))
    }
}
