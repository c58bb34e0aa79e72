//! Filtered query builder for transaction detail and aggregate queries
//!
//! Every filter value is bound as a positional parameter. The only text spliced
//! into SQL is the sort column, sort direction and bucket pattern, and those come
//! from closed enums (`SortField`, `SortOrder`, `Granularity`), so user input has
//! to pass `parse_allowed` before it can influence the query text.

use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::types::Value;
use tracing::debug;

use super::Database;
use crate::error::{Error, Result};
use crate::models::{
    BucketTotal, CategoryPresence, CategoryTotal, Granularity, SortField, SortOrder, Transaction,
    TransactionKind,
};

/// Columns selected by detail queries, in `row_to_transaction` order
pub(crate) const TRANSACTION_COLUMNS: &str = "t.id, t.name, t.amount, t.date, t.source, \
     t.account, t.raw_category, t.category_id, c.name, t.description";

const FROM_TRANSACTIONS: &str =
    "FROM transactions t LEFT JOIN categories c ON c.id = t.category_id";

/// Parse a user-supplied sort column, direction or bucket name
///
/// Anything outside the allow-list is rejected with `Error::InvalidQuery`.
pub fn parse_allowed<T: FromStr<Err = String>>(input: &str) -> Result<T> {
    input.trim().parse().map_err(Error::InvalidQuery)
}

/// Declarative transaction filter
///
/// Absent fields add no predicate. Predicates are AND-combined in a fixed order:
/// date range, included categories, type, excluded categories, category presence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// OR-group of category names
    pub categories: Vec<String>,
    /// Each becomes its own inequality predicate
    pub exclude: Vec<String>,
    pub kind: Option<TransactionKind>,
    pub presence: CategoryPresence,
    pub sort: Option<(SortField, SortOrder)>,
    pub limit: Option<i64>,
}

/// SQL text plus its positional parameters
#[derive(Debug, Clone, PartialEq)]
pub struct FilterResult {
    pub sql: String,
    pub params: Vec<Value>,
}

impl FilterResult {
    /// Get parameter references for query execution
    pub fn params_refs(&self) -> Vec<&dyn rusqlite::ToSql> {
        self.params
            .iter()
            .map(|p| p as &dyn rusqlite::ToSql)
            .collect()
    }
}

impl TransactionQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_date(mut self, date: Option<NaiveDate>) -> Self {
        self.start_date = date;
        self
    }

    pub fn end_date(mut self, date: Option<NaiveDate>) -> Self {
        self.end_date = date;
        self
    }

    /// Set both ends of an inclusive date range
    pub fn date_range(self, from: NaiveDate, to: NaiveDate) -> Self {
        self.start_date(Some(from)).end_date(Some(to))
    }

    pub fn category(mut self, name: impl Into<String>) -> Self {
        self.categories.push(name.into());
        self
    }

    pub fn categories<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn kind(mut self, kind: Option<TransactionKind>) -> Self {
        self.kind = kind;
        self
    }

    pub fn presence(mut self, presence: CategoryPresence) -> Self {
        self.presence = presence;
        self
    }

    pub fn sort_by(mut self, field: SortField, order: SortOrder) -> Self {
        self.sort = Some((field, order));
        self
    }

    /// Validate and set the sort from user-supplied names
    pub fn sort_by_name(self, field: &str, order: &str) -> Result<Self> {
        Ok(self.sort_by(parse_allowed(field)?, parse_allowed(order)?))
    }

    pub fn limit(mut self, limit: Option<i64>) -> Self {
        self.limit = limit;
        self
    }

    /// WHERE clause (including the keyword, empty when unfiltered) and its params
    fn build_where(&self) -> (String, Vec<Value>) {
        let mut conditions: Vec<String> = Vec::new();
        let mut params: Vec<Value> = Vec::new();

        if let Some(start) = self.start_date {
            conditions.push("t.date >= ?".to_string());
            params.push(Value::from(start.to_string()));
        }
        if let Some(end) = self.end_date {
            conditions.push("t.date <= ?".to_string());
            params.push(Value::from(end.to_string()));
        }

        if !self.categories.is_empty() {
            let group: Vec<&str> = self.categories.iter().map(|_| "c.name = ?").collect();
            conditions.push(format!("({})", group.join(" OR ")));
            params.extend(self.categories.iter().map(|c| Value::from(c.clone())));
        }

        match self.kind {
            Some(TransactionKind::Income) => conditions.push("t.amount < 0".to_string()),
            Some(TransactionKind::Expenses) => conditions.push("t.amount >= 0".to_string()),
            None => {}
        }

        // `!=` is never true against NULL, so uncategorized rows drop out too
        for name in &self.exclude {
            conditions.push("c.name != ?".to_string());
            params.push(Value::from(name.clone()));
        }

        match self.presence {
            CategoryPresence::Missing => conditions.push("c.name IS NULL".to_string()),
            CategoryPresence::Present => conditions.push("c.name IS NOT NULL".to_string()),
            CategoryPresence::Any => {}
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        (where_clause, params)
    }

    /// Compose `base_select` (a SELECT list without FROM) with the joined
    /// transaction table, filters, ordering and limit
    pub fn build(&self, base_select: &str) -> FilterResult {
        let (where_clause, mut params) = self.build_where();

        let mut sql = format!("{} {}", base_select, FROM_TRANSACTIONS);
        if !where_clause.is_empty() {
            sql.push(' ');
            sql.push_str(&where_clause);
        }
        if let Some((field, order)) = self.sort {
            sql.push_str(&format!(
                " ORDER BY {} {}, t.id {}",
                field.column(),
                order.as_sql(),
                order.as_sql()
            ));
        }
        if let Some(limit) = self.limit {
            sql.push_str(" LIMIT ?");
            params.push(Value::from(limit));
        }

        FilterResult { sql, params }
    }

    /// Detail rows
    pub fn build_detail(&self) -> FilterResult {
        self.build(&format!("SELECT {}", TRANSACTION_COLUMNS))
    }

    /// `(category_id, category_name, sum)` per category, uncategorized last
    pub fn build_category_totals(&self) -> FilterResult {
        let (where_clause, params) = self.build_where();
        let sql = format!(
            "SELECT c.id, c.name, SUM(t.amount) {} {} GROUP BY c.id ORDER BY c.name IS NULL, c.name",
            FROM_TRANSACTIONS, where_clause
        );
        FilterResult { sql, params }
    }

    /// `(bucket, sum)` per calendar bucket, oldest first
    pub fn build_bucket_totals(&self, granularity: Granularity) -> FilterResult {
        let (where_clause, params) = self.build_where();
        let sql = format!(
            "SELECT strftime('{}', t.date) AS bucket, SUM(t.amount) {} {} GROUP BY bucket ORDER BY MIN(t.date)",
            granularity.strftime(),
            FROM_TRANSACTIONS,
            where_clause
        );
        FilterResult { sql, params }
    }
}

impl Database {
    /// Transactions matching the filter
    pub fn query_transactions(&self, query: &TransactionQuery) -> Result<Vec<Transaction>> {
        let built = query.build_detail();
        debug!(sql = %built.sql, params = built.params.len(), "Transaction query");

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&built.sql)?;
        let transactions = stmt
            .query_map(built.params_refs().as_slice(), |row| {
                Self::row_to_transaction(row)
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(transactions)
    }

    /// Summed amounts per category for the filter
    pub fn category_totals(&self, query: &TransactionQuery) -> Result<Vec<CategoryTotal>> {
        let built = query.build_category_totals();
        debug!(sql = %built.sql, "Category totals query");

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&built.sql)?;
        let totals = stmt
            .query_map(built.params_refs().as_slice(), |row| {
                Ok(CategoryTotal {
                    category_id: row.get(0)?,
                    category: row.get(1)?,
                    total: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(totals)
    }

    /// Summed amounts per calendar bucket for the filter
    pub fn bucket_totals(
        &self,
        query: &TransactionQuery,
        granularity: Granularity,
    ) -> Result<Vec<BucketTotal>> {
        let built = query.build_bucket_totals(granularity);
        debug!(sql = %built.sql, "Bucket totals query");

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&built.sql)?;
        let totals = stmt
            .query_map(built.params_refs().as_slice(), |row| {
                Ok(BucketTotal {
                    key: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                    total: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(totals)
    }
}
