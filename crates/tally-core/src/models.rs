//! Domain models for Tally

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Institutions with a statement normalizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Citi,
    Schwab,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Citi => "citi",
            Self::Schwab => "schwab",
        }
    }

    /// All registered sources, in the order a full normalize run visits them
    pub fn all() -> &'static [Source] {
        &[Self::Schwab, Self::Citi]
    }
}

impl std::str::FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "citi" | "citibank" => Ok(Self::Citi),
            "schwab" => Ok(Self::Schwab),
            _ => Err(format!("Unknown source: {} (valid: citi, schwab)", s)),
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A persisted transaction, joined with its assigned category name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub name: String,
    /// Positive = outflow (expense), negative = inflow (income)
    pub amount: f64,
    pub date: NaiveDate,
    /// Normalizer that produced the row (free text for rows written by other tools)
    pub source: String,
    pub account: String,
    /// Category text supplied by the bank export
    pub raw_category: Option<String>,
    pub category_id: Option<i64>,
    /// Assigned category name
    pub category: Option<String>,
    /// User note, editable after import
    pub description: Option<String>,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.amount < 0.0
    }
}

/// A transaction produced by a normalizer (before DB insertion)
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub source: Source,
    pub account: String,
    pub raw_category: Option<String>,
    pub category_id: Option<i64>,
    pub description: Option<String>,
}

/// Partial update of a persisted transaction; `None` fields are left alone
#[derive(Debug, Clone, Default)]
pub struct TransactionUpdate {
    pub category_id: Option<i64>,
    pub description: Option<String>,
}

impl TransactionUpdate {
    pub fn is_empty(&self) -> bool {
        self.category_id.is_none() && self.description.is_none()
    }
}

/// A spending category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    /// Lower matches first; `None` matches after every prioritized category
    pub priority: Option<i64>,
}

/// One keyword of a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryValue {
    pub id: i64,
    pub category_id: i64,
    pub value: String,
}

/// An uncategorized transaction with the matcher's suggestion
#[derive(Debug, Clone, Serialize)]
pub struct ReviewItem {
    pub transaction: Transaction,
    pub suggestion: Option<Category>,
}

/// Income/expense discriminator, derived from the amount sign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// `amount < 0`
    Income,
    /// `amount >= 0`
    Expenses,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expenses => "expenses",
        }
    }

    pub fn of(amount: f64) -> Self {
        if amount < 0.0 {
            Self::Income
        } else {
            Self::Expenses
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expenses" | "expense" => Ok(Self::Expenses),
            _ => Err(format!("Unknown type: {} (valid: income, expenses)", s)),
        }
    }
}

/// Filter on whether a transaction has an assigned category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryPresence {
    /// No predicate
    #[default]
    Any,
    /// Only uncategorized transactions
    Missing,
    /// Only categorized transactions
    Present,
}

/// Sortable transaction columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Date,
    Amount,
    Name,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Amount => "amount",
            Self::Name => "name",
        }
    }

    /// Qualified column used in ORDER BY
    pub fn column(&self) -> &'static str {
        match self {
            Self::Date => "t.date",
            Self::Amount => "t.amount",
            Self::Name => "t.name",
        }
    }
}

impl std::str::FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "date" => Ok(Self::Date),
            "amount" => Ok(Self::Amount),
            "name" => Ok(Self::Name),
            _ => Err(format!(
                "Unknown sort column: {} (valid: date, amount, name)",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(format!("Unknown sort direction: {} (valid: asc, desc)", s)),
        }
    }
}

/// Calendar bucket for date-grouped totals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Year,
    Month,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Month => "month",
        }
    }

    /// strftime pattern for the bucket key ("2024", "03-2024")
    pub fn strftime(&self) -> &'static str {
        match self {
            Self::Year => "%Y",
            Self::Month => "%m-%Y",
        }
    }
}

impl std::str::FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "year" | "annual" | "yearly" => Ok(Self::Year),
            "month" | "monthly" => Ok(Self::Month),
            _ => Err(format!("Unknown granularity: {} (valid: year, month)", s)),
        }
    }
}

/// Summed amount for one calendar bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketTotal {
    pub key: String,
    pub total: f64,
}

/// Summed amount for one category; `None` is the uncategorized bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category_id: Option<i64>,
    pub category: Option<String>,
    pub total: f64,
}

/// A dated net worth snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetWorthItem {
    pub id: String,
    pub date: NaiveDate,
    pub cash: f64,
    pub investment: f64,
    /// Checking/debit balances
    pub debit: f64,
    pub credit: f64,
    pub savings: f64,
    pub retirement: f64,
    pub loans: f64,
}

impl NetWorthItem {
    /// Sum of the seven balance components
    pub fn net_worth(&self) -> f64 {
        self.cash
            + self.investment
            + self.debit
            + self.credit
            + self.savings
            + self.retirement
            + self.loans
    }
}

/// A snapshot before DB insertion
#[derive(Debug, Clone, Default)]
pub struct NewNetWorthItem {
    pub date: NaiveDate,
    pub cash: f64,
    pub investment: f64,
    pub debit: f64,
    pub credit: f64,
    pub savings: f64,
    pub retirement: f64,
    pub loans: f64,
}

/// Partial update of a snapshot; `None` fields are left alone
#[derive(Debug, Clone, Default)]
pub struct NetWorthUpdate {
    pub date: Option<NaiveDate>,
    pub cash: Option<f64>,
    pub investment: Option<f64>,
    pub debit: Option<f64>,
    pub credit: Option<f64>,
    pub savings: Option<f64>,
    pub retirement: Option<f64>,
    pub loans: Option<f64>,
}

/// Placeholder date for records whose date could not be parsed
pub fn unknown_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or_default()
}
