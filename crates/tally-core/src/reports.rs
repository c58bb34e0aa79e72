//! Spending reports built on the filtered query builder
//!
//! Income is identified by category (`ReportCategories::income`) rather than by
//! sign alone, so refunds in expense categories stay on the expense side.

use chrono::{Datelike, Local, Months, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::db::{Database, TransactionQuery};
use crate::error::Result;
use crate::models::{
    BucketTotal, CategoryTotal, Granularity, SortField, SortOrder, Transaction, TransactionKind,
};

/// Category names with special meaning in reports
#[derive(Debug, Clone, PartialEq)]
pub struct ReportCategories {
    /// Categories counted as income
    pub income: Vec<String>,
    /// Categories left out of every report (transfers between own accounts)
    pub excluded: Vec<String>,
}

impl Default for ReportCategories {
    fn default() -> Self {
        Self {
            income: ["work", "interest", "venmo", "miscellaneousIncome"]
                .into_iter()
                .map(String::from)
                .collect(),
            excluded: vec!["debit".to_string()],
        }
    }
}

impl ReportCategories {
    /// Exclusions for expense figures: transfers plus income categories
    fn expense_exclusions(&self) -> Vec<String> {
        self.excluded.iter().chain(&self.income).cloned().collect()
    }

    fn expense_query(&self, selected: &[String]) -> TransactionQuery {
        TransactionQuery::new()
            .categories(selected.iter().cloned())
            .exclude(self.expense_exclusions())
    }

    fn income_query(&self) -> TransactionQuery {
        TransactionQuery::new()
            .categories(self.income.iter().cloned())
            .exclude(self.excluded.iter().cloned())
    }
}

/// Income plus expense for one bucket key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetTotal {
    pub key: String,
    pub net: f64,
}

/// Per-bucket net, keyed by the income series
///
/// Income sums are negative, so a negative net is a surplus.
pub fn net_totals(expenses: &[BucketTotal], income: &[BucketTotal]) -> Vec<NetTotal> {
    income
        .iter()
        .map(|i| {
            let expense = expenses
                .iter()
                .find(|e| e.key == i.key)
                .map(|e| e.total)
                .unwrap_or(0.0);
            NetTotal {
                key: i.key.clone(),
                net: i.total + expense,
            }
        })
        .collect()
}

/// First and last day of the month containing `date`
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .unwrap_or(date);
    (first, last)
}

/// Options for the overview report
#[derive(Debug, Clone)]
pub struct OverviewOptions {
    /// Defaults to the month of the most recent transaction
    pub range: Option<(NaiveDate, NaiveDate)>,
    /// Restrict detail rows and expense figures to these categories
    pub categories: Vec<String>,
    pub sort: (SortField, SortOrder),
}

impl Default for OverviewOptions {
    fn default() -> Self {
        Self {
            range: None,
            categories: Vec::new(),
            sort: (SortField::Amount, SortOrder::Desc),
        }
    }
}

/// One period's transactions with totals and trailing monthly series
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub transactions: Vec<Transaction>,
    /// Sum of outflows
    pub expense_total: f64,
    /// Sum of inflows, as a positive number
    pub income_total: f64,
    /// `income_total - expense_total`
    pub net: f64,
    pub expense_categories: Vec<CategoryTotal>,
    pub income_categories: Vec<CategoryTotal>,
    /// Trailing 12 months ending with `end`
    pub monthly_expenses: Vec<BucketTotal>,
    pub monthly_income: Vec<BucketTotal>,
    pub monthly_net: Vec<NetTotal>,
}

/// Year-by-year income, expenses and net
#[derive(Debug, Clone, Serialize)]
pub struct AnnualReport {
    pub income: Vec<BucketTotal>,
    pub expenses: Vec<BucketTotal>,
    pub net: Vec<NetTotal>,
}

impl Database {
    /// Overview of one period (see `OverviewOptions`)
    pub fn overview(
        &self,
        options: &OverviewOptions,
        categories: &ReportCategories,
    ) -> Result<Overview> {
        let (start, end) = match options.range {
            Some(range) => range,
            None => {
                let anchor = self
                    .latest_transaction_date()?
                    .unwrap_or_else(|| Local::now().date_naive());
                month_bounds(anchor)
            }
        };
        debug!(%start, %end, "Building overview");

        let (sort_field, sort_order) = options.sort;
        let transactions = self.query_transactions(
            &TransactionQuery::new()
                .date_range(start, end)
                .categories(options.categories.iter().cloned())
                .exclude(categories.excluded.iter().cloned())
                .sort_by(sort_field, sort_order),
        )?;

        let mut expense_total = 0.0;
        let mut income_total = 0.0;
        for tx in &transactions {
            match TransactionKind::of(tx.amount) {
                TransactionKind::Expenses => expense_total += tx.amount,
                TransactionKind::Income => income_total += tx.amount.abs(),
            }
        }

        let expense_categories = self.category_totals(
            &categories
                .expense_query(&options.categories)
                .date_range(start, end),
        )?;
        let income_categories =
            self.category_totals(&categories.income_query().date_range(start, end))?;

        let trailing_start = end
            .checked_sub_months(Months::new(11))
            .map(|d| month_bounds(d).0)
            .unwrap_or(start);
        let monthly_expenses = self.bucket_totals(
            &categories
                .expense_query(&options.categories)
                .date_range(trailing_start, end),
            Granularity::Month,
        )?;
        let monthly_income = self.bucket_totals(
            &categories.income_query().date_range(trailing_start, end),
            Granularity::Month,
        )?;
        let monthly_net = net_totals(&monthly_expenses, &monthly_income);

        Ok(Overview {
            start,
            end,
            transactions,
            expense_total,
            income_total,
            net: income_total - expense_total,
            expense_categories,
            income_categories,
            monthly_expenses,
            monthly_income,
            monthly_net,
        })
    }

    /// Income, expenses and net per calendar year
    pub fn annual_report(&self, categories: &ReportCategories) -> Result<AnnualReport> {
        let income = self.bucket_totals(&categories.income_query(), Granularity::Year)?;
        let expenses = self.bucket_totals(&categories.expense_query(&[]), Granularity::Year)?;
        let net = net_totals(&expenses, &income);
        Ok(AnnualReport {
            income,
            expenses,
            net,
        })
    }
}
