//! Integration tests for tally-core
//!
//! These tests exercise the full normalize → categorize → report workflow.

use std::path::Path;

use chrono::NaiveDate;
use tally_core::{
    db::Database,
    import::{normalize_all, CitiNormalizer, Normalizer, SchwabNormalizer},
    models::{
        CategoryPresence, Granularity, NewNetWorthItem, NewTransaction, Source, TransactionKind,
    },
    OverviewOptions, ReportCategories, Taxonomy, TransactionQuery,
};

/// Citi export with one purchase and one payment
fn citi_statement() -> &'static str {
    "Account Number: XXXX-4821
Statement period: Mar 01, 2024 - Mar 31, 2024

Exported from Citi Online
Amounts in USD
Date,Description,Debit,Credit,Category
\"Mar 03, 2024\",WHOLE FOODS MARKET #102,\"$1,234.56\",,Supermarkets
\"Mar 15, 2024\",AUTOPAY PAYMENT,,\"$500.00\",Payment/Credit
"
}

fn schwab_statement() -> &'static str {
    r#"{
        "FromDate": "03/01/2024",
        "ToDate": "03/31/2024",
        "PostedTransactions": [
            {"Description": "ACME INC DIRECT DEP PAYROLL", "Date": "03/14/2024", "Withdrawal": "", "Deposit": "$2,500.00"},
            {"Description": "CITI AUTOPAY", "Date": "03/15/2024", "Withdrawal": "$500.00", "Deposit": ""}
        ],
        "PendingTransactions": []
    }"#
}

fn taxonomy() -> Taxonomy {
    Taxonomy::from_json(
        r#"{
            "grocery": {"values": ["whole foods", "safeway"], "priority": 1},
            "debit": {"values": ["autopay"], "priority": 2},
            "work": {"values": ["payroll"], "priority": 3}
        }"#,
    )
    .expect("valid taxonomy")
}

fn write(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).expect("write statement");
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

// =============================================================================
// Normalizer Tests
// =============================================================================

#[test]
fn test_citi_statement_end_to_end() {
    let db = Database::in_memory().expect("Failed to create database");
    let tax = taxonomy();
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "From_2024-03.csv", citi_statement());

    let report = CitiNormalizer::new(&db, &tax)
        .normalize(dir.path())
        .expect("normalize");

    assert_eq!(report.files_processed, 1);
    assert_eq!(report.transactions_imported, 2);
    assert!(!dir.path().join("From_2024-03.csv").exists());

    let all = db.query_transactions(&TransactionQuery::new()).unwrap();
    assert_eq!(all.len(), 2);

    let purchase = all.iter().find(|t| t.amount > 0.0).unwrap();
    assert_eq!(purchase.amount, 1234.56);
    assert_eq!(purchase.category.as_deref(), Some("grocery"));
    assert_eq!(purchase.date, date("2024-03-03"));
    assert_eq!(purchase.source, "citi");

    let payment = all.iter().find(|t| t.amount < 0.0).unwrap();
    assert_eq!(payment.amount, -500.0);
    assert!(payment.is_income());
}

#[test]
fn test_unparseable_file_is_left_in_place() {
    let db = Database::in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "Checking_bad.json", "{\"PostedTransactions\": [oops");
    write(dir.path(), "Checking_good.json", schwab_statement());

    let report = SchwabNormalizer::new(&db).normalize(dir.path()).unwrap();

    assert_eq!(report.files_failed, 1);
    assert_eq!(report.files_processed, 1);
    assert_eq!(report.transactions_imported, 2);
    assert!(dir.path().join("Checking_bad.json").exists());
    assert!(!dir.path().join("Checking_good.json").exists());
}

#[test]
fn test_normalize_all_sources() {
    let db = Database::in_memory().unwrap();
    let tax = taxonomy();
    db.seed_taxonomy(&tax).unwrap();

    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "From_2024-03.csv", citi_statement());
    write(dir.path(), "Checking_2024-03.json", schwab_statement());
    write(dir.path(), "notes.txt", "not a statement");

    let report = normalize_all(&db, &tax, dir.path(), None).unwrap();
    assert_eq!(report.files_processed, 2);
    assert_eq!(report.transactions_imported, 4);
    assert_eq!(report.categorized, 4);
    assert!(dir.path().join("notes.txt").exists());

    let payroll = db
        .query_transactions(&TransactionQuery::new().category("work"))
        .unwrap();
    assert_eq!(payroll.len(), 1);
    assert_eq!(payroll[0].amount, -2500.0);
}

#[test]
fn test_normalize_single_source() {
    let db = Database::in_memory().unwrap();
    let tax = taxonomy();
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "From_2024-03.csv", citi_statement());
    write(dir.path(), "Checking_2024-03.json", schwab_statement());

    let report = normalize_all(&db, &tax, dir.path(), Some(Source::Citi)).unwrap();
    assert_eq!(report.files_processed, 1);
    assert!(dir.path().join("Checking_2024-03.json").exists());
}

#[test]
fn test_rerun_duplicates_rows() {
    let db = Database::in_memory().unwrap();
    let tax = taxonomy();
    let dir = tempfile::tempdir().unwrap();

    write(dir.path(), "From_a.csv", citi_statement());
    CitiNormalizer::new(&db, &tax).normalize(dir.path()).unwrap();
    write(dir.path(), "From_a.csv", citi_statement());
    CitiNormalizer::new(&db, &tax).normalize(dir.path()).unwrap();

    assert_eq!(db.count_transactions().unwrap(), 4);
}

// =============================================================================
// Query Tests
// =============================================================================

fn seeded_store() -> Database {
    let db = Database::in_memory().unwrap();
    let tax = taxonomy();
    db.seed_taxonomy(&tax).unwrap();

    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "From_2024-03.csv", citi_statement());
    write(dir.path(), "Checking_2024-03.json", schwab_statement());
    write(
        dir.path(),
        "From_2023-12.csv",
        "1\n2\n3\n4\n5\nDate,Description,Debit,Credit,Category\n\
         \"Dec 20, 2023\",SAFEWAY #9,80.00,,Supermarkets\n\
         \"Dec 22, 2023\",CORNER BODEGA,12.00,,Shopping\n",
    );
    normalize_all(&db, &tax, dir.path(), None).unwrap();
    db
}

#[test]
fn test_exclusion_filter() {
    let db = seeded_store();
    let rows = db
        .query_transactions(
            &TransactionQuery::new()
                .exclude(["debit"])
                .presence(CategoryPresence::Present),
        )
        .unwrap();

    assert!(!rows.is_empty());
    assert!(rows.iter().all(|t| t.category.as_deref() != Some("debit")));
    assert!(rows.iter().any(|t| t.category.as_deref() == Some("grocery")));
}

#[test]
fn test_exclusion_drops_uncategorized() {
    let db = seeded_store();
    let rows = db
        .query_transactions(&TransactionQuery::new().exclude(["debit"]))
        .unwrap();

    // grocery x2 and work remain; debit and the uncategorized bodega are gone
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|t| t.category.is_some()));
    assert!(!rows.iter().any(|t| t.name == "CORNER BODEGA"));
}

#[test]
fn test_income_filter_matches_sign() {
    let db = seeded_store();
    let income = db
        .query_transactions(&TransactionQuery::new().kind(Some(TransactionKind::Income)))
        .unwrap();
    assert!(!income.is_empty());
    assert!(income.iter().all(|t| t.amount < 0.0));

    let expenses = db
        .query_transactions(&TransactionQuery::new().kind(Some(TransactionKind::Expenses)))
        .unwrap();
    assert!(expenses.iter().all(|t| t.amount >= 0.0));
    assert_eq!(income.len() + expenses.len(), 6);
}

#[test]
fn test_uncategorized_filter() {
    let db = seeded_store();
    let missing = db
        .query_transactions(&TransactionQuery::new().presence(CategoryPresence::Missing))
        .unwrap();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].name, "CORNER BODEGA");
}

#[test]
fn test_bucket_and_category_totals() {
    let db = seeded_store();

    let yearly = db
        .bucket_totals(
            &TransactionQuery::new().category("grocery"),
            Granularity::Year,
        )
        .unwrap();
    let keys: Vec<&str> = yearly.iter().map(|b| b.key.as_str()).collect();
    assert_eq!(keys, vec!["2023", "2024"]);
    assert_eq!(yearly[0].total, 80.0);

    let monthly = db
        .bucket_totals(&TransactionQuery::new(), Granularity::Month)
        .unwrap();
    assert_eq!(monthly[0].key, "12-2023");
    assert_eq!(monthly[1].key, "03-2024");

    let by_category = db.category_totals(&TransactionQuery::new()).unwrap();
    // grocery, debit, work plus the uncategorized bucket
    assert_eq!(by_category.len(), 4);
    let uncategorized = by_category.last().unwrap();
    assert!(uncategorized.category.is_none());
    assert_eq!(uncategorized.total, 12.0);
}

// =============================================================================
// Report Tests
// =============================================================================

#[test]
fn test_overview_defaults_to_latest_month() {
    let db = seeded_store();
    let overview = db
        .overview(&OverviewOptions::default(), &ReportCategories::default())
        .unwrap();

    assert_eq!(overview.start, date("2024-03-01"));
    assert_eq!(overview.end, date("2024-03-31"));
    // debit-categorized transfers are left out
    assert_eq!(overview.transactions.len(), 2);
    assert_eq!(overview.expense_total, 1234.56);
    assert_eq!(overview.income_total, 2500.0);
    assert_eq!(overview.income_categories.len(), 1);
    assert_eq!(overview.income_categories[0].total, -2500.0);

    // Trailing window reaches back to December
    assert_eq!(overview.monthly_expenses.len(), 2);
    assert_eq!(overview.monthly_net.len(), 1);
    assert_eq!(overview.monthly_net[0].key, "03-2024");
}

#[test]
fn test_overview_leaves_out_uncategorized() {
    let db = seeded_store();
    db.insert_transaction(&NewTransaction {
        id: "loose".to_string(),
        name: "MYSTERY VENDOR".to_string(),
        amount: 99.0,
        date: date("2024-03-20"),
        source: Source::Citi,
        account: "citi".to_string(),
        raw_category: None,
        category_id: None,
        description: None,
    })
    .unwrap();

    let overview = db
        .overview(&OverviewOptions::default(), &ReportCategories::default())
        .unwrap();
    assert_eq!(overview.transactions.len(), 2);
    assert_eq!(overview.expense_total, 1234.56);
    assert!(overview.expense_categories.iter().all(|c| c.category.is_some()));
    assert_eq!(overview.monthly_expenses[1].total, 1234.56);
}

#[test]
fn test_annual_report() {
    let db = seeded_store();
    let annual = db.annual_report(&ReportCategories::default()).unwrap();

    assert_eq!(annual.income.len(), 1);
    assert_eq!(annual.expenses.len(), 2);
    assert_eq!(annual.net[0].key, "2024");
    assert_eq!(annual.net[0].net, -2500.0 + 1234.56);
}

// =============================================================================
// Net Worth Tests
// =============================================================================

#[test]
fn test_net_worth_history() {
    let db = Database::in_memory().unwrap();
    db.create_net_worth(&NewNetWorthItem {
        date: date("2024-01-31"),
        cash: 60.0,
        savings: 40.0,
        ..Default::default()
    })
    .unwrap();
    db.create_net_worth(&NewNetWorthItem {
        date: date("2024-02-29"),
        cash: 70.0,
        savings: 40.0,
        ..Default::default()
    })
    .unwrap();

    let history = db.net_worth_history(None).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].net_worth, 110.0);
    assert_eq!(history[0].change, Some(10.0));
    assert_eq!(history[0].change_percent.as_deref(), Some("10.00%"));
    assert!(history[1].change.is_none());
}
