//! Citi credit card CSV exports
//!
//! Files start with `From`. Five preamble lines precede a CSV table with a
//! header row: `Date,Description,Debit,Credit,Category` where dates look like
//! `Jan 02, 2024`.

use std::io::{BufRead, BufReader};
use std::path::Path;

use csv::ReaderBuilder;
use tracing::debug;
use uuid::Uuid;

use super::{parse_date_or_unknown, signed_amount, Normalizer};
use crate::db::Database;
use crate::error::Result;
use crate::models::{NewTransaction, Source};
use crate::taxonomy::Taxonomy;

const PREAMBLE_LINES: usize = 5;
const DATE_FORMAT: &str = "%b %d, %Y";

/// Categorizes against an in-memory taxonomy, matching either the
/// transaction name or Citi's own category column
pub struct CitiNormalizer<'a> {
    db: &'a Database,
    taxonomy: &'a Taxonomy,
}

impl<'a> CitiNormalizer<'a> {
    pub fn new(db: &'a Database, taxonomy: &'a Taxonomy) -> Self {
        Self { db, taxonomy }
    }
}

impl Normalizer for CitiNormalizer<'_> {
    fn source(&self) -> Source {
        Source::Citi
    }

    fn file_prefix(&self) -> &'static str {
        "From"
    }

    fn database(&self) -> &Database {
        self.db
    }

    fn parse_file(&self, path: &Path) -> Result<Vec<NewTransaction>> {
        let file = std::fs::File::open(path)?;
        let mut reader = BufReader::new(file);

        let mut line = String::new();
        for _ in 0..PREAMBLE_LINES {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
        }

        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let category_ids = self.db.ensure_categories(self.taxonomy)?;
        let mut transactions = Vec::new();

        for result in rdr.records() {
            let record = result?;
            let field = |i: usize| record.get(i).unwrap_or("").trim();

            let name = field(1);
            let raw_category = field(4);
            let category_id = self
                .taxonomy
                .match_any(&[name, raw_category])
                .and_then(|entry| category_ids.get(&entry.name).copied());

            transactions.push(NewTransaction {
                id: Uuid::new_v4().to_string(),
                name: name.to_string(),
                amount: signed_amount(field(2), field(3), name),
                date: parse_date_or_unknown(field(0), DATE_FORMAT, name),
                source: Source::Citi,
                account: Source::Citi.as_str().to_string(),
                raw_category: Some(raw_category.to_string()).filter(|c| !c.is_empty()),
                category_id,
                description: None,
            });
        }

        debug!("Parsed {} Citi transactions", transactions.len());
        Ok(transactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::TaxonomyEntry;
    use chrono::NaiveDate;

    const STATEMENT: &str = "Account Number: XXXX-1234
Statement period: Jan 01, 2024 - Jan 31, 2024

Card: Costco Anywhere Visa
Generated by Citi Online
Date,Description,Debit,Credit,Category
\"Jan 05, 2024\",TRADER JOE'S #552,\"$1,045.20\",,Supermarkets
\"Jan 09, 2024\",ONLINE PAYMENT THANK YOU,,250.00,Payment/Credit
\"Jan 11, 2024\",SQ *BLUE BOTTLE,4.75,,Restaurants
";

    fn taxonomy() -> Taxonomy {
        Taxonomy::new(vec![
            TaxonomyEntry::new("grocery", &["trader joe"], Some(1)),
            TaxonomyEntry::new("dining", &["restaurants"], Some(2)),
        ])
    }

    #[test]
    fn test_parse_statement() {
        let db = Database::in_memory().unwrap();
        let tax = taxonomy();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("From 2024-01.csv");
        std::fs::write(&path, STATEMENT).unwrap();

        let txs = CitiNormalizer::new(&db, &tax).parse_file(&path).unwrap();
        assert_eq!(txs.len(), 3);

        assert_eq!(txs[0].name, "TRADER JOE'S #552");
        assert_eq!(txs[0].amount, 1045.20);
        assert_eq!(txs[0].date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(txs[0].raw_category.as_deref(), Some("Supermarkets"));
        assert_eq!(txs[0].account, "citi");

        let grocery = db.get_category_by_name("grocery").unwrap().unwrap();
        assert_eq!(txs[0].category_id, Some(grocery.id));

        // Credit is negated; nothing in the taxonomy matches it
        assert_eq!(txs[1].amount, -250.0);
        assert!(txs[1].category_id.is_none());

        // Matched through the raw category column
        let dining = db.get_category_by_name("dining").unwrap().unwrap();
        assert_eq!(txs[2].category_id, Some(dining.id));
    }

    #[test]
    fn test_bad_date_and_amount_are_best_effort() {
        let db = Database::in_memory().unwrap();
        let tax = Taxonomy::default();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("From bad.csv");
        std::fs::write(
            &path,
            "1\n2\n3\n4\n5\nDate,Description,Debit,Credit,Category\nsometime,MYSTERY,abc,,\n",
        )
        .unwrap();

        let txs = CitiNormalizer::new(&db, &tax).parse_file(&path).unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].amount, 0.0);
        assert_eq!(txs[0].date.to_string(), "0001-01-01");
        assert!(txs[0].raw_category.is_none());
    }
}
