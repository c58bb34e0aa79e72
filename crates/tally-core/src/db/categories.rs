//! Category taxonomy storage and the persisted category matcher

use std::collections::HashMap;

use rusqlite::{params, OptionalExtension};
use tracing::{debug, info};

use super::Database;
use crate::error::{Error, Result};
use crate::models::Category;
use crate::taxonomy::{Taxonomy, TaxonomyEntry};

/// Outcome of seeding categories from a taxonomy file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedResult {
    pub categories_created: usize,
    pub categories_existing: usize,
    pub values_added: usize,
}

const CATEGORY_ORDER: &str = "ORDER BY c.priority IS NULL, c.priority, c.id";

impl Database {
    /// Create a category, returning its id
    pub fn create_category(&self, name: &str, priority: Option<i64>) -> Result<i64> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidData("Category name cannot be empty".into()));
        }

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO categories (name, priority) VALUES (?, ?)",
            params![name, priority],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Add a keyword to a category (no-op if already present)
    ///
    /// Returns true if the value was new.
    pub fn add_category_value(&self, category_id: i64, value: &str) -> Result<bool> {
        let value = value.trim();
        if value.is_empty() {
            return Err(Error::InvalidData("Category value cannot be empty".into()));
        }

        let conn = self.conn()?;
        let exists: Option<i64> = conn
            .query_row(
                "SELECT id FROM categories WHERE id = ?",
                params![category_id],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_none() {
            return Err(Error::NotFound(format!("category {}", category_id)));
        }

        let changed = conn.execute(
            "INSERT OR IGNORE INTO category_values (category_id, value) VALUES (?, ?)",
            params![category_id, value],
        )?;
        Ok(changed > 0)
    }

    /// All categories in match order
    pub fn list_categories(&self) -> Result<Vec<Category>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT c.id, c.name, c.priority FROM categories c {}",
            CATEGORY_ORDER
        );
        let mut stmt = conn.prepare(&sql)?;
        let categories = stmt
            .query_map([], Self::row_to_category)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    pub fn get_category_by_name(&self, name: &str) -> Result<Option<Category>> {
        let conn = self.conn()?;
        let category = conn
            .query_row(
                "SELECT c.id, c.name, c.priority FROM categories c WHERE c.name = ?",
                params![name.trim()],
                Self::row_to_category,
            )
            .optional()?;
        Ok(category)
    }

    /// Load the stored taxonomy (categories with their values, in match order)
    pub fn load_taxonomy(&self) -> Result<Taxonomy> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT value FROM category_values WHERE category_id = ? ORDER BY id")?;

        let mut entries = Vec::new();
        for category in self.list_categories()? {
            let values = stmt
                .query_map(params![category.id], |row| row.get::<_, String>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            entries.push(TaxonomyEntry {
                name: category.name,
                values,
                priority: category.priority,
            });
        }

        Ok(Taxonomy::new(entries))
    }

    /// Categories whose values occur in the lower-cased text, in match order
    pub fn search_categories(&self, text: &str) -> Result<Vec<Category>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.conn()?;
        let sql = format!(
            r#"
            SELECT c.id, c.name, c.priority
            FROM categories c
            JOIN category_values cv ON cv.category_id = c.id
            WHERE cv.value != '' AND instr(lower(?), cv.value) > 0
            GROUP BY c.id
            {}
            "#,
            CATEGORY_ORDER
        );
        let mut stmt = conn.prepare(&sql)?;
        let categories = stmt
            .query_map(params![text], Self::row_to_category)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    /// Best matching category for the text, if any
    pub fn match_category(&self, text: &str) -> Result<Option<Category>> {
        let category = self.search_categories(text)?.into_iter().next();
        if let Some(ref c) = category {
            debug!(text, category = %c.name, "Matched category");
        }
        Ok(category)
    }

    /// Insert taxonomy categories and values, skipping categories that already
    /// exist by name (their values are still merged in)
    pub fn seed_taxonomy(&self, taxonomy: &Taxonomy) -> Result<SeedResult> {
        let mut result = SeedResult::default();

        for entry in taxonomy.entries() {
            let id = match self.get_category_by_name(&entry.name)? {
                Some(existing) => {
                    result.categories_existing += 1;
                    existing.id
                }
                None => {
                    result.categories_created += 1;
                    self.create_category(&entry.name, entry.priority)?
                }
            };

            for value in entry.values.iter().filter(|v| !v.trim().is_empty()) {
                if self.add_category_value(id, value)? {
                    result.values_added += 1;
                }
            }
        }

        info!(
            created = result.categories_created,
            existing = result.categories_existing,
            values = result.values_added,
            "Seeded categories"
        );
        Ok(result)
    }

    /// Ids for every taxonomy category, creating missing ones (without values)
    pub fn ensure_categories(&self, taxonomy: &Taxonomy) -> Result<HashMap<String, i64>> {
        let mut ids = HashMap::with_capacity(taxonomy.len());
        for entry in taxonomy.entries() {
            let id = match self.get_category_by_name(&entry.name)? {
                Some(existing) => existing.id,
                None => self.create_category(&entry.name, entry.priority)?,
            };
            ids.insert(entry.name.clone(), id);
        }
        Ok(ids)
    }

    fn row_to_category(row: &rusqlite::Row) -> rusqlite::Result<Category> {
        Ok(Category {
            id: row.get(0)?,
            name: row.get(1)?,
            priority: row.get(2)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Database {
        let db = Database::in_memory().unwrap();
        let taxonomy = Taxonomy::new(vec![
            TaxonomyEntry::new("misc", &["coffee", "shop"], None),
            TaxonomyEntry::new("shopping", &["shop"], Some(2)),
            TaxonomyEntry::new("coffee", &["coffee"], Some(1)),
        ]);
        db.seed_taxonomy(&taxonomy).unwrap();
        db
    }

    #[test]
    fn test_search_orders_by_priority_nulls_last() {
        let db = seeded();
        let names: Vec<String> = db
            .search_categories("COFFEE SHOP")
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["coffee", "shopping", "misc"]);
    }

    #[test]
    fn test_match_category() {
        let db = seeded();
        assert_eq!(db.match_category("Pet Shop").unwrap().unwrap().name, "shopping");
        assert!(db.match_category("landlord").unwrap().is_none());
        assert!(db.match_category("").unwrap().is_none());
    }

    #[test]
    fn test_seed_is_idempotent() {
        let db = seeded();
        let again = db
            .seed_taxonomy(&Taxonomy::new(vec![TaxonomyEntry::new(
                "coffee",
                &["coffee", "espresso"],
                Some(9),
            )]))
            .unwrap();
        assert_eq!(
            again,
            SeedResult {
                categories_created: 0,
                categories_existing: 1,
                values_added: 1,
            }
        );

        let coffee = db.get_category_by_name("coffee").unwrap().unwrap();
        // Existing priority is left alone
        assert_eq!(coffee.priority, Some(1));
        assert_eq!(db.list_categories().unwrap().len(), 3);
    }

    #[test]
    fn test_load_taxonomy_round_trips_store() {
        let db = seeded();
        let taxonomy = db.load_taxonomy().unwrap();
        let names: Vec<&str> = taxonomy.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["coffee", "shopping", "misc"]);
        assert_eq!(taxonomy.entries()[2].values, vec!["coffee", "shop"]);
    }

    #[test]
    fn test_create_category_rejects_duplicates_and_blank() {
        let db = seeded();
        assert!(matches!(
            db.create_category("coffee", None),
            Err(Error::Database(_))
        ));
        assert!(matches!(
            db.create_category("  ", None),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_add_value_to_unknown_category() {
        let db = Database::in_memory().unwrap();
        assert!(matches!(
            db.add_category_value(999, "x"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_ensure_categories_creates_missing() {
        let db = seeded();
        let ids = db
            .ensure_categories(&Taxonomy::new(vec![
                TaxonomyEntry::new("coffee", &["coffee"], None),
                TaxonomyEntry::new("rent", &["apts"], None),
            ]))
            .unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(
            db.get_category_by_name("rent").unwrap().unwrap().id,
            ids["rent"]
        );
    }
}
