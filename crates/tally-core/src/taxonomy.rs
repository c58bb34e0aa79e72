//! Category taxonomy and the in-memory category matcher
//!
//! A taxonomy maps category names to keyword values. Matching lower-cases the
//! search text and walks categories by ascending priority (unset priorities
//! last, declaration order among ties); the first category with a value that
//! occurs as a substring of the text wins.
//!
//! Matching is plain substring search, so "gas" matches "las vegas".

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// One category of the taxonomy
#[derive(Debug, Clone, PartialEq)]
pub struct TaxonomyEntry {
    pub name: String,
    pub values: Vec<String>,
    pub priority: Option<i64>,
}

impl TaxonomyEntry {
    pub fn new(name: impl Into<String>, values: &[&str], priority: Option<i64>) -> Self {
        Self {
            name: name.into(),
            values: values.iter().map(|v| v.to_string()).collect(),
            priority,
        }
    }

    /// First value occurring in any of the (already lower-cased) texts
    fn first_hit(&self, texts: &[String]) -> Option<&str> {
        self.values
            .iter()
            .filter(|v| !v.is_empty())
            .find(|v| texts.iter().any(|t| t.contains(v.as_str())))
            .map(|v| v.as_str())
    }
}

/// Per-entry shape of a taxonomy file
///
/// Accepts both the bare keyword list and the seed form with a priority.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Values(Vec<String>),
    Seeded {
        values: Vec<String>,
        #[serde(default)]
        priority: Option<i64>,
    },
}

/// Ordered set of categories used for matching
#[derive(Debug, Clone, Default)]
pub struct Taxonomy {
    /// Sorted by priority (unset last), stable over declaration order
    entries: Vec<TaxonomyEntry>,
}

impl Taxonomy {
    pub fn new(mut entries: Vec<TaxonomyEntry>) -> Self {
        // Stable sort keeps declaration order among equal and unset priorities
        entries.sort_by_key(|e| (e.priority.is_none(), e.priority));
        Self { entries }
    }

    /// Parse a taxonomy from JSON text
    ///
    /// `{"groceries": ["safeway", "trader joe"], "rent": {"values": ["apts"], "priority": 1}}`
    pub fn from_json(text: &str) -> Result<Self> {
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(text)?;

        let mut entries = Vec::with_capacity(map.len());
        for (name, value) in map {
            let raw: RawEntry = serde_json::from_value(value).map_err(|e| {
                Error::InvalidData(format!("Invalid taxonomy entry '{}': {}", name, e))
            })?;
            let (values, priority) = match raw {
                RawEntry::Values(values) => (values, None),
                RawEntry::Seeded { values, priority } => (values, priority),
            };
            entries.push(TaxonomyEntry {
                name,
                values,
                priority,
            });
        }

        Ok(Self::new(entries))
    }

    /// Load a taxonomy file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let taxonomy = Self::from_json(&text)?;
        debug!(
            path = %path.display(),
            categories = taxonomy.len(),
            "Loaded taxonomy"
        );
        Ok(taxonomy)
    }

    pub fn entries(&self) -> &[TaxonomyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Match a single search text
    pub fn match_text(&self, text: &str) -> Option<&TaxonomyEntry> {
        self.match_any(&[text])
    }

    /// Match several texts at once; a category matches when any of its
    /// values occurs in any of the texts
    pub fn match_any(&self, texts: &[&str]) -> Option<&TaxonomyEntry> {
        let lowered: Vec<String> = texts
            .iter()
            .filter(|t| !t.is_empty())
            .map(|t| t.to_lowercase())
            .collect();
        if lowered.is_empty() {
            return None;
        }

        for entry in &self.entries {
            if let Some(value) = entry.first_hit(&lowered) {
                debug!(category = %entry.name, value, "Taxonomy match");
                return Some(entry);
            }
        }
        None
    }

    /// Preview categorization for a batch of texts
    pub fn search<'a>(&self, texts: &[&'a str]) -> Vec<(&'a str, Option<&str>)> {
        texts
            .iter()
            .map(|t| (*t, self.match_text(t).map(|e| e.name.as_str())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Taxonomy {
        Taxonomy::new(vec![
            TaxonomyEntry::new("shopping", &["shop"], Some(2)),
            TaxonomyEntry::new("misc", &["coffee", "shop"], None),
            TaxonomyEntry::new("coffee", &["coffee"], Some(1)),
        ])
    }

    #[test]
    fn test_priority_order_wins() {
        let tax = sample();
        assert_eq!(tax.match_text("Coffee Shop").unwrap().name, "coffee");
        assert_eq!(tax.match_text("PET SHOP #12").unwrap().name, "shopping");
    }

    #[test]
    fn test_unprioritized_match_last() {
        let tax = Taxonomy::new(vec![
            TaxonomyEntry::new("first_declared", &["market"], None),
            TaxonomyEntry::new("prioritized", &["market"], Some(50)),
        ]);
        assert_eq!(tax.match_text("farmers market").unwrap().name, "prioritized");
        assert_eq!(tax.entries()[1].name, "first_declared");
    }

    #[test]
    fn test_unprioritized_keep_declaration_order() {
        let tax = Taxonomy::new(vec![
            TaxonomyEntry::new("b", &["x"], None),
            TaxonomyEntry::new("a", &["x"], None),
        ]);
        assert_eq!(tax.match_text("x").unwrap().name, "b");
    }

    #[test]
    fn test_no_match_and_empty_text() {
        let tax = sample();
        assert!(tax.match_text("rent payment").is_none());
        assert!(tax.match_text("").is_none());
    }

    #[test]
    fn test_empty_category_never_matches() {
        let tax = Taxonomy::new(vec![
            TaxonomyEntry::new("empty", &[], Some(0)),
            TaxonomyEntry::new("blank", &[""], Some(1)),
            TaxonomyEntry::new("gas", &["gas"], Some(2)),
        ]);
        assert_eq!(tax.match_text("Shell Gas").unwrap().name, "gas");
    }

    #[test]
    fn test_substring_false_positive_preserved() {
        let tax = Taxonomy::new(vec![TaxonomyEntry::new("gas", &["gas"], None)]);
        assert_eq!(tax.match_text("LAS VEGAS HOTEL").unwrap().name, "gas");
    }

    #[test]
    fn test_match_any_checks_every_text() {
        let tax = Taxonomy::new(vec![
            TaxonomyEntry::new("dining", &["restaurants"], Some(1)),
            TaxonomyEntry::new("travel", &["airline"], Some(2)),
        ]);
        // The raw category hits a higher-priority entry than the name does
        let hit = tax.match_any(&["UNITED AIRLINE CAFE", "Restaurants"]).unwrap();
        assert_eq!(hit.name, "dining");
    }

    #[test]
    fn test_from_json_accepts_both_forms() {
        let json = r#"{
            "groceries": ["safeway", "trader joe"],
            "rent": {"values": ["apts"], "priority": 1},
            "other": {"values": ["misc"]}
        }"#;
        let tax = Taxonomy::from_json(json).unwrap();
        let names: Vec<&str> = tax.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["rent", "groceries", "other"]);
        assert_eq!(tax.entries()[1].values, vec!["safeway", "trader joe"]);
    }

    #[test]
    fn test_from_json_rejects_bad_entry() {
        let result = Taxonomy::from_json(r#"{"groceries": 42}"#);
        assert!(matches!(result, Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_search_batch() {
        let tax = sample();
        let results = tax.search(&["coffee bean", "landlord"]);
        assert_eq!(results, vec![("coffee bean", Some("coffee")), ("landlord", None)]);
    }
}
