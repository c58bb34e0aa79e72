//! Net worth snapshot operations

use chrono::NaiveDate;
use rusqlite::{params, types::Value, OptionalExtension};
use tracing::debug;

use super::query::FilterResult;
use super::Database;
use crate::error::{Error, Result};
use crate::models::{NetWorthItem, NetWorthUpdate, NewNetWorthItem, SortOrder};

const NET_WORTH_COLUMNS: &str =
    "id, date, cash, investment, debit, credit, savings, retirement, loans";

/// Filter for snapshot listings: optional id equality, date ordering, limit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetWorthQuery {
    pub id: Option<String>,
    /// Defaults to newest first, the order the delta calculator expects
    pub order: SortOrder,
    pub limit: Option<i64>,
}

impl NetWorthQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: Option<String>) -> Self {
        self.id = id;
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: Option<i64>) -> Self {
        self.limit = limit;
        self
    }

    pub fn build(&self) -> FilterResult {
        let mut sql = format!("SELECT {} FROM net_worth", NET_WORTH_COLUMNS);
        let mut params = Vec::new();

        if let Some(ref id) = self.id {
            sql.push_str(" WHERE id = ?");
            params.push(Value::from(id.clone()));
        }
        sql.push_str(&format!(
            " ORDER BY date {}, id {}",
            self.order.as_sql(),
            self.order.as_sql()
        ));
        if let Some(limit) = self.limit {
            sql.push_str(" LIMIT ?");
            params.push(Value::from(limit));
        }

        FilterResult { sql, params }
    }
}

impl Database {
    /// Store a snapshot, returning its generated id
    pub fn create_net_worth(&self, item: &NewNetWorthItem) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO net_worth (id, date, cash, investment, debit, credit, savings, retirement, loans)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                id,
                item.date.to_string(),
                item.cash,
                item.investment,
                item.debit,
                item.credit,
                item.savings,
                item.retirement,
                item.loans,
            ],
        )?;
        Ok(id)
    }

    /// Apply a partial update; unknown id is `Error::NotFound`
    pub fn update_net_worth(&self, id: &str, update: &NetWorthUpdate) -> Result<()> {
        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(date) = update.date {
            sets.push("date = ?");
            values.push(Value::from(date.to_string()));
        }
        let amounts = [
            ("cash = ?", update.cash),
            ("investment = ?", update.investment),
            ("debit = ?", update.debit),
            ("credit = ?", update.credit),
            ("savings = ?", update.savings),
            ("retirement = ?", update.retirement),
            ("loans = ?", update.loans),
        ];
        for (set, amount) in amounts {
            if let Some(amount) = amount {
                sets.push(set);
                values.push(Value::from(amount));
            }
        }

        if self.get_net_worth(id)?.is_none() {
            return Err(Error::NotFound(format!("net worth snapshot {}", id)));
        }
        if sets.is_empty() {
            return Ok(());
        }

        values.push(Value::from(id.to_string()));
        let sql = format!("UPDATE net_worth SET {} WHERE id = ?", sets.join(", "));
        let conn = self.conn()?;
        conn.execute(&sql, rusqlite::params_from_iter(values.iter()))?;

        debug!(id, fields = sets.len(), "Updated net worth snapshot");
        Ok(())
    }

    pub fn get_net_worth(&self, id: &str) -> Result<Option<NetWorthItem>> {
        let built = NetWorthQuery::new().id(Some(id.to_string())).build();
        let conn = self.conn()?;
        let item = conn
            .query_row(&built.sql, built.params_refs().as_slice(), |row| {
                Self::row_to_net_worth(row)
            })
            .optional()?;
        Ok(item)
    }

    pub fn list_net_worth(&self, query: &NetWorthQuery) -> Result<Vec<NetWorthItem>> {
        let built = query.build();
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&built.sql)?;
        let items = stmt
            .query_map(built.params_refs().as_slice(), |row| {
                Self::row_to_net_worth(row)
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(items)
    }

    fn row_to_net_worth(row: &rusqlite::Row) -> rusqlite::Result<NetWorthItem> {
        let date_str: String = row.get(1)?;
        Ok(NetWorthItem {
            id: row.get(0)?,
            date: NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").unwrap_or_default(),
            cash: row.get(2)?,
            investment: row.get(3)?,
            debit: row.get(4)?,
            credit: row.get(5)?,
            savings: row.get(6)?,
            retirement: row.get(7)?,
            loans: row.get(8)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(date: &str, cash: f64) -> NewNetWorthItem {
        NewNetWorthItem {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            cash,
            ..Default::default()
        }
    }

    #[test]
    fn test_query_shape() {
        let built = NetWorthQuery::new()
            .id(Some("abc".into()))
            .limit(Some(3))
            .build();
        assert_eq!(
            built.sql,
            "SELECT id, date, cash, investment, debit, credit, savings, retirement, loans \
             FROM net_worth WHERE id = ? ORDER BY date DESC, id DESC LIMIT ?"
        );
        assert_eq!(
            built.params,
            vec![Value::from("abc".to_string()), Value::from(3i64)]
        );
    }

    #[test]
    fn test_list_newest_first_with_limit() {
        let db = Database::in_memory().unwrap();
        db.create_net_worth(&snapshot("2024-01-31", 100.0)).unwrap();
        db.create_net_worth(&snapshot("2024-03-31", 300.0)).unwrap();
        db.create_net_worth(&snapshot("2024-02-29", 200.0)).unwrap();

        let items = db
            .list_net_worth(&NetWorthQuery::new().limit(Some(2)))
            .unwrap();
        let cash: Vec<f64> = items.iter().map(|i| i.cash).collect();
        assert_eq!(cash, vec![300.0, 200.0]);

        let oldest_first = db
            .list_net_worth(&NetWorthQuery::new().order(SortOrder::Asc))
            .unwrap();
        assert_eq!(oldest_first[0].cash, 100.0);
    }

    #[test]
    fn test_partial_update() {
        let db = Database::in_memory().unwrap();
        let id = db.create_net_worth(&snapshot("2024-01-31", 100.0)).unwrap();

        db.update_net_worth(
            &id,
            &NetWorthUpdate {
                loans: Some(-50.0),
                ..Default::default()
            },
        )
        .unwrap();

        let item = db.get_net_worth(&id).unwrap().unwrap();
        assert_eq!(item.cash, 100.0);
        assert_eq!(item.loans, -50.0);
        assert_eq!(item.net_worth(), 50.0);
    }

    #[test]
    fn test_update_unknown_snapshot() {
        let db = Database::in_memory().unwrap();
        let result = db.update_net_worth(
            "missing",
            &NetWorthUpdate {
                cash: Some(1.0),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
