//! Net worth totals and period-over-period change

use serde::Serialize;

use crate::db::{Database, NetWorthQuery};
use crate::error::Result;
use crate::models::{NetWorthItem, SortOrder};

/// A snapshot annotated with its total and the change from the previous one
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetWorthEntry {
    pub item: NetWorthItem,
    pub net_worth: f64,
    /// Absent for the oldest snapshot
    pub change: Option<f64>,
    /// `"10.00%"`; absent for the oldest snapshot or when the previous total is 0
    pub change_percent: Option<String>,
}

/// Annotate snapshots ordered newest first
///
/// Each item is compared with the one after it (the next older snapshot).
pub fn with_deltas(items: Vec<NetWorthItem>) -> Vec<NetWorthEntry> {
    let totals: Vec<f64> = items.iter().map(NetWorthItem::net_worth).collect();

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let net_worth = totals[i];
            let previous = totals.get(i + 1).copied();
            let change = previous.map(|p| net_worth - p);
            let change_percent = match (change, previous) {
                (Some(c), Some(p)) => format_percent(c, p),
                _ => None,
            };
            NetWorthEntry {
                item,
                net_worth,
                change,
                change_percent,
            }
        })
        .collect()
}

fn format_percent(change: f64, previous: f64) -> Option<String> {
    if previous == 0.0 {
        return None;
    }
    let percent = change / previous * 100.0;
    percent.is_finite().then(|| format!("{:.2}%", percent))
}

impl Database {
    /// Snapshots newest first with totals and changes
    pub fn net_worth_history(&self, limit: Option<i64>) -> Result<Vec<NetWorthEntry>> {
        // Negative limits mean no limit
        let limit = limit.filter(|l| *l >= 0);
        let query = NetWorthQuery::new().order(SortOrder::Desc);
        // One extra row so the oldest shown snapshot still gets a change
        let items = self.list_net_worth(&query.limit(limit.map(|l| l.saturating_add(1))))?;

        let mut entries = with_deltas(items);
        if let Some(limit) = limit {
            entries.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }
        Ok(entries)
    }
}
