//! Command bodies behind the `wfmarket` binary
//!
//! Each function does the store work and enforces the guards; printing stays
//! in `main.rs`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::item::Item;
use crate::statistic::OrderType;
use crate::storage::{DbStats, MarketStore, SchemaReport};

/// What a reset destroyed and what it left behind
#[derive(Debug, Clone, Serialize)]
pub struct ResetOutcome {
    pub discarded: DbStats,
    pub tables: Vec<String>,
}

/// Drop and recreate the schema. Refuses when rows exist and `confirmed` is false.
pub fn reset(store: &mut MarketStore, confirmed: bool) -> anyhow::Result<ResetOutcome> {
    let pending = store.existing_row_counts()?;
    if !pending.is_empty() && !confirmed {
        anyhow::bail!(
            "database holds {} rows; reset destroys them (use --yes to confirm)",
            pending.total()
        );
    }

    let discarded = store.reset()?;
    let report = store.verify()?;
    Ok(ResetOutcome { discarded, tables: report.tables })
}

/// Turn a report with issues into an error, for a non-zero exit
pub fn require_clean(report: &SchemaReport) -> anyhow::Result<()> {
    if !report.is_ok() {
        anyhow::bail!("schema verification found {} issues", report.issues.len());
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderTypeCount {
    /// `None` counts rows without an order type
    pub order_type: Option<OrderType>,
    pub rows: usize,
}

/// An item with everything recorded against it
#[derive(Debug, Clone, Serialize)]
pub struct ItemSummary {
    pub item: Item,
    pub subtypes: Vec<String>,
    pub mod_ranks: Vec<u32>,
    pub statistics: usize,
    /// Rows carrying a subtype or mod rank
    pub qualified: usize,
    pub by_order_type: Vec<OrderTypeCount>,
    pub latest: Option<DateTime<Utc>>,
}

/// Look an item up by id, falling back to its URL name
pub fn item_summary(store: &MarketStore, key: &str) -> anyhow::Result<ItemSummary> {
    let item = match store.get_item(key)? {
        Some(item) => item,
        None => store
            .get_item_by_url_name(key)?
            .ok_or_else(|| anyhow::anyhow!("no item with id or url name '{}'", key))?,
    };

    let rows = store.statistics_for(&item.id)?;
    let mut by_order_type: Vec<OrderTypeCount> = OrderType::all()
        .iter()
        .map(|kind| OrderTypeCount {
            order_type: Some(*kind),
            rows: rows.iter().filter(|s| s.order_type == Some(*kind)).count(),
        })
        .collect();
    by_order_type.push(OrderTypeCount {
        order_type: None,
        rows: rows.iter().filter(|s| s.order_type.is_none()).count(),
    });

    Ok(ItemSummary {
        subtypes: store.subtypes_for(&item.id)?.into_iter().map(|s| s.sub_type).collect(),
        mod_ranks: store.mod_ranks_for(&item.id)?.into_iter().map(|r| r.mod_rank).collect(),
        statistics: rows.len(),
        qualified: rows.iter().filter(|s| s.is_qualified()).count(),
        by_order_type,
        latest: store.latest_statistic_at(&item.id)?,
        item,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ItemModRank, ItemStatistic};
    use chrono::TimeZone;

    fn populated() -> MarketStore {
        let store = MarketStore::open_in_memory().unwrap();
        store.insert_item(&Item::new("a1", "Primed Continuity")).unwrap();
        store.insert_mod_rank(&ItemModRank::new("a1", 10)).unwrap();

        let at = |day| Utc.with_ymd_and_hms(2023, 7, day, 0, 0, 0).unwrap();
        store
            .insert_statistic(&ItemStatistic::new("a1", at(1)).with_order_type(OrderType::Closed).with_mod_rank(10))
            .unwrap();
        store
            .insert_statistic(&ItemStatistic::new("a1", at(2)).with_order_type(OrderType::Sell))
            .unwrap();
        store.insert_statistic(&ItemStatistic::new("a1", at(3))).unwrap();
        store
    }

    #[test]
    fn test_reset_requires_confirmation_when_rows_exist() {
        let mut store = populated();

        let err = reset(&mut store, false).unwrap_err();
        assert!(err.to_string().contains("--yes"));
        assert_eq!(store.stats().unwrap().statistics, 3);

        let outcome = reset(&mut store, true).unwrap();
        assert_eq!(outcome.discarded.total(), 5);
        assert_eq!(outcome.tables.len(), 4);
        assert!(store.stats().unwrap().is_empty());
    }

    #[test]
    fn test_reset_of_empty_store_needs_no_confirmation() {
        let mut store = MarketStore::open_in_memory().unwrap();
        let outcome = reset(&mut store, false).unwrap();
        assert!(outcome.discarded.is_empty());
    }

    #[test]
    fn test_require_clean_fails_on_drift() {
        let store = MarketStore::open_in_memory().unwrap();
        assert!(require_clean(&store.verify().unwrap()).is_ok());

        store.connection().execute_batch("DROP TABLE item_subtypes;").unwrap();
        let err = require_clean(&store.verify().unwrap()).unwrap_err();
        assert_eq!(err.to_string(), "schema verification found 1 issues");
    }

    #[test]
    fn test_item_summary_by_url_name() {
        let store = populated();
        let summary = item_summary(&store, "primed_continuity").unwrap();

        assert_eq!(summary.item.id, "a1");
        assert_eq!(summary.mod_ranks, vec![10]);
        assert!(summary.subtypes.is_empty());
        assert_eq!(summary.statistics, 3);
        assert_eq!(summary.qualified, 1);
        let rows: Vec<usize> = summary.by_order_type.iter().map(|c| c.rows).collect();
        assert_eq!(rows, vec![0, 1, 1, 1]);
        assert_eq!(summary.latest, Some(Utc.with_ymd_and_hms(2023, 7, 3, 0, 0, 0).unwrap()));

        assert!(item_summary(&store, "absent").is_err());
    }
}
