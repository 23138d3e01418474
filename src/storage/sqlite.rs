//! SQLite storage implementation

use std::path::Path;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OpenFlags, params, OptionalExtension};
use crate::{Result, Error};
use crate::item::{Item, ItemModRank, ItemSubtype};
use crate::statistic::{ItemStatistic, OrderType};
use super::schema;
use super::verify::{self, SchemaReport};

const STATISTIC_COLUMNS: &str = "id, datetime, item_id, volume, min_price, max_price, avg_price, wa_price, median, \
     order_type, sub_type, mod_rank, moving_avg, open_price, closed_price, donch_top, donch_bot";

/// SQLite-backed storage for items and their market statistics
pub struct MarketStore {
    conn: Connection,
}

impl MarketStore {
    /// Open a database file (creates if doesn't exist). Missing tables are
    /// created; existing data is left untouched.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self::from_connection(conn)?;
        tracing::info!("Opened market store at {}", path.display());
        Ok(store)
    }

    /// Open an existing database file without creating it or any table.
    pub fn open_existing(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX | OpenFlags::SQLITE_OPEN_URI,
        )?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        tracing::info!("Opened existing market store at {}", path.display());
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        // SQLite ships with FK enforcement off; it is per-connection.
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        for stmt in schema::create_if_missing_statements() {
            self.conn.execute(&stmt, [])?;
        }
        Ok(())
    }

    /// Drop and recreate every table, destroying all rows. Works on empty or
    /// partially created databases; returns the rows that were discarded.
    pub fn reset(&mut self) -> Result<DbStats> {
        let tx = self.conn.transaction()?;
        let discarded = present_row_counts(&tx)?;
        for stmt in schema::reset_statements() {
            tx.execute(stmt, [])?;
        }
        tx.commit()?;
        tracing::info!("Schema reset, discarded {} rows", discarded.total());
        Ok(discarded)
    }

    /// Row counts of the declared tables that exist; absent tables count as empty
    pub fn existing_row_counts(&self) -> Result<DbStats> {
        present_row_counts(&self.conn)
    }

    /// Compare the live database with the declared layout
    pub fn verify(&self) -> Result<SchemaReport> {
        verify::verify_schema(&self.conn)
    }

    /// User tables currently present, sorted by name
    pub fn table_names(&self) -> Result<Vec<String>> {
        verify::live_table_names(&self.conn)
    }

    /// Raw connection access for ad-hoc SQL
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    // ========== Item Operations ==========

    /// Insert a new item
    pub fn insert_item(&self, item: &Item) -> Result<()> {
        self.conn
            .execute(
                r#"
                INSERT INTO items (id, item_name, item_type, url_name, thumb)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![item.id, item.item_name, item.item_type, item.url_name, item.thumb],
            )
            .map_err(|e| Error::from_sqlite(e, format!("item {}", item.id)))?;
        tracing::debug!("Inserted item {} ({})", item.id, item.item_name);
        Ok(())
    }

    /// Get an item by id
    pub fn get_item(&self, id: &str) -> Result<Option<Item>> {
        self.conn
            .query_row(
                "SELECT id, item_name, item_type, url_name, thumb FROM items WHERE id = ?1",
                [id],
                |row| self.row_to_item(row),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Get an item by its URL slug
    pub fn get_item_by_url_name(&self, url_name: &str) -> Result<Option<Item>> {
        self.conn
            .query_row(
                "SELECT id, item_name, item_type, url_name, thumb FROM items WHERE url_name = ?1",
                [url_name],
                |row| self.row_to_item(row),
            )
            .optional()
            .map_err(Into::into)
    }

    /// All items ordered by display name
    pub fn list_items(&self) -> Result<Vec<Item>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, item_name, item_type, url_name, thumb FROM items ORDER BY item_name"
        )?;

        let items = stmt
            .query_map([], |row| self.row_to_item(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(items)
    }

    /// Count all items
    pub fn count_items(&self) -> Result<usize> {
        self.count("items")
    }

    /// Helper to convert a row to an Item
    fn row_to_item(&self, row: &rusqlite::Row) -> rusqlite::Result<Item> {
        Ok(Item {
            id: row.get(0)?,
            item_name: row.get(1)?,
            item_type: row.get(2)?,
            url_name: row.get(3)?,
            thumb: row.get(4)?,
        })
    }

    // ========== Subtype Operations ==========

    /// Register a subtype label for an existing item
    pub fn insert_subtype(&self, subtype: &ItemSubtype) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO item_subtypes (item_id, sub_type) VALUES (?1, ?2)",
                params![subtype.item_id, subtype.sub_type],
            )
            .map_err(|e| {
                Error::from_sqlite(e, format!("subtype ({}, {})", subtype.item_id, subtype.sub_type))
            })?;
        Ok(())
    }

    /// Subtype labels of an item, sorted
    pub fn subtypes_for(&self, item_id: &str) -> Result<Vec<ItemSubtype>> {
        let mut stmt = self.conn.prepare(
            "SELECT item_id, sub_type FROM item_subtypes WHERE item_id = ?1 ORDER BY sub_type"
        )?;

        let subtypes = stmt
            .query_map([item_id], |row| {
                Ok(ItemSubtype {
                    item_id: row.get(0)?,
                    sub_type: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(subtypes)
    }

    // ========== Mod Rank Operations ==========

    /// Register a mod rank for an existing item
    pub fn insert_mod_rank(&self, rank: &ItemModRank) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO item_mod_ranks (item_id, mod_rank) VALUES (?1, ?2)",
                params![rank.item_id, rank.mod_rank],
            )
            .map_err(|e| {
                Error::from_sqlite(e, format!("mod rank ({}, {})", rank.item_id, rank.mod_rank))
            })?;
        Ok(())
    }

    /// Mod ranks of an item, ascending
    pub fn mod_ranks_for(&self, item_id: &str) -> Result<Vec<ItemModRank>> {
        let mut stmt = self.conn.prepare(
            "SELECT item_id, mod_rank FROM item_mod_ranks WHERE item_id = ?1 ORDER BY mod_rank"
        )?;

        let ranks = stmt
            .query_map([item_id], |row| {
                Ok(ItemModRank {
                    item_id: row.get(0)?,
                    mod_rank: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(ranks)
    }

    // ========== Statistic Operations ==========

    /// Append one statistic row, returning its row id
    pub fn insert_statistic(&self, stat: &ItemStatistic) -> Result<i64> {
        insert_statistic_on(&self.conn, stat)?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Append a batch of statistic rows in one transaction. Either every row
    /// is written or none is.
    pub fn insert_statistics(&mut self, stats: &[ItemStatistic]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        for stat in stats {
            insert_statistic_on(&tx, stat)?;
        }
        tx.commit()?;
        tracing::debug!("Inserted {} statistic rows", stats.len());
        Ok(stats.len())
    }

    /// Statistic rows of an item, oldest first
    pub fn statistics_for(&self, item_id: &str) -> Result<Vec<ItemStatistic>> {
        let sql = format!(
            "SELECT {} FROM item_statistics WHERE item_id = ?1 ORDER BY datetime, id",
            STATISTIC_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let stats = stmt
            .query_map([item_id], |row| self.row_to_statistic(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(stats)
    }

    /// Timestamp of the newest statistic row for an item
    pub fn latest_statistic_at(&self, item_id: &str) -> Result<Option<DateTime<Utc>>> {
        let latest: Option<DateTime<Utc>> = self.conn.query_row(
            "SELECT MAX(datetime) FROM item_statistics WHERE item_id = ?1",
            [item_id],
            |row| row.get(0),
        )?;
        Ok(latest)
    }

    /// Statistic item ids with no matching item, with their row counts
    pub fn orphaned_statistics(&self) -> Result<Vec<OrphanedStatistics>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT s.item_id, COUNT(*)
            FROM item_statistics s
            LEFT JOIN items i ON i.id = s.item_id
            WHERE i.id IS NULL
            GROUP BY s.item_id
            ORDER BY s.item_id
            "#,
        )?;

        let orphans = stmt
            .query_map([], |row| {
                let rows: i64 = row.get(1)?;
                Ok(OrphanedStatistics {
                    item_id: row.get(0)?,
                    rows: rows as usize,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        if !orphans.is_empty() {
            tracing::warn!("{} statistic item ids have no matching item", orphans.len());
        }
        Ok(orphans)
    }

    /// Helper to convert a row to an ItemStatistic
    fn row_to_statistic(&self, row: &rusqlite::Row) -> rusqlite::Result<ItemStatistic> {
        let order_type: Option<String> = row.get(9)?;
        let order_type = order_type
            .map(|s| {
                s.parse::<OrderType>().map_err(|e: Error| {
                    rusqlite::Error::FromSqlConversionFailure(9, rusqlite::types::Type::Text, Box::new(e))
                })
            })
            .transpose()?;

        Ok(ItemStatistic {
            id: row.get(0)?,
            datetime: row.get(1)?,
            item_id: row.get(2)?,
            volume: row.get(3)?,
            min_price: row.get(4)?,
            max_price: row.get(5)?,
            avg_price: row.get(6)?,
            wa_price: row.get(7)?,
            median: row.get(8)?,
            order_type,
            sub_type: row.get(10)?,
            mod_rank: row.get(11)?,
            moving_avg: row.get(12)?,
            open_price: row.get(13)?,
            closed_price: row.get(14)?,
            donch_top: row.get(15)?,
            donch_bot: row.get(16)?,
        })
    }

    // ========== Bulk Operations ==========

    fn count(&self, table: &str) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            items: self.count_items()?,
            statistics: self.count("item_statistics")?,
            subtypes: self.count("item_subtypes")?,
            mod_ranks: self.count("item_mod_ranks")?,
        })
    }
}

fn present_row_counts(conn: &Connection) -> Result<DbStats> {
    let present = verify::live_table_names(conn)?;
    let count = |table: &str| -> Result<usize> {
        if !present.iter().any(|t| t == table) {
            return Ok(0);
        }
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    };

    Ok(DbStats {
        items: count(schema::ITEMS.name)?,
        statistics: count(schema::ITEM_STATISTICS.name)?,
        subtypes: count(schema::ITEM_SUBTYPES.name)?,
        mod_ranks: count(schema::ITEM_MOD_RANKS.name)?,
    })
}

fn insert_statistic_on(conn: &Connection, stat: &ItemStatistic) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO item_statistics (
            datetime, item_id, volume, min_price, max_price, avg_price, wa_price, median,
            order_type, sub_type, mod_rank, moving_avg, open_price, closed_price, donch_top, donch_bot
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
        "#,
        params![
            stat.datetime,
            stat.item_id,
            stat.volume,
            stat.min_price,
            stat.max_price,
            stat.avg_price,
            stat.wa_price,
            stat.median,
            stat.order_type.map(|o| o.as_str()),
            stat.sub_type,
            stat.mod_rank,
            stat.moving_avg,
            stat.open_price,
            stat.closed_price,
            stat.donch_top,
            stat.donch_bot,
        ],
    )
    .map_err(|e| Error::from_sqlite(e, format!("statistic for {} at {}", stat.item_id, stat.datetime)))?;
    Ok(())
}

/// Statistic rows whose `item_id` matches no item
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct OrphanedStatistics {
    pub item_id: String,
    pub rows: usize,
}

/// Database statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct DbStats {
    pub items: usize,
    pub statistics: usize,
    pub subtypes: usize,
    pub mod_ranks: usize,
}

impl DbStats {
    pub fn total(&self) -> usize {
        self.items + self.statistics + self.subtypes + self.mod_ranks
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Items: {}", self.items)?;
        writeln!(f, "  Statistics: {}", self.statistics)?;
        writeln!(f, "  Subtypes: {}", self.subtypes)?;
        writeln!(f, "  Mod ranks: {}", self.mod_ranks)
    }
}
