//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - items(id, item_name, item_type, url_name, thumb)
//! - item_statistics(datetime, item_id, volume, prices..., order_type, sub_type, mod_rank, derived...)
//! - item_subtypes(item_id, sub_type) -> items
//! - item_mod_ranks(item_id, mod_rank) -> items

pub mod schema;
pub mod sqlite;
pub mod verify;

pub use sqlite::{MarketStore, DbStats, OrphanedStatistics};
pub use verify::{SchemaIssue, SchemaReport};
