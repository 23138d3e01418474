//! # wfmarket-store - Marketplace item and statistics store
//!
//! SQLite-backed storage for marketplace item metadata and periodic
//! price/volume statistics.
//!
//! wfmarket-store provides:
//! - The four-table schema (`items`, `item_statistics`, `item_subtypes`, `item_mod_ranks`)
//! - Destructive drop/create initialization in dependency order
//! - Typed rows and insert/fetch operations over each table
//! - Verification of a live database against the declared layout

pub mod item;
pub mod statistic;
pub mod storage;
pub mod output;
pub mod config;
pub mod ui;
pub mod commands;

// Re-exports for convenient access
pub use item::{Item, ItemModRank, ItemSubtype};
pub use statistic::{ItemStatistic, OrderType};
pub use storage::MarketStore;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for store operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Invalid order type: {0}")]
    InvalidOrderType(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Classify a SQLite error by its extended result code, attaching `context`
    /// to constraint failures.
    pub(crate) fn from_sqlite(err: rusqlite::Error, context: impl Into<String>) -> Self {
        use rusqlite::ffi;

        let code = match &err {
            rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation => {
                e.extended_code
            }
            _ => return Error::Storage(err),
        };

        let context = context.into();
        match code {
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Error::ForeignKeyViolation(context),
            ffi::SQLITE_CONSTRAINT_PRIMARYKEY | ffi::SQLITE_CONSTRAINT_UNIQUE => {
                Error::DuplicateKey(context)
            }
            _ => Error::ConstraintViolation(format!("{}: {}", context, err)),
        }
    }

    /// True for any of the constraint-classified variants
    pub fn is_constraint(&self) -> bool {
        matches!(
            self,
            Error::ForeignKeyViolation(_) | Error::DuplicateKey(_) | Error::ConstraintViolation(_)
        )
    }
}
