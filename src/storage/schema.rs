//! Database schema definitions

/// SQL to create the items table
pub const CREATE_ITEMS_TABLE: &str = r#"
CREATE TABLE items (
    id TEXT PRIMARY KEY NOT NULL,
    item_name TEXT NOT NULL,
    item_type TEXT,
    url_name TEXT NOT NULL,
    thumb TEXT
)
"#;

/// SQL to create the item_statistics table
///
/// `item_id` has no declared foreign key: orphaned rows are accepted.
pub const CREATE_ITEM_STATISTICS_TABLE: &str = r#"
CREATE TABLE item_statistics (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    datetime TEXT NOT NULL,
    item_id TEXT NOT NULL,
    volume INTEGER NOT NULL,
    min_price REAL NOT NULL,
    max_price REAL NOT NULL,
    avg_price REAL NOT NULL,
    wa_price REAL NOT NULL,
    median REAL NOT NULL,
    order_type TEXT CHECK (order_type IN ('Buy', 'Sell', 'Closed')),
    sub_type TEXT,
    mod_rank INTEGER,
    moving_avg REAL,
    open_price REAL,
    closed_price REAL,
    donch_top REAL,
    donch_bot REAL
)
"#;

/// Allowed `order_type` values; NULL passes as with any CHECK
pub const ORDER_TYPE_CHECK: &str = "order_type IN ('Buy', 'Sell', 'Closed')";

/// SQL to create the item_subtypes table
pub const CREATE_ITEM_SUBTYPES_TABLE: &str = r#"
CREATE TABLE item_subtypes (
    item_id TEXT NOT NULL,
    sub_type TEXT NOT NULL,
    PRIMARY KEY (item_id, sub_type),
    FOREIGN KEY (item_id) REFERENCES items (id)
)
"#;

/// SQL to create the item_mod_ranks table
pub const CREATE_ITEM_MOD_RANKS_TABLE: &str = r#"
CREATE TABLE item_mod_ranks (
    item_id TEXT NOT NULL,
    mod_rank INTEGER NOT NULL,
    PRIMARY KEY (item_id, mod_rank),
    FOREIGN KEY (item_id) REFERENCES items (id)
)
"#;

/// Drop statements, children before `items`
pub const DROP_STATEMENTS: &[&str] = &[
    "DROP TABLE IF EXISTS item_mod_ranks",
    "DROP TABLE IF EXISTS item_subtypes",
    "DROP TABLE IF EXISTS item_statistics",
    "DROP TABLE IF EXISTS items",
];

/// Create statements, `items` before the tables that reference it
pub const CREATE_STATEMENTS: &[&str] = &[
    CREATE_ITEMS_TABLE,
    CREATE_ITEM_STATISTICS_TABLE,
    CREATE_ITEM_SUBTYPES_TABLE,
    CREATE_ITEM_MOD_RANKS_TABLE,
];

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_items_url_name ON items(url_name)",
    "CREATE INDEX IF NOT EXISTS idx_item_statistics_item ON item_statistics(item_id, datetime)",
];

/// The destructive initialization script: drop, create, index.
pub fn reset_statements() -> Vec<&'static str> {
    let mut stmts = DROP_STATEMENTS.to_vec();
    stmts.extend(CREATE_STATEMENTS.iter().copied());
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}

/// Non-destructive initialization: create any table that is missing.
pub fn create_if_missing_statements() -> Vec<String> {
    let mut stmts: Vec<String> = CREATE_STATEMENTS
        .iter()
        .map(|sql| sql.replacen("CREATE TABLE", "CREATE TABLE IF NOT EXISTS", 1))
        .collect();
    stmts.extend(CREATE_INDEXES.iter().map(|s| s.to_string()));
    stmts
}

// ========== Declared Layout ==========

/// A declared column: name, SQLite type affinity, NOT NULL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub sql_type: &'static str,
    pub not_null: bool,
}

const fn col(name: &'static str, sql_type: &'static str, not_null: bool) -> ColumnSpec {
    ColumnSpec { name, sql_type, not_null }
}

/// A declared foreign key: `column` references `table(to)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKeySpec {
    pub column: &'static str,
    pub table: &'static str,
    pub to: &'static str,
}

/// Declared shape of one table
#[derive(Debug, Clone, Copy)]
pub struct TableSpec {
    pub name: &'static str,
    pub columns: &'static [ColumnSpec],
    /// Primary key columns in key order
    pub primary_key: &'static [&'static str],
    pub foreign_keys: &'static [ForeignKeySpec],
    /// CHECK expressions that must appear in the table's `CREATE` statement
    pub checks: &'static [&'static str],
}

impl TableSpec {
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }
}

pub const ITEMS: TableSpec = TableSpec {
    name: "items",
    columns: &[
        col("id", "TEXT", true),
        col("item_name", "TEXT", true),
        col("item_type", "TEXT", false),
        col("url_name", "TEXT", true),
        col("thumb", "TEXT", false),
    ],
    primary_key: &["id"],
    foreign_keys: &[],
    checks: &[],
};

pub const ITEM_STATISTICS: TableSpec = TableSpec {
    name: "item_statistics",
    columns: &[
        col("id", "INTEGER", false),
        col("datetime", "TEXT", true),
        col("item_id", "TEXT", true),
        col("volume", "INTEGER", true),
        col("min_price", "REAL", true),
        col("max_price", "REAL", true),
        col("avg_price", "REAL", true),
        col("wa_price", "REAL", true),
        col("median", "REAL", true),
        col("order_type", "TEXT", false),
        col("sub_type", "TEXT", false),
        col("mod_rank", "INTEGER", false),
        col("moving_avg", "REAL", false),
        col("open_price", "REAL", false),
        col("closed_price", "REAL", false),
        col("donch_top", "REAL", false),
        col("donch_bot", "REAL", false),
    ],
    primary_key: &["id"],
    foreign_keys: &[],
    checks: &[ORDER_TYPE_CHECK],
};

pub const ITEM_SUBTYPES: TableSpec = TableSpec {
    name: "item_subtypes",
    columns: &[col("item_id", "TEXT", true), col("sub_type", "TEXT", true)],
    primary_key: &["item_id", "sub_type"],
    foreign_keys: &[ForeignKeySpec { column: "item_id", table: "items", to: "id" }],
    checks: &[],
};

pub const ITEM_MOD_RANKS: TableSpec = TableSpec {
    name: "item_mod_ranks",
    columns: &[col("item_id", "TEXT", true), col("mod_rank", "INTEGER", true)],
    primary_key: &["item_id", "mod_rank"],
    foreign_keys: &[ForeignKeySpec { column: "item_id", table: "items", to: "id" }],
    checks: &[],
};

/// All declared tables, in creation order
pub const TABLES: &[TableSpec] = &[ITEMS, ITEM_STATISTICS, ITEM_SUBTYPES, ITEM_MOD_RANKS];

pub fn table_spec(name: &str) -> Option<&'static TableSpec> {
    TABLES.iter().find(|t| t.name == name)
}
