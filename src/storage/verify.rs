//! Live schema verification
//!
//! Reads the layout of an open database back out of `sqlite_master`,
//! `PRAGMA table_info` and `PRAGMA foreign_key_list`, and compares it with
//! the declared tables in [`schema::TABLES`]. SQLite has no pragma for CHECK
//! constraints, so those are matched against the stored `CREATE` text.

use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use crate::Result;
use super::schema::{self, TableSpec};

/// A column as reported by `PRAGMA table_info`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiveColumn {
    pub name: String,
    pub sql_type: String,
    pub not_null: bool,
    /// 1-based position in the primary key, 0 if not part of it
    pub pk: u32,
}

/// A single difference between the live database and the declared layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaIssue {
    MissingTable { table: String },
    UnexpectedTable { table: String },
    MissingColumn { table: String, column: String },
    UnexpectedColumn { table: String, column: String },
    ColumnMismatch { table: String, column: String, expected: String, found: String },
    PrimaryKeyMismatch { table: String, expected: Vec<String>, found: Vec<String> },
    ForeignKeyMismatch { table: String, expected: Vec<String>, found: Vec<String> },
    CheckMismatch { table: String, check: String },
}

impl std::fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaIssue::MissingTable { table } => write!(f, "missing table {}", table),
            SchemaIssue::UnexpectedTable { table } => write!(f, "unexpected table {}", table),
            SchemaIssue::MissingColumn { table, column } => {
                write!(f, "{}: missing column {}", table, column)
            }
            SchemaIssue::UnexpectedColumn { table, column } => {
                write!(f, "{}: unexpected column {}", table, column)
            }
            SchemaIssue::ColumnMismatch { table, column, expected, found } => {
                write!(f, "{}.{}: expected {}, found {}", table, column, expected, found)
            }
            SchemaIssue::PrimaryKeyMismatch { table, expected, found } => write!(
                f,
                "{}: primary key ({}) expected, found ({})",
                table,
                expected.join(", "),
                found.join(", ")
            ),
            SchemaIssue::ForeignKeyMismatch { table, expected, found } => write!(
                f,
                "{}: foreign keys [{}] expected, found [{}]",
                table,
                expected.join(", "),
                found.join(", ")
            ),
            SchemaIssue::CheckMismatch { table, check } => {
                write!(f, "{}: missing CHECK ({})", table, check)
            }
        }
    }
}

/// Outcome of comparing a live database with the declared layout
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchemaReport {
    /// User tables found, sorted
    pub tables: Vec<String>,
    pub issues: Vec<SchemaIssue>,
}

impl SchemaReport {
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }
}

/// User tables in the database, excluding SQLite's internal `sqlite_*` tables
pub fn live_table_names(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name"
    )?;
    let names = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(names)
}

/// Columns of a table as SQLite reports them
pub fn live_columns(conn: &Connection, table: &str) -> Result<Vec<LiveColumn>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let columns = stmt
        .query_map([], |row| {
            let not_null: i64 = row.get(3)?;
            Ok(LiveColumn {
                name: row.get(1)?,
                sql_type: row.get(2)?,
                not_null: not_null != 0,
                pk: row.get(5)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(columns)
}

/// Foreign keys of a table, rendered `column->table(to)` and sorted
pub fn live_foreign_keys(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA foreign_key_list({})", table))?;
    let mut keys = stmt
        .query_map([], |row| {
            let parent: String = row.get(2)?;
            let from: String = row.get(3)?;
            let to: Option<String> = row.get(4)?;
            Ok(render_fk(&from, &parent, to.as_deref().unwrap_or("")))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    keys.sort();
    Ok(keys)
}

/// The `CREATE TABLE` text SQLite stored for `table`
pub fn live_table_sql(conn: &Connection, table: &str) -> Result<Option<String>> {
    let sql: Option<Option<String>> = conn
        .query_row(
            "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |row| row.get(0),
        )
        .optional()?;
    Ok(sql.flatten())
}

/// Drop whitespace and lowercase everything outside string literals
fn normalize_sql(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut in_literal = false;
    for ch in sql.chars() {
        if ch == '\'' {
            in_literal = !in_literal;
            out.push(ch);
        } else if in_literal {
            out.push(ch);
        } else if !ch.is_whitespace() {
            out.push(ch.to_ascii_lowercase());
        }
    }
    out
}

fn render_fk(column: &str, table: &str, to: &str) -> String {
    format!("{}->{}({})", column, table, to)
}

/// Compare the live database with [`schema::TABLES`]
pub fn verify_schema(conn: &Connection) -> Result<SchemaReport> {
    let tables = live_table_names(conn)?;
    let mut issues = Vec::new();

    for spec in schema::TABLES {
        if !tables.iter().any(|t| t == spec.name) {
            issues.push(SchemaIssue::MissingTable { table: spec.name.to_string() });
            continue;
        }
        check_table(conn, spec, &mut issues)?;
    }

    for table in &tables {
        if schema::table_spec(table).is_none() {
            issues.push(SchemaIssue::UnexpectedTable { table: table.clone() });
        }
    }

    if !issues.is_empty() {
        tracing::debug!("Schema verification found {} issues", issues.len());
    }
    Ok(SchemaReport { tables, issues })
}

fn check_table(conn: &Connection, spec: &TableSpec, issues: &mut Vec<SchemaIssue>) -> Result<()> {
    let table = spec.name.to_string();
    let live = live_columns(conn, spec.name)?;

    for expected in spec.columns {
        let Some(found) = live.iter().find(|c| c.name == expected.name) else {
            issues.push(SchemaIssue::MissingColumn {
                table: table.clone(),
                column: expected.name.to_string(),
            });
            continue;
        };

        let want = describe_column(expected.sql_type, expected.not_null);
        let got = describe_column(&found.sql_type, found.not_null);
        if !found.sql_type.eq_ignore_ascii_case(expected.sql_type) || found.not_null != expected.not_null {
            issues.push(SchemaIssue::ColumnMismatch {
                table: table.clone(),
                column: expected.name.to_string(),
                expected: want,
                found: got,
            });
        }
    }

    for column in &live {
        if spec.column(&column.name).is_none() {
            issues.push(SchemaIssue::UnexpectedColumn {
                table: table.clone(),
                column: column.name.clone(),
            });
        }
    }

    let mut pk: Vec<&LiveColumn> = live.iter().filter(|c| c.pk > 0).collect();
    pk.sort_by_key(|c| c.pk);
    let found_pk: Vec<String> = pk.into_iter().map(|c| c.name.clone()).collect();
    let expected_pk: Vec<String> = spec.primary_key.iter().map(|s| s.to_string()).collect();
    if found_pk != expected_pk {
        issues.push(SchemaIssue::PrimaryKeyMismatch {
            table: table.clone(),
            expected: expected_pk,
            found: found_pk,
        });
    }

    let found_fk = live_foreign_keys(conn, spec.name)?;
    let mut expected_fk: Vec<String> = spec
        .foreign_keys
        .iter()
        .map(|fk| render_fk(fk.column, fk.table, fk.to))
        .collect();
    expected_fk.sort();
    if found_fk != expected_fk {
        issues.push(SchemaIssue::ForeignKeyMismatch {
            table: table.clone(),
            expected: expected_fk,
            found: found_fk,
        });
    }

    if !spec.checks.is_empty() {
        let ddl = normalize_sql(&live_table_sql(conn, spec.name)?.unwrap_or_default());
        for check in spec.checks {
            if !ddl.contains(&format!("check({})", normalize_sql(check))) {
                issues.push(SchemaIssue::CheckMismatch {
                    table: table.clone(),
                    check: check.to_string(),
                });
            }
        }
    }

    Ok(())
}

fn describe_column(sql_type: &str, not_null: bool) -> String {
    if not_null {
        format!("{} NOT NULL", sql_type)
    } else {
        sql_type.to_string()
    }
}
