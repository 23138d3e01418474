//! wfmarket CLI - operator interface for the market item/statistics store

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use wfmarket_store::commands;
use wfmarket_store::config::{self, MarketConfig};
use wfmarket_store::output::{emit_failure, emit_success, OutputMode};
use wfmarket_store::storage::MarketStore;
use wfmarket_store::ui::{self, Icons};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "wfmarket")]
#[command(version)]
#[command(about = "SQLite store for marketplace items and time-series market statistics")]
#[command(long_about = r#"
wfmarket owns the item/statistics schema:
  • items, item_statistics, item_subtypes, item_mod_ranks
  • destructive drop/create initialization
  • structural verification of a live database

Example usage:
  wfmarket init --database data/wfmarket.db
  wfmarket reset --yes
  wfmarket verify
  wfmarket item primed_continuity
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON instead of human-readable output
    #[arg(long, global = true)]
    json: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file (overrides the config file)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file pointing at the database
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Drop and recreate all tables, destroying existing rows
    Reset {
        /// Required when any table holds rows
        #[arg(short, long)]
        yes: bool,
    },

    /// Check the live database against the declared schema
    Verify,

    /// Show row counts per table
    Stats,

    /// Show an item with its subtypes, mod ranks and statistic count
    Item {
        /// Item id or URL name
        key: String,
    },

    /// List statistic item ids that match no item
    Audit,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let output_mode = OutputMode::from_flag(cli.json);
    let config_path = cli.config.clone().unwrap_or_else(|| PathBuf::from(config::CONFIG_FILE));
    let database = MarketConfig::load(&config_path)?.database_path(cli.database.clone());

    match cli.command {
        Commands::Init { force } => {
            MarketConfig { database: Some(database.clone()) }.save(&config_path, force)?;
            config::prepare_database_dir(&database)?;
            let store = MarketStore::open(&database)?;
            let report = store.verify()?;

            if output_mode.is_human() {
                ui::success(&format!("Wrote {}", config_path.display()));
                ui::info("Database", &database.display().to_string());
                ui::info("Tables", &report.tables.join(", "));
            } else {
                emit_success(output_mode, "init", serde_json::json!({
                    "config": config_path,
                    "database": database,
                    "tables": report.tables,
                }))?;
            }
        }

        Commands::Reset { yes } => {
            config::prepare_database_dir(&database)?;
            let mut store = if database.exists() {
                MarketStore::open_existing(&database)?
            } else {
                MarketStore::open(&database)?
            };
            let outcome = commands::reset(&mut store, yes)
                .map_err(|e| e.context(format!("resetting {}", database.display())))?;

            if output_mode.is_human() {
                ui::header(&format!("Reset {}", database.display()));
                ui::summary_row("Rows discarded:", &outcome.discarded.total().to_string());
                ui::summary_row("Tables:", &outcome.tables.join(", "));
                ui::success("Schema recreated");
            } else {
                emit_success(output_mode, "reset", serde_json::json!({
                    "database": database,
                    "discarded": outcome.discarded,
                    "tables": outcome.tables,
                }))?;
            }
        }

        Commands::Verify => {
            let store = open_existing(&database)?;
            let report = store.verify()?;

            if output_mode.is_human() {
                ui::header(&format!("Verifying {}", database.display()));
                ui::info("Tables", &report.tables.join(", "));
                if report.is_ok() {
                    ui::success("Schema matches");
                } else {
                    for issue in &report.issues {
                        ui::warn(&issue.to_string());
                    }
                }
            } else if report.is_ok() {
                emit_success(output_mode, "verify", &report)?;
            } else {
                emit_failure(output_mode, "verify", &report)?;
            }

            commands::require_clean(&report)?;
        }

        Commands::Stats => {
            let store = open_existing(&database)?;
            let stats = store.stats()?;

            if output_mode.is_human() {
                ui::banner(
                    &format!("{} Statistics", Icons::STATS),
                    &database.display().to_string(),
                );
                println!("{}", ui::stats_table(&stats));
            } else {
                emit_success(output_mode, "stats", stats)?;
            }
        }

        Commands::Item { key } => {
            let store = open_existing(&database)?;
            let summary = commands::item_summary(&store, &key)?;

            if output_mode.is_human() {
                let item = &summary.item;
                ui::header(&item.item_name);
                ui::summary_row("Id:", &item.id);
                ui::summary_row("URL name:", &item.url_name);
                ui::summary_row("Type:", item.item_type.as_deref().unwrap_or("-"));
                ui::summary_row("Thumb:", item.thumb.as_deref().unwrap_or("-"));
                ui::summary_row("Subtypes:", &list_or_dash(&summary.subtypes));
                let ranks: Vec<String> = summary.mod_ranks.iter().map(u32::to_string).collect();
                ui::summary_row("Mod ranks:", &list_or_dash(&ranks));
                ui::summary_row(
                    "Statistic rows:",
                    &format!("{} ({} qualified)", summary.statistics, summary.qualified),
                );
                for count in summary.by_order_type.iter().filter(|c| c.rows > 0) {
                    let label = count.order_type.map_or("untyped", |o| o.as_str());
                    ui::summary_row(&format!("  {}:", label), &count.rows.to_string());
                }
                if let Some(latest) = summary.latest {
                    ui::summary_row("Latest:", &latest.to_rfc3339());
                }
            } else {
                emit_success(output_mode, "item", &summary)?;
            }
        }

        Commands::Audit => {
            let store = open_existing(&database)?;
            let orphans = store.orphaned_statistics()?;

            if output_mode.is_human() {
                ui::header("Orphaned statistics");
                if orphans.is_empty() {
                    ui::success("Every statistic row references a known item");
                } else {
                    for orphan in &orphans {
                        ui::summary_row(&orphan.item_id, &format!("{} rows", orphan.rows));
                    }
                }
            } else {
                emit_success(output_mode, "audit", &orphans)?;
            }
        }
    }

    Ok(())
}

fn open_existing(database: &std::path::Path) -> anyhow::Result<MarketStore> {
    if !database.exists() {
        anyhow::bail!(
            "database {} does not exist (run `wfmarket reset` to create it)",
            database.display()
        );
    }
    Ok(MarketStore::open_existing(database)?)
}

fn list_or_dash<T: AsRef<str>>(values: &[T]) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.iter().map(|v| v.as_ref()).collect::<Vec<&str>>().join(", ")
    }
}
