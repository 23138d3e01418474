//! `wfmarket.toml` handling
//!
//! The file only names the database. The `--database` flag wins over it and
//! `wfmarket.db` in the working directory is the fallback.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "wfmarket.toml";
pub const DATABASE_FILE: &str = "wfmarket.db";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MarketConfig {
    pub database: Option<PathBuf>,
}

impl MarketConfig {
    /// Read `path`; an absent file yields the default config.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
    }

    /// Write the config to `path`, refusing to replace an existing file unless `overwrite`.
    pub fn save(&self, path: &Path, overwrite: bool) -> anyhow::Result<()> {
        if path.exists() && !overwrite {
            anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
        }

        let contents = format!("# wfmarket store configuration\n{}", toml::to_string_pretty(self)?);
        std::fs::write(path, contents).with_context(|| format!("writing {}", path.display()))
    }

    /// Database to open: the `--database` flag, then this config, then `wfmarket.db`
    pub fn database_path(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.or_else(|| self.database.clone())
            .unwrap_or_else(|| PathBuf::from(DATABASE_FILE))
    }
}

/// Create the directories a new database file will live in
pub fn prepare_database_dir(database: &Path) -> anyhow::Result<()> {
    let Some(parent) = database.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    if !parent.is_dir() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
        tracing::debug!("Created {}", parent.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_path_precedence() {
        let config = MarketConfig { database: Some("data/market.db".into()) };

        assert_eq!(config.database_path(Some("flag.db".into())), PathBuf::from("flag.db"));
        assert_eq!(config.database_path(None), PathBuf::from("data/market.db"));
        assert_eq!(MarketConfig::default().database_path(None), PathBuf::from(DATABASE_FILE));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let config = MarketConfig { database: Some("x.db".into()) };

        config.save(&path, false).unwrap();
        assert!(config.save(&path, false).is_err());
        config.save(&path, true).unwrap();

        assert_eq!(MarketConfig::load(&path).unwrap(), config);
        assert_eq!(
            MarketConfig::load(&dir.path().join("absent.toml")).unwrap(),
            MarketConfig::default()
        );
    }

    #[test]
    fn test_malformed_config_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "database = [").unwrap();

        let err = MarketConfig::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains(CONFIG_FILE));
    }

    #[test]
    fn test_prepare_database_dir_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("nested/deeper/market.db");
        prepare_database_dir(&db).unwrap();
        assert!(db.parent().unwrap().is_dir());
        prepare_database_dir(Path::new("bare.db")).unwrap();
    }
}
