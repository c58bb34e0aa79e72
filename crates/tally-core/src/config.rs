//! Configuration for Tally
//!
//! ## Resolution
//!
//! Each setting is resolved in order, first hit wins:
//! 1. Command-line flag (applied by the CLI)
//! 2. Environment variable (`TALLY_DB`, `TALLY_STATEMENTS_DIR`, `TALLY_TAXONOMY`)
//! 3. `tally.toml` (`--config`, else `~/.config/tally/tally.toml` on Linux)
//! 4. Built-in default
//!
//! ```toml
//! db_path = "/home/me/finance/tally.db"
//! statements_dir = "/home/me/Downloads"
//! taxonomy_path = "/home/me/finance/categories.json"
//!
//! [reports]
//! income = ["work", "interest"]
//! excluded = ["debit"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::reports::ReportCategories;

pub const DB_PATH_ENV: &str = "TALLY_DB";
pub const STATEMENTS_DIR_ENV: &str = "TALLY_STATEMENTS_DIR";
pub const TAXONOMY_ENV: &str = "TALLY_TAXONOMY";

const DEFAULT_DB_PATH: &str = "tally.db";

/// Default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tally").join("tally.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    db_path: Option<PathBuf>,
    statements_dir: Option<PathBuf>,
    taxonomy_path: Option<PathBuf>,
    reports: Option<RawReports>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawReports {
    income: Option<Vec<String>>,
    excluded: Option<Vec<String>>,
}

/// Resolved settings
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: PathBuf,
    pub statements_dir: PathBuf,
    pub taxonomy_path: Option<PathBuf>,
    pub report_categories: ReportCategories,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            statements_dir: PathBuf::from("."),
            taxonomy_path: None,
            report_categories: ReportCategories::default(),
        }
    }
}

impl Config {
    /// Load from an explicit file (must exist) or the default location (optional),
    /// then apply environment overrides
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let content = match explicit {
            Some(path) => Some(fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Failed to read {}: {}", path.display(), e))
            })?),
            None => match default_config_path() {
                Some(path) if path.exists() => {
                    debug!(path = %path.display(), "Using default config file");
                    Some(fs::read_to_string(&path).map_err(|e| {
                        Error::Config(format!("Failed to read {}: {}", path.display(), e))
                    })?)
                }
                _ => None,
            },
        };

        let config = match content {
            Some(text) => Self::from_toml(&text)?,
            None => Self::default(),
        };
        Ok(config.with_env(|key| std::env::var(key).ok()))
    }

    /// Parse TOML content over the defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        let mut config = Self::default();
        if let Some(db_path) = raw.db_path {
            config.db_path = db_path;
        }
        if let Some(dir) = raw.statements_dir {
            config.statements_dir = dir;
        }
        config.taxonomy_path = raw.taxonomy_path;

        if let Some(reports) = raw.reports {
            if let Some(income) = reports.income {
                config.report_categories.income = income;
            }
            if let Some(excluded) = reports.excluded {
                config.report_categories.excluded = excluded;
            }
        }

        Ok(config)
    }

    /// Apply environment overrides through `lookup` (empty values are ignored)
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(db_path) = get(DB_PATH_ENV) {
            self.db_path = PathBuf::from(db_path);
        }
        if let Some(dir) = get(STATEMENTS_DIR_ENV) {
            self.statements_dir = PathBuf::from(dir);
        }
        if let Some(taxonomy) = get(TAXONOMY_ENV) {
            self.taxonomy_path = Some(PathBuf::from(taxonomy));
        }
        self
    }
}
