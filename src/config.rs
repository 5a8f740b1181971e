//! Dashboard Configuration
//! Source paths, default filter selection and refresh settings.

use crate::data::{AgeGroup, FilterSelection, IslandGroup, TableSources};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Settings for one dashboard process. Every field has a default, so a config
/// file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub geography_path: PathBuf,
    pub cause_path: PathBuf,
    pub default_age_groups: Vec<AgeGroup>,
    pub default_island_groups: Vec<IslandGroup>,
    /// Seconds between checks of the source files for changes
    pub refresh_interval_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            geography_path: PathBuf::from("table19.csv"),
            cause_path: PathBuf::from("table20.csv"),
            default_age_groups: vec![
                AgeGroup::From20To24,
                AgeGroup::From25To29,
                AgeGroup::From30To34,
                AgeGroup::From35To39,
            ],
            default_island_groups: IslandGroup::SELECTABLE.to_vec(),
            refresh_interval_secs: 2,
        }
    }
}

impl DashboardConfig {
    /// Read a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn sources(&self) -> TableSources {
        TableSources {
            geography: self.geography_path.clone(),
            causes: self.cause_path.clone(),
        }
    }

    /// Selection the sidebar starts with.
    pub fn default_selection(&self) -> FilterSelection {
        FilterSelection {
            age_groups: self.default_age_groups.iter().copied().collect(),
            island_groups: self.default_island_groups.iter().copied().collect(),
            cause_search: String::new(),
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }
}
