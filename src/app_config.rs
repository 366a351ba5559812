use std::path::PathBuf;

use crate::domain::DEFAULT_MARKUP;
use crate::infra::{ConfigStore, ReportCache};

/// Runtime settings read from the environment (and `.env`, when present).
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub config_dir: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub log_json: bool,
    pub markup: f64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            config_dir: lookup("RADAR_CONFIG_DIR")
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from),
            data_dir: lookup("RADAR_DATA_DIR")
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from),
            log_json: lookup("RADAR_LOG_FORMAT")
                .map(|value| value.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
            markup: lookup("RADAR_MARKUP")
                .and_then(|value| value.trim().parse::<f64>().ok())
                .filter(|markup| markup.is_finite() && *markup > 0.0)
                .unwrap_or(DEFAULT_MARKUP),
        }
    }

    pub fn config_store(&self) -> Option<ConfigStore> {
        match &self.config_dir {
            Some(dir) => Some(ConfigStore::new(dir)),
            None => ConfigStore::default_location(),
        }
    }

    pub fn report_cache(&self) -> Option<ReportCache> {
        match &self.data_dir {
            Some(dir) => Some(ReportCache::new(dir)),
            None => ReportCache::default_location(),
        }
    }
}
