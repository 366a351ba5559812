//! JSON-backed storage for the score and marketplace configurations.
//!
//! A missing file is an error, not an invitation to use defaults: defaults
//! are only written by [`ConfigStore::seed_defaults`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{ConfigError, MarketplaceConfig, ScoreConfig};

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "ProductRadar";
const APP_NAME: &str = "ProductRadar";

const SCORE_FILE: &str = "score_config.json";
const MARKETPLACE_FILE: &str = "marketplace_config.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage directory unavailable")]
    StorageUnavailable,
    #[error("{name} configuration not found; run `product-radar init-config` first")]
    Missing { name: &'static str },
    #[error("stored configuration is invalid: {0}")]
    Invalid(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

/// On-disk envelope around a configuration row.
#[derive(Debug, Serialize, Deserialize)]
pub struct StoredConfig<T> {
    /// Unix timestamp (seconds) of the last write.
    pub updated_at: u64,
    pub config: T,
}

/// Which files [`ConfigStore::seed_defaults`] had to create.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SeedOutcome {
    pub score_created: bool,
    pub marketplace_created: bool,
}

#[derive(Clone, Debug)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Platform configuration directory, e.g. `~/.config/productradar`.
    pub fn default_location() -> Option<Self> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
            .map(|dirs| Self::new(dirs.config_dir()))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn load_score_config(&self) -> Result<ScoreConfig, StoreError> {
        let config: ScoreConfig = self.read(SCORE_FILE, "score")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_marketplace_config(&self) -> Result<MarketplaceConfig, StoreError> {
        let config: MarketplaceConfig = self.read(MARKETPLACE_FILE, "marketplace")?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_score_config(&self, config: &ScoreConfig) -> Result<(), StoreError> {
        config.validate()?;
        self.write(SCORE_FILE, config)
    }

    pub fn save_marketplace_config(&self, config: &MarketplaceConfig) -> Result<(), StoreError> {
        config.validate()?;
        self.write(MARKETPLACE_FILE, config)
    }

    /// Writes the default configuration for every file that does not exist
    /// yet. Existing files are left untouched.
    pub fn seed_defaults(&self) -> Result<SeedOutcome, StoreError> {
        let mut outcome = SeedOutcome::default();

        if !self.path(SCORE_FILE).exists() {
            self.save_score_config(&ScoreConfig::default())?;
            outcome.score_created = true;
        }
        if !self.path(MARKETPLACE_FILE).exists() {
            self.save_marketplace_config(&MarketplaceConfig::default())?;
            outcome.marketplace_created = true;
        }

        info!(
            dir = %self.dir.display(),
            score_created = outcome.score_created,
            marketplace_created = outcome.marketplace_created,
            "configuration seeded"
        );
        Ok(outcome)
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    fn read<T: DeserializeOwned>(&self, file: &str, name: &'static str) -> Result<T, StoreError> {
        let path = self.path(file);
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::Missing { name });
            }
            Err(err) => return Err(err.into()),
        };
        let stored: StoredConfig<T> = serde_json::from_str(&data)?;
        debug!(path = %path.display(), updated_at = stored.updated_at, "loaded {name} configuration");
        Ok(stored.config)
    }

    fn write<T: Serialize>(&self, file: &str, config: &T) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let stored = StoredConfig {
            updated_at: unix_now(),
            config,
        };
        let json = serde_json::to_string_pretty(&stored)?;
        let path = self.path(file);
        fs::write(&path, json)?;
        debug!(path = %path.display(), "saved configuration");
        Ok(())
    }
}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
