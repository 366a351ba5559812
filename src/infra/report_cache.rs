//! On-disk copy of the most recent analysis report.

use std::{fs, io, path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::config_store::{unix_now, StoreError};
use crate::domain::AnalysisReport;

const REPORT_FILENAME: &str = "latest_report.json";

/// The last analysis report with the time it was cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedReport {
    /// Unix timestamp (seconds) when this report was cached.
    pub cached_at: u64,
    pub report: AnalysisReport,
}

impl CachedReport {
    pub fn new(report: AnalysisReport) -> Self {
        Self {
            cached_at: unix_now(),
            report,
        }
    }

    pub fn age(&self) -> Duration {
        Duration::from_secs(unix_now().saturating_sub(self.cached_at))
    }

    /// Human-readable age string.
    pub fn age_string(&self) -> String {
        format_age(self.age())
    }
}

fn format_age(age: Duration) -> String {
    let secs = age.as_secs();
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86400 {
        format!("{}h", secs / 3600)
    } else {
        format!("{}d", secs / 86400)
    }
}

#[derive(Clone, Debug)]
pub struct ReportCache {
    dir: PathBuf,
}

impl ReportCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Local data directory, e.g. `~/.local/share/product-radar`.
    pub fn default_location() -> Option<Self> {
        dirs::data_local_dir().map(|base| Self::new(base.join("product-radar")))
    }

    fn path(&self) -> PathBuf {
        self.dir.join(REPORT_FILENAME)
    }

    pub fn save(&self, report: &AnalysisReport) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let cached = CachedReport::new(report.clone());
        let content = serde_json::to_string(&cached)?;
        let path = self.path();
        fs::write(&path, content)?;
        info!(
            analysis = %report.id,
            products = report.products.len(),
            path = %path.display(),
            "cached analysis report"
        );
        Ok(())
    }

    /// `Ok(None)` when no report has been cached yet.
    pub fn load_latest(&self) -> Result<Option<CachedReport>, StoreError> {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        match serde_json::from_str::<CachedReport>(&content) {
            Ok(cached) => Ok(Some(cached)),
            Err(err) => {
                warn!(path = %path.display(), "failed to parse cached report: {err}");
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BlendMode;

    fn report() -> AnalysisReport {
        AnalysisReport {
            id: uuid::Uuid::new_v4(),
            keyword: Some("phone holder".to_string()),
            generated_at: "2025-11-22T14:51:31Z".to_string(),
            blend: BlendMode::ScoreOnly,
            products: Vec::new(),
            skipped: 2,
        }
    }

    #[test]
    fn empty_cache_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ReportCache::new(dir.path());
        assert!(cache.load_latest().unwrap().is_none());
    }

    #[test]
    fn latest_report_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ReportCache::new(dir.path().join("radar"));
        let original = report();
        cache.save(&original).unwrap();

        let loaded = cache.load_latest().unwrap().unwrap();
        assert_eq!(loaded.report, original);
        assert!(loaded.age() < Duration::from_secs(60));
    }

    #[test]
    fn age_formatting() {
        assert_eq!(format_age(Duration::from_secs(42)), "42s");
        assert_eq!(format_age(Duration::from_secs(125)), "2m");
        assert_eq!(format_age(Duration::from_secs(7200)), "2h");
        assert_eq!(format_age(Duration::from_secs(3 * 86400)), "3d");
    }
}
