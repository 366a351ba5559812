//! Filesystem-backed storage: configuration rows and the latest report.

pub mod config_store;
pub mod report_cache;

pub use config_store::{ConfigStore, SeedOutcome, StoreError, StoredConfig};
pub use report_cache::{CachedReport, ReportCache};
