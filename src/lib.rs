//! Product research toolkit.
//!
//! Scores marketplace listings, works out whether reselling them locally is
//! viable after import tax, marketplace fees and currency conversion, and
//! ranks the result.

pub mod app_config;
pub mod domain;
pub mod infra;
pub mod util;
