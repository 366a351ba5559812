//! Product scoring and resale viability live here.

pub mod analysis;
pub mod config;
pub mod entities;
pub mod error;
pub mod ranking;
pub mod score;
pub mod viability;

pub use analysis::{
    analyze_product, analyze_products, blend_scores, derive_competition, derive_sentiment,
    estimate_margin, signal_for, AnalysisOptions, AnalysisReport, AnalyzedProduct, BlendMode,
    QualityGate, DEFAULT_MARKUP,
};
pub use config::{MarketplaceConfig, ScoreConfig};
pub use entities::{
    AcquisitionCost, CompetitionLevel, ProductCandidate, ProductSignal, Sentiment,
    ViabilityInput, ViabilityResult,
};
pub use error::ConfigError;
pub use ranking::{sort_products, ProductFilter, ProductSort, ReportView};
pub use score::{calculate_score, score_breakdown, ScoreBreakdown};
pub use viability::calculate_viability;
