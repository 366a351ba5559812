//! Turns raw marketplace listings into a ranked analysis report.
//!
//! Both calculators run independently per product; their results are then
//! blended (when requested) and the list sorted viable-first.

use serde::{Deserialize, Serialize};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::config::{MarketplaceConfig, ScoreConfig};
use super::entities::{
    CompetitionLevel, ProductCandidate, ProductSignal, Sentiment, ViabilityInput, ViabilityResult,
};
use super::error::ConfigError;
use super::ranking::{sort_products, ProductSort};
use super::score::calculate_score;
use super::viability::{calculate_viability, round2};

/// Multiplier from supplier price to the estimated resale price.
pub const DEFAULT_MARKUP: f64 = 2.5;

/// How the product score and the viability score end up in `final_score`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlendMode {
    ScoreOnly,
    #[default]
    AverageWithViability,
}

/// Minimum listing quality for a candidate to be analysed at all.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QualityGate {
    pub min_rating: f64,
    pub require_image: bool,
}

impl Default for QualityGate {
    fn default() -> Self {
        Self {
            min_rating: 3.5,
            require_image: true,
        }
    }
}

impl QualityGate {
    pub fn admits(&self, candidate: &ProductCandidate) -> bool {
        candidate.rating >= self.min_rating
            && candidate.supplier_price > 0.0
            && (!self.require_image || candidate.has_image())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisOptions {
    pub keyword: Option<String>,
    pub markup: f64,
    pub blend: BlendMode,
    pub quality: QualityGate,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            keyword: None,
            markup: DEFAULT_MARKUP,
            blend: BlendMode::default(),
            quality: QualityGate::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedProduct {
    pub external_id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub supplier_price: f64,
    #[serde(default)]
    pub original_price: Option<f64>,
    #[serde(default)]
    pub discount_percent: Option<f64>,
    pub estimated_sale_price: f64,
    pub signal: ProductSignal,
    pub score: u8,
    pub viability: ViabilityResult,
    pub final_score: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub id: Uuid,
    pub keyword: Option<String>,
    pub generated_at: String,
    pub blend: BlendMode,
    pub products: Vec<AnalyzedProduct>,
    pub skipped: usize,
}

impl AnalysisReport {
    pub fn viable_count(&self) -> usize {
        self.products
            .iter()
            .filter(|product| product.viability.is_viable)
            .count()
    }
}

/// Competition guess from the listing's own order count.
pub fn derive_competition(orders: u32) -> CompetitionLevel {
    match orders {
        5001.. => CompetitionLevel::High,
        1001..=5000 => CompetitionLevel::Medium,
        _ => CompetitionLevel::Low,
    }
}

/// Sentiment guess from the supplier rating.
pub fn derive_sentiment(rating: f64) -> Sentiment {
    if rating >= 4.5 {
        Sentiment::Positive
    } else if rating >= 3.5 {
        Sentiment::Mixed
    } else {
        Sentiment::Negative
    }
}

/// Returns `(estimated_sale_price, margin_percent)` for a markup heuristic.
pub fn estimate_margin(supplier_price: f64, markup: f64) -> (f64, f64) {
    let estimated = supplier_price * markup;
    if !estimated.is_finite() || estimated <= 0.0 {
        return (0.0, 0.0);
    }
    let margin = (estimated - supplier_price) / estimated * 100.0;
    (round2(estimated), round2(margin))
}

pub fn signal_for(candidate: &ProductCandidate, markup: f64) -> ProductSignal {
    let (_, margin_percent) = estimate_margin(candidate.supplier_price, markup);
    ProductSignal {
        orders: candidate.orders,
        rating: candidate.rating,
        margin_percent,
        competition: Some(
            candidate
                .competition
                .unwrap_or_else(|| derive_competition(candidate.orders)),
        ),
        sentiment: Some(
            candidate
                .sentiment
                .unwrap_or_else(|| derive_sentiment(candidate.rating)),
        ),
        shipping_days: candidate.shipping_days,
        commission_rate: candidate.commission_rate,
        has_video: candidate.has_video,
    }
}

pub fn blend_scores(score: u8, viability_score: f64, mode: BlendMode) -> u8 {
    match mode {
        BlendMode::ScoreOnly => score,
        BlendMode::AverageWithViability => {
            ((f64::from(score) + viability_score) / 2.0).clamp(0.0, 100.0).floor() as u8
        }
    }
}

pub fn analyze_product(
    candidate: &ProductCandidate,
    score_config: &ScoreConfig,
    marketplace: &MarketplaceConfig,
    options: &AnalysisOptions,
) -> Result<AnalyzedProduct, ConfigError> {
    let signal = signal_for(candidate, options.markup);
    let score = calculate_score(&signal, score_config)?;

    let viability = calculate_viability(
        &ViabilityInput {
            price_foreign: candidate.supplier_price,
            shipping_foreign: candidate
                .shipping_cost
                .unwrap_or(marketplace.default_shipping_cost),
            sales_volume: candidate.orders,
            supplier_rating: candidate.rating,
        },
        marketplace,
    )?;

    let final_score = blend_scores(score, viability.viability_score, options.blend);
    let (estimated_sale_price, _) = estimate_margin(candidate.supplier_price, options.markup);

    debug!(
        product = %candidate.external_id,
        score,
        viability_score = viability.viability_score,
        viable = viability.is_viable,
        final_score,
        "evaluated product"
    );

    Ok(AnalyzedProduct {
        external_id: candidate.external_id.clone(),
        name: candidate.name.clone(),
        image_url: candidate.image_url.clone(),
        category: candidate.category.clone(),
        supplier_price: candidate.supplier_price,
        original_price: candidate.original_price,
        discount_percent: candidate.discount_percent(),
        estimated_sale_price,
        signal,
        score,
        viability,
        final_score,
    })
}

/// Scores every admitted candidate and returns them viable-first, best first.
///
/// Both configurations are validated before the first product is touched, so
/// a configuration error never yields a partial report. A listing whose
/// amounts overflow is counted as skipped.
pub fn analyze_products(
    candidates: &[ProductCandidate],
    score_config: &ScoreConfig,
    marketplace: &MarketplaceConfig,
    options: &AnalysisOptions,
) -> Result<AnalysisReport, ConfigError> {
    score_config.validate()?;
    marketplace.validate()?;

    let mut products = Vec::with_capacity(candidates.len());
    let mut skipped = 0_usize;

    for candidate in candidates {
        if !options.quality.admits(candidate) {
            debug!(product = %candidate.external_id, "candidate below quality gate");
            skipped += 1;
            continue;
        }
        match analyze_product(candidate, score_config, marketplace, options) {
            Ok(product) => products.push(product),
            Err(ConfigError::AmountOverflow { field }) => {
                warn!(product = %candidate.external_id, field, "amount overflow, candidate skipped");
                skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }

    if products.is_empty() {
        warn!(
            candidates = candidates.len(),
            "no candidate passed the quality gate"
        );
    }

    sort_products(&mut products, ProductSort::Recommended, true);

    let report = AnalysisReport {
        id: Uuid::new_v4(),
        keyword: options.keyword.clone(),
        generated_at: now_rfc3339(),
        blend: options.blend,
        products,
        skipped,
    };

    info!(
        analysis = %report.id,
        analysed = report.products.len(),
        viable = report.viable_count(),
        skipped,
        "analysis finished"
    );

    Ok(report)
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| OffsetDateTime::now_utc().unix_timestamp().to_string())
}
