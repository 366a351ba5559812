//! Heuristic 0-100 product score.
//!
//! Sales, competition, sentiment and margin are normalized to `[0, 1]` and
//! combined with the configured weights. Rating, video presence, shipping
//! time and commission only adjust a multiplier applied on top.

use serde::Serialize;

use super::config::ScoreConfig;
use super::entities::{CompetitionLevel, ProductSignal, Sentiment};
use super::error::ConfigError;

/// Order count at which the sales component saturates.
pub const SALES_SATURATION: u32 = 10_000;
/// Sales component for a listing without orders.
pub const SALES_FLOOR: f64 = 0.05;

const RATING_PIVOT: f64 = 0.7;
const RATING_FACTOR: f64 = 0.2;
const VIDEO_BONUS: f64 = 0.05;
const COMMISSION_BONUS: f64 = 0.05;
const COMMISSION_THRESHOLD: f64 = 5.0;

/// Every intermediate value of a score computation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub sales: f64,
    pub competition: f64,
    pub sentiment: f64,
    pub margin: f64,
    pub rating: f64,
    pub weighted_base: f64,
    pub total_weight: f64,
    pub multiplier: f64,
    pub score: u8,
}

/// Log-scaled order volume: 0 orders map to [`SALES_FLOOR`], anything at or
/// above [`SALES_SATURATION`] maps to 1.
pub fn sales_norm(orders: u32) -> f64 {
    if orders >= SALES_SATURATION {
        return 1.0;
    }
    let scaled = (f64::from(orders) + 1.0).ln() / (f64::from(SALES_SATURATION) + 1.0).ln();
    scaled.clamp(SALES_FLOOR, 1.0)
}

pub fn competition_norm(level: Option<CompetitionLevel>) -> f64 {
    match level {
        Some(CompetitionLevel::Low) => 1.0,
        Some(CompetitionLevel::Medium) => 0.5,
        Some(CompetitionLevel::High) => 0.0,
        None => 0.5,
    }
}

pub fn sentiment_norm(sentiment: Option<Sentiment>) -> f64 {
    match sentiment {
        Some(Sentiment::Positive) => 1.0,
        Some(Sentiment::Mixed) => 0.5,
        Some(Sentiment::Negative) => 0.0,
        None => 0.5,
    }
}

/// Linear position of `margin` inside `[min, max]`, clamped to `[0, 1]`.
/// An empty or inverted range yields 0.
pub fn margin_norm(margin: f64, min: f64, max: f64) -> f64 {
    if max <= min || !margin.is_finite() {
        return 0.0;
    }
    ((margin - min) / (max - min)).clamp(0.0, 1.0)
}

pub fn rating_norm(rating: f64) -> f64 {
    if !rating.is_finite() {
        return 0.0;
    }
    rating.clamp(0.0, 5.0) / 5.0
}

/// Multiplier on the weighted base. Starts at 1 and moves with rating,
/// video, shipping time and commission. Missing optional fields add nothing.
pub fn bonus_multiplier(signal: &ProductSignal) -> f64 {
    let mut multiplier = 1.0 + (rating_norm(signal.rating) - RATING_PIVOT) * RATING_FACTOR;

    if signal.has_video {
        multiplier += VIDEO_BONUS;
    }

    if let Some(days) = signal.shipping_days {
        multiplier += shipping_adjustment(days);
    }

    if let Some(rate) = signal.commission_rate {
        if rate.is_finite() && rate > COMMISSION_THRESHOLD {
            multiplier += COMMISSION_BONUS;
        }
    }

    multiplier
}

fn shipping_adjustment(days: u32) -> f64 {
    match days {
        0..=15 => 0.08,
        16..=30 => 0.03,
        31..=45 => 0.0,
        _ => -0.10,
    }
}

pub fn score_breakdown(
    signal: &ProductSignal,
    config: &ScoreConfig,
) -> Result<ScoreBreakdown, ConfigError> {
    config.validate()?;

    let sales = sales_norm(signal.orders);
    let competition = competition_norm(signal.competition);
    let sentiment = sentiment_norm(signal.sentiment);
    let margin = margin_norm(
        signal.margin_percent,
        config.min_margin_percent,
        config.max_margin_percent,
    );
    let rating = rating_norm(signal.rating);

    let weighted_base = config.weight_sales * sales
        + config.weight_competition * competition
        + config.weight_sentiment * sentiment
        + config.weight_margin * margin;
    let total_weight = config.total_weight();
    let multiplier = bonus_multiplier(signal);

    // Normalize before scaling so huge weights cannot overflow.
    let raw = weighted_base / total_weight * multiplier * 100.0;
    let score = raw.clamp(0.0, 100.0).round_ties_even() as u8;

    Ok(ScoreBreakdown {
        sales,
        competition,
        sentiment,
        margin,
        rating,
        weighted_base,
        total_weight,
        multiplier,
        score,
    })
}

/// Scores a product in `[0, 100]`. Fails only on an unusable configuration.
pub fn calculate_score(signal: &ProductSignal, config: &ScoreConfig) -> Result<u8, ConfigError> {
    score_breakdown(signal, config).map(|breakdown| breakdown.score)
}
