//! Tunable parameters for the two calculators.
//!
//! Both structs are persisted as JSON by [`crate::infra::config_store`]. The
//! `Default` values are the seed rows written by `init-config`; calculators
//! never fall back to them on their own.

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Bounds and weights for the product score.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreConfig {
    pub min_margin_percent: f64,
    pub max_margin_percent: f64,
    pub weight_sales: f64,
    pub weight_competition: f64,
    pub weight_sentiment: f64,
    pub weight_margin: f64,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            min_margin_percent: 20.0,
            max_margin_percent: 80.0,
            weight_sales: 2.5,
            weight_competition: 2.0,
            weight_sentiment: 1.5,
            weight_margin: 3.0,
        }
    }
}

impl ScoreConfig {
    pub fn total_weight(&self) -> f64 {
        self.weight_sales + self.weight_competition + self.weight_sentiment + self.weight_margin
    }

    /// A margin range with `max <= min` is accepted; margin then contributes zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        finite("min_margin_percent", self.min_margin_percent)?;
        finite("max_margin_percent", self.max_margin_percent)?;

        for (field, value) in [
            ("weight_sales", self.weight_sales),
            ("weight_competition", self.weight_competition),
            ("weight_sentiment", self.weight_sentiment),
            ("weight_margin", self.weight_margin),
        ] {
            weight(field, value)?;
        }

        let total = self.total_weight();
        if !total.is_finite() {
            return Err(ConfigError::WeightSumOverflow { config: "score" });
        }
        if total <= 0.0 {
            return Err(ConfigError::ZeroWeightSum { config: "score" });
        }
        Ok(())
    }
}

/// Fees, taxes, thresholds and weights of the local resale marketplace.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketplaceConfig {
    /// Local currency units per foreign currency unit.
    pub exchange_rate: f64,
    pub fixed_fee: f64,
    pub percent_fee: f64,
    pub boost_fee: f64,
    pub import_tax_percent: f64,
    pub company_tax_percent: f64,
    pub target_margin_percent: f64,
    pub min_margin_percent: f64,
    pub min_sales_volume: u32,
    pub min_supplier_rating: f64,
    pub max_delivery_days: u32,
    /// Shipping in foreign currency used when a listing carries none.
    #[serde(default)]
    pub default_shipping_cost: f64,
    pub weight_margin: f64,
    pub weight_sales: f64,
    pub weight_rating: f64,
    /// Stored with the other weights but not part of the viability formula.
    pub weight_delivery: f64,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            exchange_rate: 5.70,
            fixed_fee: 20.0,
            percent_fee: 15.0,
            boost_fee: 5.0,
            import_tax_percent: 60.0,
            company_tax_percent: 8.93,
            target_margin_percent: 50.0,
            min_margin_percent: 30.0,
            min_sales_volume: 100,
            min_supplier_rating: 4.0,
            max_delivery_days: 45,
            default_shipping_cost: 15.0,
            weight_margin: 1.5,
            weight_sales: 1.0,
            weight_rating: 1.0,
            weight_delivery: 0.5,
        }
    }
}

impl MarketplaceConfig {
    /// Marketplace fee, boost fee and company tax as a fraction of the sale price.
    pub fn variable_fee_fraction(&self) -> f64 {
        (self.percent_fee + self.boost_fee + self.company_tax_percent) / 100.0
    }

    pub fn target_margin_fraction(&self) -> f64 {
        self.target_margin_percent / 100.0
    }

    pub fn viability_weight_total(&self) -> f64 {
        self.weight_margin + self.weight_sales + self.weight_rating
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.exchange_rate.is_finite() || self.exchange_rate <= 0.0 {
            return Err(ConfigError::NonPositiveRate {
                value: self.exchange_rate,
            });
        }

        at_least_zero("fixed_fee", self.fixed_fee)?;
        percent("percent_fee", self.percent_fee)?;
        percent("boost_fee", self.boost_fee)?;
        at_least_zero("import_tax_percent", self.import_tax_percent)?;
        at_least_zero("company_tax_percent", self.company_tax_percent)?;
        at_least_zero("default_shipping_cost", self.default_shipping_cost)?;
        finite("min_margin_percent", self.min_margin_percent)?;
        finite("min_supplier_rating", self.min_supplier_rating)?;

        if !self.target_margin_percent.is_finite() || self.target_margin_percent <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "target_margin_percent",
                value: self.target_margin_percent,
            });
        }

        let fraction = self.variable_fee_fraction() + self.target_margin_fraction();
        if fraction >= 1.0 {
            return Err(ConfigError::DegenerateFeeFraction { fraction });
        }

        for (field, value) in [
            ("weight_margin", self.weight_margin),
            ("weight_sales", self.weight_sales),
            ("weight_rating", self.weight_rating),
            ("weight_delivery", self.weight_delivery),
        ] {
            weight(field, value)?;
        }

        let total = self.viability_weight_total();
        if !total.is_finite() {
            return Err(ConfigError::WeightSumOverflow {
                config: "marketplace",
            });
        }
        if total <= 0.0 {
            return Err(ConfigError::ZeroWeightSum {
                config: "marketplace",
            });
        }
        Ok(())
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue { field, value })
    }
}

fn at_least_zero(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue { field, value })
    }
}

fn percent(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue { field, value })
    }
}

fn weight(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidWeight { field, value })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn seeded_defaults_are_valid() {
        assert!(ScoreConfig::default().validate().is_ok());
        assert!(MarketplaceConfig::default().validate().is_ok());
    }

    #[test]
    fn inverted_margin_range_is_accepted() {
        let config = ScoreConfig {
            min_margin_percent: 50.0,
            max_margin_percent: 50.0,
            ..ScoreConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_score_weights_are_rejected() {
        let config = ScoreConfig {
            weight_sales: 0.0,
            weight_competition: 0.0,
            weight_sentiment: 0.0,
            weight_margin: 0.0,
            ..ScoreConfig::default()
        };
        assert_matches!(
            config.validate(),
            Err(ConfigError::ZeroWeightSum { config: "score" })
        );
    }

    #[test]
    fn negative_weight_is_named() {
        let config = ScoreConfig {
            weight_sentiment: -1.0,
            ..ScoreConfig::default()
        };
        assert_matches!(
            config.validate(),
            Err(ConfigError::InvalidWeight {
                field: "weight_sentiment",
                ..
            })
        );
    }

    #[test]
    fn non_positive_rate_is_rejected() {
        for rate in [0.0, -5.7, f64::NAN] {
            let config = MarketplaceConfig {
                exchange_rate: rate,
                ..MarketplaceConfig::default()
            };
            assert_matches!(config.validate(), Err(ConfigError::NonPositiveRate { .. }));
        }
    }

    #[test]
    fn fee_fraction_at_exactly_one_is_rejected() {
        let config = MarketplaceConfig {
            percent_fee: 30.0,
            boost_fee: 10.0,
            company_tax_percent: 10.0,
            target_margin_percent: 50.0,
            ..MarketplaceConfig::default()
        };
        assert_matches!(
            config.validate(),
            Err(ConfigError::DegenerateFeeFraction { fraction }) if (fraction - 1.0).abs() < 1e-12
        );
    }

    #[test]
    fn delivery_weight_alone_does_not_count() {
        let config = MarketplaceConfig {
            weight_margin: 0.0,
            weight_sales: 0.0,
            weight_rating: 0.0,
            weight_delivery: 3.0,
            ..MarketplaceConfig::default()
        };
        assert_matches!(
            config.validate(),
            Err(ConfigError::ZeroWeightSum {
                config: "marketplace"
            })
        );
    }

    #[test]
    fn overflowing_weight_sums_are_rejected() {
        let score = ScoreConfig {
            weight_sales: 1e308,
            weight_competition: 1e308,
            weight_sentiment: 1e308,
            weight_margin: 1e308,
            ..ScoreConfig::default()
        };
        assert_matches!(
            score.validate(),
            Err(ConfigError::WeightSumOverflow { config: "score" })
        );

        let marketplace = MarketplaceConfig {
            weight_margin: 1e308,
            weight_sales: 1e308,
            weight_rating: 1e308,
            weight_delivery: 1e308,
            ..MarketplaceConfig::default()
        };
        assert_matches!(
            marketplace.validate(),
            Err(ConfigError::WeightSumOverflow {
                config: "marketplace"
            })
        );
    }
}
