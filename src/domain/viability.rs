use super::config::MarketplaceConfig;
use super::entities::{AcquisitionCost, ViabilityInput, ViabilityResult};
use super::error::ConfigError;

/// Resale profitability of an imported product.
///
/// The sale price is solved for so that, after fixed and variable
/// marketplace fees, the configured target margin remains:
///
/// ```text
/// suggested = (acquisition + fixed_fee) / (1 - variable_fees - target_margin)
/// ```
///
/// Intermediate values keep full precision; currency amounts and percentages
/// are rounded to 2 decimals (ties to even) only in the returned breakdown.
/// The viability verdict uses the unrounded margin.
///
/// Amounts too large to stay finite are reported as
/// [`ConfigError::AmountOverflow`] instead of leaking NaN into the result.
pub fn calculate_viability(
    input: &ViabilityInput,
    config: &MarketplaceConfig,
) -> Result<ViabilityResult, ConfigError> {
    config.validate()?;

    let price_foreign = non_negative(input.price_foreign);
    let shipping_foreign = non_negative(input.shipping_foreign);
    let rating = clamp_rating(input.supplier_rating);

    let price_local = price_foreign * config.exchange_rate;
    let shipping_local = shipping_foreign * config.exchange_rate;
    let import_tax = (price_local + shipping_local) * (config.import_tax_percent / 100.0);
    let acquisition = price_local + shipping_local + import_tax;

    let variable_fraction = config.variable_fee_fraction();
    let denominator = 1.0 - variable_fraction - config.target_margin_fraction();
    let suggested_price = (acquisition + config.fixed_fee) / denominator;

    let variable_fee = suggested_price * variable_fraction;
    let total_fees = config.fixed_fee + variable_fee;
    let total_costs = acquisition + total_fees;
    let net_profit = suggested_price - total_costs;

    let real_margin = if suggested_price > 0.0 {
        net_profit / suggested_price * 100.0
    } else {
        0.0
    };
    let roi = if acquisition > 0.0 {
        net_profit / acquisition * 100.0
    } else {
        0.0
    };

    for (field, value) in [
        ("acquisition_total", acquisition),
        ("suggested_price", suggested_price),
        ("total_costs", total_costs),
        ("net_profit", net_profit),
        ("real_margin_percent", real_margin),
        ("roi_percent", roi),
    ] {
        if !value.is_finite() {
            return Err(ConfigError::AmountOverflow { field });
        }
    }

    let is_viable = real_margin >= config.min_margin_percent
        && input.sales_volume >= config.min_sales_volume
        && rating >= config.min_supplier_rating;

    let viability_score = viability_score(real_margin, input.sales_volume, rating, config);

    Ok(ViabilityResult {
        price_foreign,
        shipping_foreign,
        exchange_rate: config.exchange_rate,
        acquisition: AcquisitionCost {
            price_local: round2(price_local),
            shipping_local: round2(shipping_local),
            import_tax: round2(import_tax),
            total: round2(acquisition),
        },
        suggested_price: round2(suggested_price),
        fixed_fee: round2(config.fixed_fee),
        variable_fee: round2(variable_fee),
        total_fees: round2(total_fees),
        total_costs: round2(total_costs),
        net_profit: round2(net_profit),
        real_margin_percent: round2(real_margin),
        roi_percent: round2(roi),
        is_viable,
        viability_score: round2(viability_score),
    })
}

/// Weighted blend of margin, sales and rating sub-scores, each capped at 100.
/// `weight_delivery` has no sub-score and is ignored here.
fn viability_score(real_margin: f64, sales_volume: u32, rating: f64, config: &MarketplaceConfig) -> f64 {
    let margin_score = (real_margin / config.target_margin_percent * 100.0).clamp(0.0, 100.0);

    let sales_score = if config.min_sales_volume == 0 {
        100.0
    } else {
        (f64::from(sales_volume) / (f64::from(config.min_sales_volume) * 10.0) * 100.0).min(100.0)
    };

    let rating_score = rating / 5.0 * 100.0;

    let total = config.viability_weight_total();
    let weighted = margin_score * (config.weight_margin / total)
        + sales_score * (config.weight_sales / total)
        + rating_score * (config.weight_rating / total);

    weighted.clamp(0.0, 100.0)
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

fn clamp_rating(rating: f64) -> f64 {
    if rating.is_finite() {
        rating.clamp(0.0, 5.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn input() -> ViabilityInput {
        ViabilityInput {
            price_foreign: 10.0,
            shipping_foreign: 2.0,
            sales_volume: 200,
            supplier_rating: 4.6,
        }
    }

    #[test]
    fn acquisition_breakdown() {
        let result = calculate_viability(&input(), &MarketplaceConfig::default()).unwrap();
        assert_eq!(result.acquisition.price_local, 57.0);
        assert_eq!(result.acquisition.shipping_local, 11.4);
        assert_eq!(result.acquisition.import_tax, 41.04);
        assert_eq!(result.acquisition.total, 109.44);
        assert_eq!(result.exchange_rate, 5.70);
    }

    #[test]
    fn real_margin_lands_on_target() {
        let result = calculate_viability(&input(), &MarketplaceConfig::default()).unwrap();
        assert!((result.real_margin_percent - 50.0).abs() < 1e-9);
        assert!(result.is_viable);
    }

    #[test]
    fn each_threshold_can_veto() {
        let config = MarketplaceConfig::default();

        let thin = MarketplaceConfig {
            min_margin_percent: 60.0,
            ..config.clone()
        };
        assert!(!calculate_viability(&input(), &thin).unwrap().is_viable);

        let slow = ViabilityInput {
            sales_volume: 99,
            ..input()
        };
        assert!(!calculate_viability(&slow, &config).unwrap().is_viable);

        let poorly_rated = ViabilityInput {
            supplier_rating: 3.9,
            ..input()
        };
        assert!(!calculate_viability(&poorly_rated, &config).unwrap().is_viable);
    }

    #[test]
    fn sub_scores_are_weighted() {
        // margin 100 * 1.5, sales 200/1000 -> 20, rating 4.6 -> 92
        let result = calculate_viability(&input(), &MarketplaceConfig::default()).unwrap();
        assert_eq!(result.viability_score, 74.86);
    }

    #[test]
    fn zero_min_sales_volume_saturates_sales_score() {
        let config = MarketplaceConfig {
            min_sales_volume: 0,
            weight_margin: 0.0,
            weight_rating: 0.0,
            weight_sales: 1.0,
            ..MarketplaceConfig::default()
        };
        let idle = ViabilityInput {
            sales_volume: 0,
            ..input()
        };
        let result = calculate_viability(&idle, &config).unwrap();
        assert_eq!(result.viability_score, 100.0);
    }

    #[test]
    fn free_product_has_zero_roi() {
        let config = MarketplaceConfig {
            fixed_fee: 0.0,
            ..MarketplaceConfig::default()
        };
        let free = ViabilityInput {
            price_foreign: 0.0,
            shipping_foreign: 0.0,
            ..input()
        };
        let result = calculate_viability(&free, &config).unwrap();
        assert_eq!(result.suggested_price, 0.0);
        assert_eq!(result.roi_percent, 0.0);
        assert_eq!(result.real_margin_percent, 0.0);
        assert!(!result.is_viable);
    }

    #[test]
    fn noisy_inputs_are_clamped() {
        let noisy = ViabilityInput {
            price_foreign: -3.0,
            shipping_foreign: f64::NAN,
            sales_volume: 10,
            supplier_rating: 9.0,
        };
        let result = calculate_viability(&noisy, &MarketplaceConfig::default()).unwrap();
        assert_eq!(result.price_foreign, 0.0);
        assert_eq!(result.shipping_foreign, 0.0);
        assert!(result.viability_score.is_finite());
        assert!((0.0..=100.0).contains(&result.viability_score));
    }

    #[test]
    fn invalid_config_is_reported() {
        let config = MarketplaceConfig {
            exchange_rate: 0.0,
            ..MarketplaceConfig::default()
        };
        assert_matches!(
            calculate_viability(&input(), &config),
            Err(ConfigError::NonPositiveRate { .. })
        );
    }

    #[test]
    fn rounding_sends_ties_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(-0.125), -0.12);
        assert_eq!(round2(614.333_175), 614.33);
        assert_eq!(round2(2.675_000_1), 2.68);
    }

    #[test]
    fn overflowing_amounts_are_an_error() {
        let config = MarketplaceConfig::default();
        for price_foreign in [1e308, 1e307, f64::MAX] {
            let huge = ViabilityInput {
                price_foreign,
                ..input()
            };
            assert_matches!(
                calculate_viability(&huge, &config),
                Err(ConfigError::AmountOverflow { .. })
            );
        }
    }

    #[test]
    fn huge_weights_keep_the_score_in_range() {
        let config = MarketplaceConfig {
            weight_margin: 1.5e307,
            weight_sales: 1e307,
            weight_rating: 1e307,
            ..MarketplaceConfig::default()
        };
        let result = calculate_viability(&input(), &config).unwrap();
        assert!((result.viability_score - 74.86).abs() < 0.011);
    }
}
