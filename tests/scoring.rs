use product_radar::domain::{
    calculate_score, score::sales_norm, CompetitionLevel, ProductSignal, ScoreConfig, Sentiment,
};

fn unit_weights(min: f64, max: f64) -> ScoreConfig {
    ScoreConfig {
        min_margin_percent: min,
        max_margin_percent: max,
        weight_sales: 1.0,
        weight_competition: 1.0,
        weight_sentiment: 1.0,
        weight_margin: 1.0,
    }
}

fn strong_signal() -> ProductSignal {
    ProductSignal {
        orders: 15_000,
        rating: 4.8,
        margin_percent: 50.0,
        competition: Some(CompetitionLevel::Low),
        sentiment: Some(Sentiment::Positive),
        shipping_days: None,
        commission_rate: None,
        has_video: false,
    }
}

#[test]
fn best_seller_scores_near_the_top() {
    // base 3.5 / 4 = 0.875, multiplier 1 + (0.96 - 0.7) * 0.2 = 1.052
    let score = calculate_score(&strong_signal(), &unit_weights(20.0, 80.0)).unwrap();
    assert_eq!(score, 92);
}

#[test]
fn bonuses_push_best_seller_to_the_cap() {
    let signal = ProductSignal {
        has_video: true,
        shipping_days: Some(12),
        commission_rate: Some(8.0),
        margin_percent: 80.0,
        ..strong_signal()
    };
    let score = calculate_score(&signal, &unit_weights(20.0, 80.0)).unwrap();
    assert_eq!(score, 100);
}

#[test]
fn sales_normalization_edges() {
    assert_eq!(sales_norm(0), 0.05);
    for orders in [10_000, 10_001, 250_000, u32::MAX] {
        assert_eq!(sales_norm(orders), 1.0);
    }
}

#[test]
fn score_never_decreases_with_margin() {
    let config = unit_weights(20.0, 80.0);
    let mut previous = 0_u8;
    for step in 0..=120 {
        let signal = ProductSignal {
            margin_percent: 20.0 + f64::from(step) * 0.5,
            ..strong_signal()
        };
        let score = calculate_score(&signal, &config).unwrap();
        assert!(score >= previous, "score dropped at margin step {step}");
        previous = score;
    }
}

#[test]
fn equal_margin_bounds_contribute_nothing() {
    let degenerate = unit_weights(50.0, 50.0);
    let with_margin = ProductSignal {
        margin_percent: 90.0,
        ..strong_signal()
    };
    let without_margin = ProductSignal {
        margin_percent: -90.0,
        ..strong_signal()
    };
    assert_eq!(
        calculate_score(&with_margin, &degenerate).unwrap(),
        calculate_score(&without_margin, &degenerate).unwrap()
    );
}

#[test]
fn score_stays_in_range_for_adversarial_inputs() {
    let weights = [0.0, 0.001, 1.0, 250.0];
    let margins = [-500.0, 0.0, 35.0, 1e9];
    let ratings = [-3.0, 0.0, 2.5, 5.0, 99.0];
    let shipping = [None, Some(0), Some(31), Some(365)];

    for &ws in &weights {
        for &wm in &weights {
            let config = ScoreConfig {
                min_margin_percent: 10.0,
                max_margin_percent: 60.0,
                weight_sales: ws,
                weight_competition: 1.0,
                weight_sentiment: 0.0,
                weight_margin: wm,
            };
            for &margin in &margins {
                for &rating in &ratings {
                    for &days in &shipping {
                        let signal = ProductSignal {
                            orders: 7,
                            rating,
                            margin_percent: margin,
                            competition: None,
                            sentiment: Some(Sentiment::Negative),
                            shipping_days: days,
                            commission_rate: Some(50.0),
                            has_video: true,
                        };
                        let score = calculate_score(&signal, &config).unwrap();
                        assert!(score <= 100);
                    }
                }
            }
        }
    }
}

#[test]
fn scoring_is_repeatable() {
    let config = ScoreConfig::default();
    let first = calculate_score(&strong_signal(), &config).unwrap();
    let second = calculate_score(&strong_signal(), &config).unwrap();
    assert_eq!(first, second);
}
