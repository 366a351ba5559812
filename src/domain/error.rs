use thiserror::Error;

/// Configuration (or an input amount) that would make a calculator divide by
/// zero or produce meaningless numbers.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{config} weights sum to zero")]
    ZeroWeightSum { config: &'static str },
    #[error("{config} weights sum to a non-finite total")]
    WeightSumOverflow { config: &'static str },
    #[error("weight `{field}` must be a finite, non-negative number (got {value})")]
    InvalidWeight { field: &'static str, value: f64 },
    #[error("exchange rate must be positive (got {value})")]
    NonPositiveRate { value: f64 },
    #[error("variable fees plus target margin must stay below 1.0 (got {fraction:.4})")]
    DegenerateFeeFraction { fraction: f64 },
    #[error("`{field}` is out of range (got {value})")]
    InvalidValue { field: &'static str, value: f64 },
    #[error("`{field}` does not fit in a finite amount")]
    AmountOverflow { field: &'static str },
}
