use serde::{Deserialize, Deserializer, Serialize};

/// Competition pressure for a product in the target marketplace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum CompetitionLevel {
    Low,
    Medium,
    High,
}

impl CompetitionLevel {
    /// Parses English labels (any case) and the upstream marketplace labels
    /// (`Baixa`, `Media`, `Alta`). Anything else yields `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" | "baixa" => Some(Self::Low),
            "medium" | "media" | "média" => Some(Self::Medium),
            "high" | "alta" => Some(Self::High),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl TryFrom<String> for CompetitionLevel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_label(&value).ok_or_else(|| format!("unknown competition level `{value}`"))
    }
}

/// Aggregate buyer sentiment for a product.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Sentiment {
    Positive,
    Mixed,
    Negative,
}

impl Sentiment {
    /// Parses English labels (any case) and the upstream marketplace labels
    /// (`Positivo`, `Misto`, `Negativo`). Anything else yields `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "positive" | "positivo" => Some(Self::Positive),
            "mixed" | "misto" => Some(Self::Mixed),
            "negative" | "negativo" => Some(Self::Negative),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Mixed => "Mixed",
            Self::Negative => "Negative",
        }
    }
}

impl TryFrom<String> for Sentiment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_label(&value).ok_or_else(|| format!("unknown sentiment `{value}`"))
    }
}

/// Signals the score calculator combines into a 0-100 ranking.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductSignal {
    pub orders: u32,
    /// Supplier rating on a 0-5 scale. Out-of-range values are clamped.
    pub rating: f64,
    /// May be negative for loss-making listings.
    pub margin_percent: f64,
    #[serde(default)]
    pub competition: Option<CompetitionLevel>,
    #[serde(default)]
    pub sentiment: Option<Sentiment>,
    #[serde(default)]
    pub shipping_days: Option<u32>,
    /// Affiliate commission in percent.
    #[serde(default)]
    pub commission_rate: Option<f64>,
    #[serde(default)]
    pub has_video: bool,
}

/// Inputs of the viability calculator, prices in the supplier's currency.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViabilityInput {
    pub price_foreign: f64,
    pub shipping_foreign: f64,
    pub sales_volume: u32,
    pub supplier_rating: f64,
}

/// Landed cost of one unit in local currency.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionCost {
    pub price_local: f64,
    pub shipping_local: f64,
    pub import_tax: f64,
    pub total: f64,
}

/// Profitability breakdown for reselling a product in the local marketplace.
///
/// Currency amounts and percentages are rounded to 2 decimals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViabilityResult {
    pub price_foreign: f64,
    pub shipping_foreign: f64,
    pub exchange_rate: f64,
    pub acquisition: AcquisitionCost,
    pub suggested_price: f64,
    pub fixed_fee: f64,
    pub variable_fee: f64,
    pub total_fees: f64,
    pub total_costs: f64,
    pub net_profit: f64,
    pub real_margin_percent: f64,
    pub roi_percent: f64,
    pub is_viable: bool,
    pub viability_score: f64,
}

/// A product listing as returned by the affiliate marketplace.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductCandidate {
    pub external_id: String,
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Supplier price in foreign currency.
    pub supplier_price: f64,
    #[serde(default)]
    pub original_price: Option<f64>,
    /// Shipping in foreign currency. Falls back to the marketplace default.
    #[serde(default)]
    pub shipping_cost: Option<f64>,
    #[serde(default)]
    pub orders: u32,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub shipping_days: Option<u32>,
    #[serde(default)]
    pub commission_rate: Option<f64>,
    #[serde(default)]
    pub has_video: bool,
    #[serde(default, deserialize_with = "lenient_label")]
    pub competition: Option<CompetitionLevel>,
    #[serde(default, deserialize_with = "lenient_label")]
    pub sentiment: Option<Sentiment>,
    #[serde(default)]
    pub category: Option<String>,
}

impl ProductCandidate {
    pub fn has_image(&self) -> bool {
        self.image_url
            .as_deref()
            .map(|url| !url.trim().is_empty())
            .unwrap_or(false)
    }

    /// List-price discount in percent, when the listing shows a higher
    /// original price than it sells for.
    pub fn discount_percent(&self) -> Option<f64> {
        let original = self.original_price.filter(|price| price.is_finite())?;
        let price = self.supplier_price;
        if original <= 0.0 || !price.is_finite() || price <= 0.0 || price >= original {
            return None;
        }
        let percent = (original - price) / original * 100.0;
        Some((percent * 100.0).round_ties_even() / 100.0)
    }
}

trait Label: Sized {
    fn parse_label(label: &str) -> Option<Self>;
}

impl Label for CompetitionLevel {
    fn parse_label(label: &str) -> Option<Self> {
        Self::from_label(label)
    }
}

impl Label for Sentiment {
    fn parse_label(label: &str) -> Option<Self> {
        Self::from_label(label)
    }
}

// Scraped listings carry free-form labels; unknown ones become `None`.
fn lenient_label<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Label,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(T::parse_label))
}
