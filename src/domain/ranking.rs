//! Sorting and filtering of analysed products.

use std::cmp::Ordering;

use super::analysis::AnalyzedProduct;

/// Sorting options for analysed products.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProductSort {
    /// Viable products first, then by final score.
    #[default]
    Recommended,
    Score,
    ViabilityScore,
    Roi,
    NetProfit,
    Orders,
}

impl ProductSort {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Recommended => "Recommended",
            Self::Score => "Score",
            Self::ViabilityScore => "Viability",
            Self::Roi => "ROI %",
            Self::NetProfit => "Net profit",
            Self::Orders => "Orders",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "recommended" => Some(Self::Recommended),
            "score" => Some(Self::Score),
            "viability" => Some(Self::ViabilityScore),
            "roi" => Some(Self::Roi),
            "profit" | "net-profit" => Some(Self::NetProfit),
            "orders" => Some(Self::Orders),
            _ => None,
        }
    }
}

/// Filter options for analysed products.
#[derive(Clone, Debug, Default)]
pub struct ProductFilter {
    pub min_score: Option<u8>,
    pub only_viable: bool,
    pub max_supplier_price: Option<f64>,
    pub min_roi_percent: Option<f64>,
    pub max_shipping_days: Option<u32>,
}

impl ProductFilter {
    pub fn matches(&self, product: &AnalyzedProduct) -> bool {
        if let Some(min) = self.min_score {
            if product.final_score < min {
                return false;
            }
        }
        if self.only_viable && !product.viability.is_viable {
            return false;
        }
        if let Some(max) = self.max_supplier_price {
            if product.supplier_price > max {
                return false;
            }
        }
        if let Some(min_roi) = self.min_roi_percent {
            if product.viability.roi_percent < min_roi {
                return false;
            }
        }
        // Listings without a shipping estimate are kept.
        if let (Some(max_days), Some(days)) = (self.max_shipping_days, product.signal.shipping_days) {
            if days > max_days {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, products: Vec<AnalyzedProduct>) -> Vec<AnalyzedProduct> {
        products.into_iter().filter(|p| self.matches(p)).collect()
    }
}

/// Sort products by the given criteria. The sort is stable.
pub fn sort_products(products: &mut [AnalyzedProduct], sort: ProductSort, descending: bool) {
    products.sort_by(|a, b| {
        let ord = match sort {
            ProductSort::Recommended => a
                .viability
                .is_viable
                .cmp(&b.viability.is_viable)
                .then(a.final_score.cmp(&b.final_score)),
            ProductSort::Score => a.final_score.cmp(&b.final_score),
            ProductSort::ViabilityScore => compare_f64(
                a.viability.viability_score,
                b.viability.viability_score,
            ),
            ProductSort::Roi => compare_f64(a.viability.roi_percent, b.viability.roi_percent),
            ProductSort::NetProfit => {
                compare_f64(a.viability.net_profit, b.viability.net_profit)
            }
            ProductSort::Orders => a.signal.orders.cmp(&b.signal.orders),
        };
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });
}

/// Filtered, sorted and truncated selection of a report's products. The
/// report itself is left untouched.
#[derive(Clone, Debug, Default)]
pub struct ReportView {
    pub filter: ProductFilter,
    pub sort: ProductSort,
    pub ascending: bool,
    pub limit: Option<usize>,
}

impl ReportView {
    pub fn select(&self, products: &[AnalyzedProduct]) -> Vec<AnalyzedProduct> {
        let mut selected: Vec<AnalyzedProduct> = products
            .iter()
            .filter(|product| self.filter.matches(product))
            .cloned()
            .collect();
        sort_products(&mut selected, self.sort, !self.ascending);
        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }
}

// total_cmp keeps the order total when an upstream value is NaN.
fn compare_f64(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}
