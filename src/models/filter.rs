use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::valuation::TradeValuation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Date,
    Symbol,
    Gain,
    Quantity,
}

impl SortField {
    /// An unrecognized field name sorts nothing rather than erroring.
    pub fn parse(field: &str) -> Option<Self> {
        match field {
            "date" => Some(SortField::Date),
            "symbol" => Some(SortField::Symbol),
            "gain" => Some(SortField::Gain),
            "quantity" => Some(SortField::Quantity),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Declarative filter and sort criteria for a trade collection.
///
/// `open_only` and `closed_only` are mutually exclusive; gain bounds apply
/// after valuation since gain is a derived field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TradeFilter {
    pub symbol: Option<String>,
    pub open_only: bool,
    pub closed_only: bool,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub min_gain: Option<f64>,
    pub max_gain: Option<f64>,
    pub sort_by: Option<String>,
    pub sort_direction: SortDirection,
}

/// Filter/sort response: the surviving valuations plus totals computed over
/// the final filtered set, not the original input.
#[derive(Debug, Clone, Serialize)]
pub struct FilteredTrades {
    pub trades: Vec<TradeValuation>,
    pub total_count: usize,
    pub total_value: f64,
    pub total_gain: f64,
    pub open_positions: usize,
    pub closed_positions: usize,
}
