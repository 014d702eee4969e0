use serde::Serialize;

use super::trade::Trade;

/// A trade valued against an optional live price. Always recomputed from the
/// trade and the price at hand, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct TradeValuation {
    #[serde(flatten)]
    pub trade: Trade,
    pub current_value: f64,
    pub gain: f64,
    pub gain_percentage: f64,
}
