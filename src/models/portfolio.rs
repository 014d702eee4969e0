use serde::{Deserialize, Serialize};

/// Portfolio-level totals folded from a trade collection.
///
/// Invariants: `total_gain == realized_gain + unrealized_gain` and
/// `total_investment == Σ(buy_price × quantity)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PortfolioSnapshot {
    pub total_investment: f64,
    pub current_value: f64,
    pub total_gain: f64,
    pub gain_percentage: f64,
    pub total_trades: usize,
    pub open_trades: usize,
    pub closed_trades: usize,
    pub realized_gain: f64,
    pub unrealized_gain: f64,
}

/// Same totals as [`PortfolioSnapshot`] but scoped to one ticker symbol,
/// plus win rate and average holding period over that symbol's closed trades.
#[derive(Debug, Clone, Serialize)]
pub struct SymbolPerformance {
    pub symbol: String,
    pub total_trades: usize,
    pub open_trades: usize,
    pub closed_trades: usize,
    pub total_investment: f64,
    pub current_value: f64,
    pub total_gain: f64,
    pub gain_percentage: f64,
    pub realized_gain: f64,
    pub unrealized_gain: f64,
    /// Percentage of closed trades with a positive gain; 0 with no closed trades.
    pub win_rate: f64,
    /// Mean days between buy and sell over closed trades; 0 with no closed trades.
    pub average_holding_period_days: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RiskRequest {
    /// Period returns of the portfolio (e.g. daily), as fractions.
    #[serde(default)]
    pub returns: Vec<f64>,
    /// Portfolio value series for drawdown scanning.
    #[serde(default)]
    pub values: Vec<f64>,
    /// Benchmark returns; beta defaults to 1 when absent.
    #[serde(default)]
    pub market_returns: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RiskMetrics {
    pub volatility: f64,
    pub max_drawdown: f64,
    pub beta: f64,
}
