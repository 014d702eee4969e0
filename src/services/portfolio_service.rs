use std::collections::HashMap;

use crate::models::{PortfolioSnapshot, Position, SymbolPerformance, Trade};
use crate::services::valuation_service;

pub const DEFAULT_RANKING_LIMIT: usize = 5;

/// Fold a trade collection into portfolio-level totals.
///
/// Realized gain sums over closed trades; unrealized gain sums over open
/// trades that have a price in `prices` (open trades without one contribute
/// zero). `total_gain` is their sum by construction.
pub fn aggregate(trades: &[Trade], prices: &HashMap<String, f64>) -> PortfolioSnapshot {
    let mut snapshot = PortfolioSnapshot {
        total_trades: trades.len(),
        ..PortfolioSnapshot::default()
    };

    for trade in trades {
        let valuation = valuation_service::valuate(trade, prices.get(&trade.symbol).copied());

        snapshot.total_investment += trade.cost_basis();
        snapshot.current_value += valuation.current_value;

        if trade.is_open() {
            snapshot.open_trades += 1;
            snapshot.unrealized_gain += valuation.gain;
        } else {
            snapshot.closed_trades += 1;
            snapshot.realized_gain += valuation.gain;
        }
    }

    snapshot.total_gain = snapshot.realized_gain + snapshot.unrealized_gain;
    snapshot.gain_percentage = if snapshot.total_investment > 0.0 {
        snapshot.total_gain / snapshot.total_investment * 100.0
    } else {
        0.0
    };

    snapshot
}

/// Per-symbol breakdown with the same totals as [`aggregate`], plus win rate
/// and average holding period over each symbol's closed trades. Groups keep
/// first-seen order; symbols are assumed normalized upstream.
pub fn aggregate_by_symbol(
    trades: &[Trade],
    prices: &HashMap<String, f64>,
) -> Vec<SymbolPerformance> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&Trade>> = HashMap::new();

    for trade in trades {
        let group = groups.entry(trade.symbol.as_str()).or_default();
        if group.is_empty() {
            order.push(trade.symbol.as_str());
        }
        group.push(trade);
    }

    order
        .into_iter()
        .map(|symbol| symbol_entry(symbol, &groups[symbol], prices))
        .collect()
}

fn symbol_entry(
    symbol: &str,
    trades: &[&Trade],
    prices: &HashMap<String, f64>,
) -> SymbolPerformance {
    let price = prices.get(symbol).copied();

    let mut entry = SymbolPerformance {
        symbol: symbol.to_string(),
        total_trades: trades.len(),
        open_trades: 0,
        closed_trades: 0,
        total_investment: 0.0,
        current_value: 0.0,
        total_gain: 0.0,
        gain_percentage: 0.0,
        realized_gain: 0.0,
        unrealized_gain: 0.0,
        win_rate: 0.0,
        average_holding_period_days: 0.0,
    };

    let mut winning_closed = 0usize;
    let mut holding_days = 0i64;

    for trade in trades {
        let valuation = valuation_service::valuate(trade, price);

        entry.total_investment += trade.cost_basis();
        entry.current_value += valuation.current_value;

        match trade.position {
            Position::Open => {
                entry.open_trades += 1;
                entry.unrealized_gain += valuation.gain;
            }
            Position::Closed { sell_date, .. } => {
                entry.closed_trades += 1;
                entry.realized_gain += valuation.gain;
                if valuation.gain > 0.0 {
                    winning_closed += 1;
                }
                holding_days += (sell_date - trade.buy_date).num_days().abs();
            }
        }
    }

    entry.total_gain = entry.realized_gain + entry.unrealized_gain;
    entry.gain_percentage = if entry.total_investment > 0.0 {
        entry.total_gain / entry.total_investment * 100.0
    } else {
        0.0
    };
    if entry.closed_trades > 0 {
        entry.win_rate = winning_closed as f64 / entry.closed_trades as f64 * 100.0;
        entry.average_holding_period_days = holding_days as f64 / entry.closed_trades as f64;
    }

    entry
}

/// Top `limit` symbols by gain percentage, keeping only strict winners.
pub fn best_performing(entries: &[SymbolPerformance], limit: usize) -> Vec<SymbolPerformance> {
    let mut winners: Vec<SymbolPerformance> = entries
        .iter()
        .filter(|e| e.gain_percentage > 0.0)
        .cloned()
        .collect();
    winners.sort_by(|a, b| {
        b.gain_percentage
            .partial_cmp(&a.gain_percentage)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    winners.truncate(limit);
    winners
}

/// Bottom `limit` symbols by gain percentage, keeping only strict losers.
pub fn worst_performing(entries: &[SymbolPerformance], limit: usize) -> Vec<SymbolPerformance> {
    let mut losers: Vec<SymbolPerformance> = entries
        .iter()
        .filter(|e| e.gain_percentage < 0.0)
        .cloned()
        .collect();
    losers.sort_by(|a, b| {
        a.gain_percentage
            .partial_cmp(&b.gain_percentage)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    losers.truncate(limit);
    losers
}
