use crate::models::{Position, Trade, TradeValuation};

/// Resolve the price a trade is valued at, in priority order: the realized
/// sell price for a closed trade, then the supplied live price, then the buy
/// price as the last resort for an unpriced open trade.
pub fn effective_price(trade: &Trade, current_price: Option<f64>) -> f64 {
    match trade.position {
        Position::Closed { sell_price, .. } => sell_price,
        Position::Open => current_price.unwrap_or(trade.buy_price),
    }
}

/// Value a single trade against an optional live price.
///
/// Closed trades are authoritative: the realized gain ignores any supplied
/// quote. An open trade with no quote values at cost, so its gain is zero.
/// Inputs are assumed validated upstream (positive quantity and buy price).
pub fn valuate(trade: &Trade, current_price: Option<f64>) -> TradeValuation {
    let quantity = trade.quantity as f64;
    let cost_basis = trade.cost_basis();
    let current_value = quantity * effective_price(trade, current_price);

    let gain = match trade.position {
        Position::Closed { sell_price, .. } => (sell_price - trade.buy_price) * quantity,
        Position::Open => match current_price {
            Some(price) => (price - trade.buy_price) * quantity,
            None => 0.0,
        },
    };

    let gain_percentage = if cost_basis > 0.0 {
        (current_value - cost_basis) / cost_basis * 100.0
    } else {
        0.0
    };

    TradeValuation {
        trade: trade.clone(),
        current_value,
        gain,
        gain_percentage,
    }
}
