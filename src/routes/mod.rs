pub(crate) mod health;
pub(crate) mod portfolio;
pub(crate) mod prices;
pub(crate) mod trades;

use std::collections::HashMap;

use crate::models::Trade;
use crate::state::AppState;

/// Cache-only price map for the symbols in a trade collection. Read paths
/// never hit the network; a live refresh is an explicit prices-API call.
pub(crate) fn cached_price_map(state: &AppState, trades: &[Trade]) -> HashMap<String, f64> {
    let mut prices = HashMap::new();
    for trade in trades {
        if !prices.contains_key(&trade.symbol) {
            if let Some(price) = state.prices.get_cached_price(&trade.symbol) {
                prices.insert(trade.symbol.clone(), price);
            }
        }
    }
    prices
}
