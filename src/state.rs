use std::sync::Arc;

use crate::services::price_cache::PriceCache;
use crate::store::trade_store::TradeStore;

/// Injected application components; no ambient singletons. The entry point
/// owns construction and wires everything through `Router::with_state`.
#[derive(Clone)]
pub struct AppState {
    pub trades: Arc<TradeStore>,
    pub prices: Arc<PriceCache>,
}
