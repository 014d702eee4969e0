use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::{CreateTrade, Position, SellTrade, Trade, UpdateTrade};
use crate::store::key_value::KeyValueStore;
use crate::utils::validation;

const TRADES_KEY: &str = "tradelog:trades";

/// Canonical trade collection, persisted as a JSON array under a fixed key.
///
/// Mutations update the in-memory view first and then write through; a
/// failed write is logged and the memory state is kept, so memory and store
/// can diverge until the next successful write. That inconsistency window is
/// accepted (best-effort persistence only).
pub struct TradeStore {
    store: Arc<dyn KeyValueStore>,
    trades: RwLock<Vec<Trade>>,
}

impl TradeStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let trades = match store.get(TRADES_KEY) {
            Some(raw) => match serde_json::from_str::<Vec<Trade>>(&raw) {
                Ok(trades) => trades,
                Err(e) => {
                    error!("Failed to parse persisted trades, starting empty: {}", e);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        info!("Loaded {} persisted trades", trades.len());

        Self {
            store,
            trades: RwLock::new(trades),
        }
    }

    pub fn list(&self) -> Vec<Trade> {
        self.trades.read().clone()
    }

    pub fn get(&self, id: &str) -> Result<Trade, AppError> {
        self.trades
            .read()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Trade {} not found", id)))
    }

    pub fn insert(&self, data: CreateTrade) -> Result<Trade, AppError> {
        validation::validate_new_trade(&data)?;

        let trade = Trade::new(
            data.symbol.trim().to_uppercase(),
            data.quantity,
            data.buy_price,
            data.buy_date,
        );

        let mut trades = self.trades.write();
        trades.push(trade.clone());
        self.persist(trades.as_slice());
        Ok(trade)
    }

    /// Close an open trade by recording its sell leg.
    pub fn record_sell(&self, id: &str, data: SellTrade) -> Result<Trade, AppError> {
        validation::validate_sell(&data)?;

        let mut trades = self.trades.write();
        let trade = trades
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Trade {} not found", id)))?;

        if !trade.is_open() {
            return Err(AppError::Validation(format!(
                "Trade {} is already closed",
                id
            )));
        }

        trade.position = Position::Closed {
            sell_price: data.sell_price,
            sell_date: data.sell_date,
        };
        let updated = trade.clone();

        self.persist(trades.as_slice());
        Ok(updated)
    }

    pub fn update(&self, id: &str, data: UpdateTrade) -> Result<Trade, AppError> {
        validation::validate_update(&data)?;

        let mut trades = self.trades.write();
        let trade = trades
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Trade {} not found", id)))?;

        if let Some(quantity) = data.quantity {
            trade.quantity = quantity;
        }
        if let Some(buy_price) = data.buy_price {
            trade.buy_price = buy_price;
        }
        let updated = trade.clone();

        self.persist(trades.as_slice());
        Ok(updated)
    }

    pub fn delete(&self, id: &str) -> Result<(), AppError> {
        let mut trades = self.trades.write();
        let before = trades.len();
        trades.retain(|t| t.id != id);
        if trades.len() == before {
            return Err(AppError::NotFound(format!("Trade {} not found", id)));
        }

        self.persist(trades.as_slice());
        Ok(())
    }

    pub fn clear(&self) {
        let mut trades = self.trades.write();
        trades.clear();
        self.persist(trades.as_slice());
    }

    fn persist(&self, trades: &[Trade]) {
        match serde_json::to_string(trades) {
            Ok(raw) => {
                if let Err(e) = self.store.set(TRADES_KEY, &raw) {
                    error!("Failed to persist trades, keeping in-memory state: {}", e);
                }
            }
            Err(e) => error!("Failed to serialize trades: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::key_value::MemoryStore;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_store() -> (Arc<MemoryStore>, TradeStore) {
        let kv = Arc::new(MemoryStore::new());
        let trades = TradeStore::new(kv.clone());
        (kv, trades)
    }

    fn buy(symbol: &str) -> CreateTrade {
        CreateTrade {
            symbol: symbol.to_string(),
            quantity: 10,
            buy_price: 100.0,
            buy_date: date(2024, 1, 2),
        }
    }

    #[test]
    fn insert_normalizes_symbol_and_persists() {
        let (kv, store) = new_store();
        let trade = store.insert(buy(" aapl ")).unwrap();
        assert_eq!(trade.symbol, "AAPL");
        assert!(trade.is_open());

        // the persisted array round-trips through a fresh store
        let reloaded = TradeStore::new(kv);
        assert_eq!(reloaded.list(), vec![trade]);
    }

    #[test]
    fn insert_rejects_invalid_input() {
        let (_, store) = new_store();
        let mut data = buy("AAPL");
        data.quantity = 0;
        assert!(matches!(store.insert(data), Err(AppError::Validation(_))));
        assert!(store.list().is_empty());
    }

    #[test]
    fn selling_closes_the_trade_once() {
        let (_, store) = new_store();
        let trade = store.insert(buy("AAPL")).unwrap();

        let sell = SellTrade {
            sell_price: 120.0,
            sell_date: date(2024, 2, 2),
        };
        let closed = store.record_sell(&trade.id, sell.clone()).unwrap();
        assert!(!closed.is_open());
        assert_eq!(
            closed.position,
            Position::Closed {
                sell_price: 120.0,
                sell_date: date(2024, 2, 2)
            }
        );

        // a second sell on the same trade is a caller error
        assert!(matches!(
            store.record_sell(&trade.id, sell),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn update_touches_only_supplied_fields() {
        let (_, store) = new_store();
        let trade = store.insert(buy("AAPL")).unwrap();

        let updated = store
            .update(
                &trade.id,
                UpdateTrade {
                    quantity: Some(25),
                    buy_price: None,
                },
            )
            .unwrap();
        assert_eq!(updated.quantity, 25);
        assert_eq!(updated.buy_price, 100.0);
    }

    #[test]
    fn delete_and_clear() {
        let (_, store) = new_store();
        let trade = store.insert(buy("AAPL")).unwrap();
        store.insert(buy("MSFT")).unwrap();

        store.delete(&trade.id).unwrap();
        assert!(matches!(store.get(&trade.id), Err(AppError::NotFound(_))));
        assert!(matches!(
            store.delete("no-such-id"),
            Err(AppError::NotFound(_))
        ));

        store.clear();
        assert!(store.list().is_empty());
    }
}
