use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Whether a trade still holds its shares or has been sold off.
///
/// Closing a trade requires both the sell price and the sell date, so the
/// pair travels together in the variant instead of as two nullable fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Position {
    Open,
    Closed { sell_price: f64, sell_date: NaiveDate },
}

// Represents a single buy (and optional matching sell) of a ticker symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: String,
    pub symbol: String,
    pub quantity: u32,
    pub buy_price: f64,
    pub buy_date: NaiveDate,
    #[serde(flatten)]
    pub position: Position,
}

impl Trade {
    pub fn new(symbol: String, quantity: u32, buy_price: f64, buy_date: NaiveDate) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            symbol,
            quantity,
            buy_price,
            buy_date,
            position: Position::Open,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.position, Position::Open)
    }

    /// Total amount paid on entry: buy price times quantity.
    pub fn cost_basis(&self) -> f64 {
        self.buy_price * self.quantity as f64
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTrade {
    pub symbol: String,
    pub quantity: u32,
    pub buy_price: f64,
    pub buy_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SellTrade {
    pub sell_price: f64,
    pub sell_date: NaiveDate,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTrade {
    pub quantity: Option<u32>,
    pub buy_price: Option<f64>,
}
