pub mod key_value;
pub mod trade_store;
