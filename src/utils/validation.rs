use regex::Regex;

use crate::errors::AppError;
use crate::models::{CreateTrade, SellTrade, UpdateTrade};

/// Ticker shape check: 1-10 uppercase letters/digits with an optional
/// `.XX` / `-XX` class or exchange suffix. Input is normalized (trimmed,
/// uppercased) before matching.
pub fn is_valid_symbol(symbol: &str) -> bool {
    let re = Regex::new(r"^[A-Z][A-Z0-9]{0,9}([.\-][A-Z0-9]{1,4})?$").unwrap();
    re.is_match(&symbol.trim().to_uppercase())
}

pub fn is_positive_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

pub fn validate_new_trade(data: &CreateTrade) -> Result<(), AppError> {
    if !is_valid_symbol(&data.symbol) {
        return Err(AppError::Validation(format!(
            "Invalid symbol: {:?}",
            data.symbol
        )));
    }
    if data.quantity == 0 {
        return Err(AppError::Validation(
            "Quantity must be a positive integer".to_string(),
        ));
    }
    if !is_positive_price(data.buy_price) {
        return Err(AppError::Validation(
            "Buy price must be a positive number".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_sell(data: &SellTrade) -> Result<(), AppError> {
    if !is_positive_price(data.sell_price) {
        return Err(AppError::Validation(
            "Sell price must be a positive number".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_update(data: &UpdateTrade) -> Result<(), AppError> {
    if let Some(quantity) = data.quantity {
        if quantity == 0 {
            return Err(AppError::Validation(
                "Quantity must be a positive integer".to_string(),
            ));
        }
    }
    if let Some(buy_price) = data.buy_price {
        if !is_positive_price(buy_price) {
            return Err(AppError::Validation(
                "Buy price must be a positive number".to_string(),
            ));
        }
    }
    Ok(())
}
