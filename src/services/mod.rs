pub mod filter_service;
pub mod portfolio_service;
pub mod price_cache;
pub mod risk_service;
pub mod valuation_service;
