use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Last known price for a symbol, as reported by an upstream quote API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolQuote {
    pub symbol: String,
    pub price: f64,
    pub as_of: NaiveDate,
}

#[derive(Debug, Error)]
pub enum QuoteProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("symbol not found: {0}")]
    NotFound(String),

    #[error("rate limited")]
    RateLimited,
}

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn fetch_quote(&self, symbol: &str) -> Result<SymbolQuote, QuoteProviderError>;
}

/// Shared HTTP client for the concrete providers. The request timeout bounds
/// every quote fetch; on expiry the fetch surfaces as a network failure and
/// the price cache degrades to its cached value.
pub(crate) fn build_client() -> reqwest::Client {
    let timeout_secs = std::env::var("QUOTE_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);

    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
