use async_trait::async_trait;
use chrono::Utc;

use crate::external::quote_provider::{QuoteProvider, QuoteProviderError, SymbolQuote};

/// Offline provider for local development: derives a stable base price from
/// the symbol and jitters it a little per call, so repeated refreshes look
/// like a live feed without any API key.
pub struct MockProvider;

#[async_trait]
impl QuoteProvider for MockProvider {
    async fn fetch_quote(&self, symbol: &str) -> Result<SymbolQuote, QuoteProviderError> {
        let base = 20.0 + (symbol.bytes().map(u64::from).sum::<u64>() % 480) as f64;
        let price = base * (1.0 + (rand::random::<f64>() - 0.5) * 0.02);

        Ok(SymbolQuote {
            symbol: symbol.to_string(),
            price: (price * 100.0).round() / 100.0,
            as_of: Utc::now().date_naive(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn prices_stay_near_the_symbol_base() {
        let quote_a = MockProvider.fetch_quote("AAPL").await.unwrap();
        let quote_b = MockProvider.fetch_quote("AAPL").await.unwrap();
        assert!(quote_a.price > 0.0);
        // both draws jitter around the same base
        assert!((quote_a.price - quote_b.price).abs() / quote_a.price < 0.05);
    }
}
