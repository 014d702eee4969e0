use async_trait::async_trait;
use tracing::warn;

use crate::external::quote_provider::{QuoteProvider, QuoteProviderError, SymbolQuote};

/// Tries the primary provider first and falls back to the secondary on any
/// failure. Rate limiting on the primary is a normal fallback trigger; the
/// error the caller sees is always the fallback's.
pub struct MultiProvider {
    primary: Box<dyn QuoteProvider>,
    fallback: Box<dyn QuoteProvider>,
}

impl MultiProvider {
    pub fn new(primary: Box<dyn QuoteProvider>, fallback: Box<dyn QuoteProvider>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl QuoteProvider for MultiProvider {
    async fn fetch_quote(&self, symbol: &str) -> Result<SymbolQuote, QuoteProviderError> {
        match self.primary.fetch_quote(symbol).await {
            Ok(quote) => Ok(quote),
            Err(e) => {
                warn!(
                    "Primary quote provider failed for {} ({}), trying fallback",
                    symbol, e
                );
                self.fallback.fetch_quote(symbol).await
            }
        }
    }
}
