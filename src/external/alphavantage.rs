use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::external::quote_provider::{
    build_client, QuoteProvider, QuoteProviderError, SymbolQuote,
};

pub struct AlphaVantageProvider {
    client: reqwest::Client,
    api_key: String,
}

impl AlphaVantageProvider {
    pub fn from_env() -> Result<Self, QuoteProviderError> {
        let api_key = std::env::var("ALPHAVANTAGE_API_KEY")
            .map_err(|_| QuoteProviderError::BadResponse("ALPHAVANTAGE_API_KEY not set".into()))?;

        Ok(Self {
            client: build_client(),
            api_key,
        })
    }
}

#[derive(Debug, Deserialize)]
struct AvQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<AvGlobalQuote>,

    // When rate-limited Alpha Vantage returns:
    // { "Note": "Thank you for using Alpha Vantage! ... 5 calls per minute ..." }
    #[serde(rename = "Note")]
    note: Option<String>,

    // When invalid:
    // { "Error Message": "Invalid API call. ..." }
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AvGlobalQuote {
    #[serde(rename = "01. symbol", default)]
    symbol: String,
    #[serde(rename = "05. price", default)]
    price: String,
    #[serde(rename = "07. latest trading day", default)]
    latest_trading_day: String,
}

#[async_trait]
impl QuoteProvider for AlphaVantageProvider {
    async fn fetch_quote(&self, symbol: &str) -> Result<SymbolQuote, QuoteProviderError> {
        let url = "https://www.alphavantage.co/query";

        let resp = self
            .client
            .get(url)
            .query(&[
                ("function", "GLOBAL_QUOTE"),
                ("symbol", symbol),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| QuoteProviderError::Network(e.to_string()))?;

        let body: AvQuoteResponse = resp
            .json()
            .await
            .map_err(|e| QuoteProviderError::Parse(e.to_string()))?;

        if body.note.is_some() {
            return Err(QuoteProviderError::RateLimited);
        }
        if let Some(message) = body.error_message {
            return Err(QuoteProviderError::BadResponse(message));
        }

        // An unknown symbol comes back as an empty "Global Quote" object.
        let quote = body
            .global_quote
            .filter(|q| !q.price.is_empty())
            .ok_or_else(|| QuoteProviderError::NotFound(symbol.to_string()))?;

        let price = quote
            .price
            .parse::<f64>()
            .map_err(|e| QuoteProviderError::Parse(format!("price {:?}: {}", quote.price, e)))?;
        let as_of = NaiveDate::parse_from_str(&quote.latest_trading_day, "%Y-%m-%d").map_err(
            |e| QuoteProviderError::Parse(format!("date {:?}: {}", quote.latest_trading_day, e)),
        )?;

        Ok(SymbolQuote {
            symbol: if quote.symbol.is_empty() {
                symbol.to_string()
            } else {
                quote.symbol
            },
            price,
            as_of,
        })
    }
}
