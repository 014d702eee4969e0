use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::external::quote_provider::{
    build_client, QuoteProvider, QuoteProviderError, SymbolQuote,
};

pub struct TwelveDataProvider {
    client: reqwest::Client,
    api_key: String,
}

impl TwelveDataProvider {
    pub fn from_env() -> Result<Self, QuoteProviderError> {
        let api_key = std::env::var("TWELVEDATA_API_KEY")
            .map_err(|_| QuoteProviderError::BadResponse("TWELVEDATA_API_KEY not set".into()))?;

        Ok(Self {
            client: build_client(),
            api_key,
        })
    }
}

#[derive(Debug, Deserialize)]
struct TwelveDataQuoteResponse {
    symbol: Option<String>,
    close: Option<String>,
    datetime: Option<String>,

    // Error payloads look like { "code": 429, "message": "...", "status": "error" }
    status: Option<String>,
    code: Option<u32>,
    message: Option<String>,
}

#[async_trait]
impl QuoteProvider for TwelveDataProvider {
    async fn fetch_quote(&self, symbol: &str) -> Result<SymbolQuote, QuoteProviderError> {
        let url = "https://api.twelvedata.com/quote";

        let resp = self
            .client
            .get(url)
            .query(&[("symbol", symbol), ("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| QuoteProviderError::Network(e.to_string()))?;

        let body: TwelveDataQuoteResponse = resp
            .json()
            .await
            .map_err(|e| QuoteProviderError::Parse(e.to_string()))?;

        if body.status.as_deref() == Some("error") {
            return match body.code {
                Some(429) => Err(QuoteProviderError::RateLimited),
                Some(404) => Err(QuoteProviderError::NotFound(symbol.to_string())),
                _ => Err(QuoteProviderError::BadResponse(
                    body.message.unwrap_or_else(|| "unknown error".to_string()),
                )),
            };
        }

        let close = body
            .close
            .ok_or_else(|| QuoteProviderError::NotFound(symbol.to_string()))?;
        let price = close
            .parse::<f64>()
            .map_err(|e| QuoteProviderError::Parse(format!("close {:?}: {}", close, e)))?;

        // "datetime" is the last trading day, e.g. "2024-03-07"
        let as_of = body
            .datetime
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d.get(..10).unwrap_or(d), "%Y-%m-%d").ok())
            .unwrap_or_else(|| chrono::Utc::now().date_naive());

        Ok(SymbolQuote {
            symbol: body.symbol.unwrap_or_else(|| symbol.to_string()),
            price,
            as_of,
        })
    }
}
