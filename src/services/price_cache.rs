use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::external::quote_provider::QuoteProvider;
use crate::store::key_value::KeyValueStore;

pub const DEFAULT_CHUNK_SIZE: usize = 5;
pub const DEFAULT_CHUNK_DELAY: Duration = Duration::from_millis(200);

const CACHE_KEY_PREFIX: &str = "price:";

/// Envelope persisted per symbol in the key/value store.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedPrice {
    value: f64,
    timestamp: DateTime<Utc>,
    ttl_secs: i64,
}

impl CachedPrice {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        (now - self.timestamp).num_seconds() > self.ttl_secs
    }
}

/// TTL price cache layered over the key/value store, consulted before any
/// upstream quote fetch. Expired entries are checked lazily on read and kept
/// around as the degraded fallback when a refresh fails.
pub struct PriceCache {
    store: Arc<dyn KeyValueStore>,
    provider: Arc<dyn QuoteProvider>,
    ttl_secs: i64,
    chunk_size: usize,
    chunk_delay: Duration,
}

fn normalize(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

fn cache_key(symbol: &str) -> String {
    format!("{}{}", CACHE_KEY_PREFIX, symbol)
}

impl PriceCache {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        provider: Arc<dyn QuoteProvider>,
        ttl_secs: i64,
    ) -> Self {
        Self {
            store,
            provider,
            ttl_secs,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_delay: DEFAULT_CHUNK_DELAY,
        }
    }

    /// Override the batch tunables (outbound concurrency bound and the pause
    /// between chunks).
    pub fn with_chunking(mut self, chunk_size: usize, chunk_delay: Duration) -> Self {
        self.chunk_size = chunk_size.max(1);
        self.chunk_delay = chunk_delay;
        self
    }

    /// Price for one symbol. A fresh cache entry answers without I/O; on
    /// miss, expiry, or `force_refresh` a single upstream fetch runs. A
    /// failed fetch falls back to the last cached value even when expired,
    /// or `None` if the symbol was never cached.
    pub async fn get_price(&self, symbol: &str, force_refresh: bool) -> Option<f64> {
        let symbol = normalize(symbol);
        if symbol.is_empty() {
            return None;
        }

        let cached = self.read_entry(&symbol);
        if !force_refresh {
            if let Some(entry) = &cached {
                if !entry.is_expired(Utc::now()) {
                    debug!("Price cache hit for {}", symbol);
                    return Some(entry.value);
                }
            }
        }

        match self.provider.fetch_quote(&symbol).await {
            Ok(quote) => {
                self.write_entry(&symbol, quote.price);
                Some(quote.price)
            }
            Err(e) => match cached {
                Some(entry) => {
                    warn!(
                        "Quote fetch failed for {} ({}); serving last cached price",
                        symbol, e
                    );
                    Some(entry.value)
                }
                None => {
                    warn!("Quote fetch failed for {} ({}); no cached price", symbol, e);
                    None
                }
            },
        }
    }

    /// Batch lookup with bounded outbound concurrency. Symbols already
    /// satisfied by the cache never reach the network; the rest are fetched
    /// in fixed-size chunks, concurrently within a chunk, with a fixed pause
    /// between chunks. One symbol's failure never aborts the batch; symbols
    /// with no price at all are simply absent from the result map.
    pub async fn get_batch_prices(
        &self,
        symbols: &[String],
        force_refresh: bool,
    ) -> HashMap<String, f64> {
        let mut result = HashMap::new();
        let mut to_fetch: Vec<String> = Vec::new();
        let mut seen = HashSet::new();
        let now = Utc::now();

        for raw in symbols {
            let symbol = normalize(raw);
            if symbol.is_empty() || !seen.insert(symbol.clone()) {
                continue;
            }

            if !force_refresh {
                if let Some(entry) = self.read_entry(&symbol) {
                    if !entry.is_expired(now) {
                        result.insert(symbol, entry.value);
                        continue;
                    }
                }
            }
            to_fetch.push(symbol);
        }

        let mut chunks = to_fetch.chunks(self.chunk_size).peekable();
        while let Some(chunk) = chunks.next() {
            let lookups = chunk.iter().map(|symbol| self.get_price(symbol, true));
            for (symbol, price) in chunk.iter().zip(join_all(lookups).await) {
                match price {
                    Some(price) => {
                        result.insert(symbol.clone(), price);
                    }
                    None => info!("No price available for {} in batch lookup", symbol),
                }
            }

            if chunks.peek().is_some() {
                sleep(self.chunk_delay).await;
            }
        }

        result
    }

    /// Cache-only read, no I/O. An expired entry reads as `None`.
    pub fn get_cached_price(&self, symbol: &str) -> Option<f64> {
        let entry = self.read_entry(&normalize(symbol))?;
        if entry.is_expired(Utc::now()) {
            return None;
        }
        Some(entry.value)
    }

    /// Drop one symbol's entry, or every price entry when `symbol` is `None`.
    pub fn invalidate(&self, symbol: Option<&str>) {
        match symbol {
            Some(symbol) => self.store.remove(&cache_key(&normalize(symbol))),
            None => {
                for key in self.store.keys() {
                    if key.starts_with(CACHE_KEY_PREFIX) {
                        self.store.remove(&key);
                    }
                }
            }
        }
    }

    fn read_entry(&self, symbol: &str) -> Option<CachedPrice> {
        let raw = self.store.get(&cache_key(symbol))?;
        match serde_json::from_str(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Discarding unreadable cache entry for {}: {}", symbol, e);
                None
            }
        }
    }

    fn write_entry(&self, symbol: &str, value: f64) {
        let entry = CachedPrice {
            value,
            timestamp: Utc::now(),
            ttl_secs: self.ttl_secs,
        };
        match serde_json::to_string(&entry) {
            Ok(raw) => {
                if let Err(e) = self.store.set(&cache_key(symbol), &raw) {
                    error!("Failed to persist price for {}: {}", symbol, e);
                }
            }
            Err(e) => error!("Failed to serialize price entry for {}: {}", symbol, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::quote_provider::{QuoteProviderError, SymbolQuote};
    use crate::store::key_value::MemoryStore;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Provider that records every fetch and can fail selected symbols.
    struct ScriptedProvider {
        price: f64,
        failing: HashSet<String>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn new(price: f64) -> Self {
            Self {
                price,
                failing: HashSet::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(mut self, symbols: &[&str]) -> Self {
            self.failing = symbols.iter().map(|s| s.to_string()).collect();
            self
        }

        fn call_count(&self) -> usize {
            self.calls.lock().len()
        }
    }

    #[async_trait]
    impl QuoteProvider for ScriptedProvider {
        async fn fetch_quote(&self, symbol: &str) -> Result<SymbolQuote, QuoteProviderError> {
            self.calls.lock().push(symbol.to_string());
            if self.failing.contains(symbol) {
                return Err(QuoteProviderError::NotFound(symbol.to_string()));
            }
            Ok(SymbolQuote {
                symbol: symbol.to_string(),
                price: self.price,
                as_of: Utc::now().date_naive(),
            })
        }
    }

    fn cache_with(provider: Arc<ScriptedProvider>, ttl_secs: i64) -> PriceCache {
        PriceCache::new(Arc::new(MemoryStore::new()), provider, ttl_secs)
            .with_chunking(DEFAULT_CHUNK_SIZE, Duration::ZERO)
    }

    fn seed_entry(cache: &PriceCache, symbol: &str, value: f64, age_secs: i64, ttl_secs: i64) {
        let entry = CachedPrice {
            value,
            timestamp: Utc::now() - chrono::Duration::seconds(age_secs),
            ttl_secs,
        };
        cache
            .store
            .set(&cache_key(symbol), &serde_json::to_string(&entry).unwrap())
            .unwrap();
    }

    #[tokio::test]
    async fn fresh_entry_answers_without_io() {
        let provider = Arc::new(ScriptedProvider::new(101.5));
        let cache = cache_with(provider.clone(), 300);

        assert_eq!(cache.get_price("aapl", false).await, Some(101.5));
        assert_eq!(provider.call_count(), 1);

        // second read within TTL is served from the cache
        assert_eq!(cache.get_price("AAPL", false).await, Some(101.5));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn force_refresh_always_fetches() {
        let provider = Arc::new(ScriptedProvider::new(101.5));
        let cache = cache_with(provider.clone(), 300);

        cache.get_price("AAPL", false).await;
        cache.get_price("AAPL", true).await;
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn expired_entry_triggers_refetch() {
        let provider = Arc::new(ScriptedProvider::new(200.0));
        let cache = cache_with(provider.clone(), 60);
        seed_entry(&cache, "AAPL", 150.0, 61, 60);

        assert_eq!(cache.get_price("AAPL", false).await, Some(200.0));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn failed_fetch_falls_back_to_stale_value() {
        let provider = Arc::new(ScriptedProvider::new(0.0).failing(&["AAPL"]));
        let cache = cache_with(provider, 60);
        seed_entry(&cache, "AAPL", 150.0, 999, 60);

        assert_eq!(cache.get_price("AAPL", false).await, Some(150.0));
    }

    #[tokio::test]
    async fn failed_fetch_without_cache_is_none() {
        let provider = Arc::new(ScriptedProvider::new(0.0).failing(&["AAPL"]));
        let cache = cache_with(provider, 60);

        assert_eq!(cache.get_price("AAPL", false).await, None);
    }

    #[tokio::test]
    async fn cached_read_never_does_io_and_respects_expiry() {
        let provider = Arc::new(ScriptedProvider::new(0.0));
        let cache = cache_with(provider.clone(), 60);

        assert_eq!(cache.get_cached_price("AAPL"), None);

        seed_entry(&cache, "AAPL", 150.0, 10, 60);
        assert_eq!(cache.get_cached_price("AAPL"), Some(150.0));

        seed_entry(&cache, "MSFT", 300.0, 61, 60);
        assert_eq!(cache.get_cached_price("MSFT"), None);

        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn batch_skips_cache_satisfied_symbols() {
        let provider = Arc::new(ScriptedProvider::new(42.0));
        let cache = cache_with(provider.clone(), 300);
        seed_entry(&cache, "AAPL", 150.0, 10, 300);

        let symbols = vec!["AAPL".to_string(), "MSFT".to_string(), "aapl".to_string()];
        let prices = cache.get_batch_prices(&symbols, false).await;

        assert_eq!(prices.len(), 2);
        assert_eq!(prices["AAPL"], 150.0);
        assert_eq!(prices["MSFT"], 42.0);
        // only MSFT went upstream; the duplicate AAPL was collapsed
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn failing_symbol_does_not_abort_later_chunks() {
        // 12 symbols with chunk size 5 issue 3 chunks; SYM06 sits in chunk 2
        let symbols: Vec<String> = (1..=12).map(|i| format!("SYM{:02}", i)).collect();
        let provider = Arc::new(ScriptedProvider::new(10.0).failing(&["SYM06"]));
        let cache = cache_with(provider.clone(), 300);

        let prices = cache.get_batch_prices(&symbols, false).await;

        assert_eq!(prices.len(), 11);
        assert!(!prices.contains_key("SYM06"));
        // chunk 3 still ran
        assert!(prices.contains_key("SYM11"));
        assert!(prices.contains_key("SYM12"));
        assert_eq!(provider.call_count(), 12);
    }

    #[tokio::test]
    async fn chunks_are_issued_strictly_in_order() {
        let symbols: Vec<String> = (1..=12).map(|i| format!("SYM{:02}", i)).collect();
        let provider = Arc::new(ScriptedProvider::new(10.0));
        let cache = cache_with(provider.clone(), 300);

        cache.get_batch_prices(&symbols, false).await;

        let calls = provider.calls.lock();
        let position = |s: &str| calls.iter().position(|c| c == s).unwrap();
        // every chunk-1 symbol settles before any chunk-3 symbol is issued
        for early in 1..=5 {
            for late in 11..=12 {
                assert!(position(&format!("SYM{:02}", early)) < position(&format!("SYM{:02}", late)));
            }
        }
    }

    #[tokio::test]
    async fn invalidate_one_and_all() {
        let provider = Arc::new(ScriptedProvider::new(0.0));
        let cache = cache_with(provider, 300);
        seed_entry(&cache, "AAPL", 1.0, 0, 300);
        seed_entry(&cache, "MSFT", 2.0, 0, 300);
        cache.store.set("tradelog:trades", "[]").unwrap();

        cache.invalidate(Some("aapl"));
        assert_eq!(cache.get_cached_price("AAPL"), None);
        assert_eq!(cache.get_cached_price("MSFT"), Some(2.0));

        cache.invalidate(None);
        assert_eq!(cache.get_cached_price("MSFT"), None);
        // unrelated keys survive a full invalidation
        assert_eq!(cache.store.get("tradelog:trades").as_deref(), Some("[]"));
    }
}
