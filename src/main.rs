use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use tradelog_backend::app;
use tradelog_backend::external::alphavantage::AlphaVantageProvider;
use tradelog_backend::external::mock::MockProvider;
use tradelog_backend::external::multi_provider::MultiProvider;
use tradelog_backend::external::quote_provider::QuoteProvider;
use tradelog_backend::external::twelvedata::TwelveDataProvider;
use tradelog_backend::logging::{init_logging, LoggingConfig};
use tradelog_backend::services::price_cache::PriceCache;
use tradelog_backend::state::AppState;
use tradelog_backend::store::key_value::{FileStore, KeyValueStore, MemoryStore};
use tradelog_backend::store::trade_store::TradeStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    init_logging(LoggingConfig::from_env())?;

    let store: Arc<dyn KeyValueStore> = match std::env::var("TRADELOG_DATA_FILE") {
        Ok(path) => {
            info!("💾 Using file-backed store at {}", path);
            Arc::new(FileStore::open(path)?)
        }
        Err(_) => {
            info!("💾 TRADELOG_DATA_FILE not set, trades will not survive restarts");
            Arc::new(MemoryStore::new())
        }
    };

    // Select quote provider based on QUOTE_PROVIDER env var (defaults to mock)
    let provider_name = std::env::var("QUOTE_PROVIDER").unwrap_or_else(|_| "mock".to_string());

    let provider: Arc<dyn QuoteProvider> = match provider_name.to_lowercase().as_str() {
        "alphavantage" => {
            info!("📊 Using quote provider: Alpha Vantage");
            Arc::new(AlphaVantageProvider::from_env()?)
        }
        "twelvedata" => {
            info!("📊 Using quote provider: Twelve Data");
            Arc::new(TwelveDataProvider::from_env()?)
        }
        "multi" => {
            info!("📊 Using quote provider: Twelve Data with Alpha Vantage fallback");
            let primary = Box::new(TwelveDataProvider::from_env()?);
            let fallback = Box::new(AlphaVantageProvider::from_env()?);
            Arc::new(MultiProvider::new(primary, fallback))
        }
        "mock" => {
            info!("📊 Using quote provider: mock (no API keys required)");
            Arc::new(MockProvider)
        }
        other => anyhow::bail!(
            "Invalid QUOTE_PROVIDER: {}. Must be 'alphavantage', 'twelvedata', 'multi', or 'mock'",
            other
        ),
    };

    let ttl_secs = std::env::var("PRICE_CACHE_TTL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(300);

    let state = AppState {
        trades: Arc::new(TradeStore::new(store.clone())),
        prices: Arc::new(PriceCache::new(store, provider, ttl_secs)),
    };
    let app = app::create_app(state);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(&addr).await?;
    info!("🚀 tradelog backend running at http://{}/", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
