use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/refresh", post(refresh_prices))
        .route("/:symbol", get(get_price).delete(invalidate_symbol))
        .route("/:symbol/cached", get(get_cached_price))
        .route("/", delete(invalidate_all))
}

#[derive(Debug, Deserialize)]
pub struct PriceParams {
    #[serde(default)]
    pub force_refresh: bool,
}

#[derive(Debug, Deserialize)]
pub struct BatchPriceRequest {
    pub symbols: Vec<String>,
    #[serde(default)]
    pub force_refresh: bool,
}

#[derive(Debug, Serialize)]
pub struct PriceResponse {
    pub symbol: String,
    pub price: f64,
}

pub async fn get_price(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(params): Query<PriceParams>,
) -> Result<Json<PriceResponse>, AppError> {
    info!("GET /prices/{} - Getting price", symbol);
    let normalized = symbol.trim().to_uppercase();
    state
        .prices
        .get_price(&normalized, params.force_refresh)
        .await
        .map(|price| {
            Json(PriceResponse {
                symbol: normalized.clone(),
                price,
            })
        })
        .ok_or_else(|| AppError::NotFound(format!("No price available for {}", normalized)))
}

pub async fn get_cached_price(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<PriceResponse>, AppError> {
    info!("GET /prices/{}/cached - Cache-only read", symbol);
    let normalized = symbol.trim().to_uppercase();
    state
        .prices
        .get_cached_price(&normalized)
        .map(|price| {
            Json(PriceResponse {
                symbol: normalized.clone(),
                price,
            })
        })
        .ok_or_else(|| AppError::NotFound(format!("No cached price for {}", normalized)))
}

pub async fn refresh_prices(
    State(state): State<AppState>,
    Json(request): Json<BatchPriceRequest>,
) -> Json<HashMap<String, f64>> {
    info!(
        "POST /prices/refresh - Batch lookup for {} symbols",
        request.symbols.len()
    );
    let prices = state
        .prices
        .get_batch_prices(&request.symbols, request.force_refresh)
        .await;
    Json(prices)
}

pub async fn invalidate_symbol(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> StatusCode {
    info!("DELETE /prices/{} - Invalidating cache entry", symbol);
    state.prices.invalidate(Some(&symbol));
    StatusCode::NO_CONTENT
}

pub async fn invalidate_all(State(state): State<AppState>) -> StatusCode {
    info!("DELETE /prices - Invalidating price cache");
    state.prices.invalidate(None);
    StatusCode::NO_CONTENT
}
