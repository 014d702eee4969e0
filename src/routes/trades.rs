use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::{CreateTrade, FilteredTrades, SellTrade, Trade, TradeFilter, UpdateTrade};
use crate::routes::cached_price_map;
use crate::services::filter_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_trade).get(list_trades).delete(clear_trades))
        .route("/:id", get(get_trade).put(update_trade).delete(delete_trade))
        .route("/:id/sell", post(sell_trade))
}

pub async fn create_trade(
    State(state): State<AppState>,
    Json(data): Json<CreateTrade>,
) -> Result<(StatusCode, Json<Trade>), AppError> {
    info!("POST /trades - Recording buy for {}", data.symbol);
    let trade = state.trades.insert(data).map_err(|e| {
        error!("Failed to record trade: {}", e);
        e
    })?;
    Ok((StatusCode::CREATED, Json(trade)))
}

pub async fn list_trades(
    State(state): State<AppState>,
    Query(filter): Query<TradeFilter>,
) -> Result<Json<FilteredTrades>, AppError> {
    info!("GET /trades - Listing trades");
    let trades = state.trades.list();
    let prices = cached_price_map(&state, &trades);
    let response = filter_service::filter_and_sort(&trades, &filter, &prices)?;
    Ok(Json(response))
}

pub async fn get_trade(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Trade>, AppError> {
    info!("GET /trades/{} - Fetching trade", id);
    let trade = state.trades.get(&id)?;
    Ok(Json(trade))
}

pub async fn update_trade(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(data): Json<UpdateTrade>,
) -> Result<Json<Trade>, AppError> {
    info!("PUT /trades/{} - Updating trade", id);
    let trade = state.trades.update(&id, data).map_err(|e| {
        error!("Failed to update trade {}: {}", id, e);
        e
    })?;
    Ok(Json(trade))
}

pub async fn sell_trade(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(data): Json<SellTrade>,
) -> Result<Json<Trade>, AppError> {
    info!("POST /trades/{}/sell - Recording sell", id);
    let trade = state.trades.record_sell(&id, data).map_err(|e| {
        error!("Failed to record sell for trade {}: {}", id, e);
        e
    })?;
    Ok(Json(trade))
}

pub async fn delete_trade(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    info!("DELETE /trades/{} - Deleting trade", id);
    state.trades.delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_trades(State(state): State<AppState>) -> StatusCode {
    info!("DELETE /trades - Clearing all trades");
    state.trades.clear();
    StatusCode::NO_CONTENT
}
