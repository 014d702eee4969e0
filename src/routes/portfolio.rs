use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;

use crate::models::{PortfolioSnapshot, RiskMetrics, RiskRequest, SymbolPerformance};
use crate::routes::cached_price_map;
use crate::services::{portfolio_service, risk_service};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/summary", get(get_summary))
        .route("/symbols", get(get_symbol_performance))
        .route("/symbols/best", get(get_best_symbols))
        .route("/symbols/worst", get(get_worst_symbols))
        .route("/risk", post(compute_risk))
}

#[derive(Debug, Deserialize)]
pub struct RankingParams {
    pub limit: Option<usize>,
}

pub async fn get_summary(State(state): State<AppState>) -> Json<PortfolioSnapshot> {
    info!("GET /portfolio/summary - Aggregating portfolio");
    let trades = state.trades.list();
    let prices = cached_price_map(&state, &trades);
    Json(portfolio_service::aggregate(&trades, &prices))
}

pub async fn get_symbol_performance(
    State(state): State<AppState>,
) -> Json<Vec<SymbolPerformance>> {
    info!("GET /portfolio/symbols - Aggregating per-symbol performance");
    let trades = state.trades.list();
    let prices = cached_price_map(&state, &trades);
    Json(portfolio_service::aggregate_by_symbol(&trades, &prices))
}

pub async fn get_best_symbols(
    State(state): State<AppState>,
    Query(params): Query<RankingParams>,
) -> Json<Vec<SymbolPerformance>> {
    let limit = params.limit.unwrap_or(portfolio_service::DEFAULT_RANKING_LIMIT);
    info!("GET /portfolio/symbols/best - Top {} winners", limit);
    let trades = state.trades.list();
    let prices = cached_price_map(&state, &trades);
    let entries = portfolio_service::aggregate_by_symbol(&trades, &prices);
    Json(portfolio_service::best_performing(&entries, limit))
}

pub async fn get_worst_symbols(
    State(state): State<AppState>,
    Query(params): Query<RankingParams>,
) -> Json<Vec<SymbolPerformance>> {
    let limit = params.limit.unwrap_or(portfolio_service::DEFAULT_RANKING_LIMIT);
    info!("GET /portfolio/symbols/worst - Top {} losers", limit);
    let trades = state.trades.list();
    let prices = cached_price_map(&state, &trades);
    let entries = portfolio_service::aggregate_by_symbol(&trades, &prices);
    Json(portfolio_service::worst_performing(&entries, limit))
}

pub async fn compute_risk(Json(request): Json<RiskRequest>) -> Json<RiskMetrics> {
    info!(
        "POST /portfolio/risk - {} returns, {} values",
        request.returns.len(),
        request.values.len()
    );
    let market = request.market_returns.as_deref().unwrap_or(&[]);
    Json(RiskMetrics {
        volatility: risk_service::volatility(&request.returns),
        max_drawdown: risk_service::max_drawdown(&request.values),
        beta: risk_service::beta(&request.returns, market),
    })
}
