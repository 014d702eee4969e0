use axum::Router;
use tower_http::cors::CorsLayer;

use crate::routes::{health, portfolio, prices, trades};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest("/api/trades", trades::router())
        .nest("/api/portfolio", portfolio::router())
        .nest("/api/prices", prices::router())
        // consumed by a browser front end
        .layer(CorsLayer::permissive())
        .with_state(state)
}
