use axum::{routing::get, Router};

use crate::state::AppState;

/// Health routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/", get(liveness))
}

/// GET / - Liveness probe
async fn liveness() -> &'static str {
    "/"
}
