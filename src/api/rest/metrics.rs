//! Metrics endpoint

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::api::websocket::AppState;
use crate::types::Metrics;

/// GET /api/metrics - Current metrics snapshot
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> Json<Metrics> {
    Json(state.aggregator.get_metrics())
}
