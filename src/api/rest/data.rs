//! Data query endpoint

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::api::websocket::AppState;
use crate::types::DataPoint;

/// Query parameters for GET /api/data
#[derive(Debug, Deserialize)]
pub struct DataParams {
    /// Exclusive lower bound (RFC3339); all data when absent
    pub since: Option<DateTime<Utc>>,
    /// Restrict to one event type
    #[serde(rename = "type")]
    pub event_type: Option<String>,
}

/// GET /api/data - Stored points after `since`, in insertion order
pub async fn get_data(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DataParams>,
) -> Json<Vec<DataPoint>> {
    let since = params.since.unwrap_or(DateTime::<Utc>::MIN_UTC);

    let points = match params.event_type.as_deref() {
        Some(event_type) => state.store.get_data_by_type(event_type, since),
        None => state.store.get_data(since),
    };

    Json(points)
}
