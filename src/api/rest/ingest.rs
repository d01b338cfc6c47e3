//! Ingestion endpoint

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::api::websocket::AppState;
use crate::event_store::EventStoreError;
use crate::types::Payload;

/// Request body for POST /api/ingest
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum IngestBody {
    Batch(Vec<Payload>),
    Single(Payload),
}

impl IngestBody {
    fn into_payloads(self) -> Vec<Payload> {
        match self {
            IngestBody::Batch(payloads) => payloads,
            IngestBody::Single(payload) => vec![payload],
        }
    }
}

/// Response for POST /api/ingest
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub status: String,
    pub stored: usize,
}

/// POST /api/ingest - Store payloads
///
/// Payloads are stored in order; a failure stops the batch and reports
/// how many were stored before it.
pub async fn ingest(
    State(state): State<Arc<AppState>>,
    body: Result<Json<IngestBody>, JsonRejection>,
) -> Result<Json<IngestResponse>, ApiError> {
    let Json(body) = body.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    let mut stored = 0;
    for payload in body.into_payloads() {
        match state.store.store(payload) {
            Ok(_) => stored += 1,
            Err(EventStoreError::Validation(msg)) => {
                return Err(ApiError::bad_request(format!(
                    "{} (stored {} before failure)",
                    msg, stored
                )));
            }
        }
    }

    Ok(Json(IngestResponse {
        status: "data received".to_string(),
        stored,
    }))
}
