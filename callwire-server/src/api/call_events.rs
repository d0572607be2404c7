//! Call event API handlers.
//!
//! # Endpoints
//!
//! - `POST /call-events`                  – ingest one validated call event
//! - `GET  /call-events/{call_id}/latest` – audit lookup of the newest
//!   stored row for a call

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use callwire_core::ingest::{CallEventRepository, IngestError, StorageError};
use callwire_core::store::PostgresCallEventRepository;
use serde::Serialize;
use serde_json::json;

use crate::api::extractors::{ApiToken, ValidatedCallEvent};
use crate::state::AppState;

/// Build the call event API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/call-events", post(store_call_event))
        .route("/call-events/{call_id}/latest", get(latest_call_event))
}

#[derive(Serialize)]
struct StoreResponse {
    status: &'static str,
}

/// `POST /call-events` — persist the event and queue it for downstream
/// processing.
async fn store_call_event(
    State(state): State<AppState>,
    _auth: ApiToken,
    ValidatedCallEvent(event): ValidatedCallEvent,
) -> Result<impl IntoResponse, CallEventApiError> {
    let service = state.ingest_service().await;
    service.handle(&event).await?;
    Ok(Json(StoreResponse { status: "queued" }))
}

/// `GET /call-events/{call_id}/latest` — newest stored row for a call.
async fn latest_call_event(
    State(state): State<AppState>,
    _auth: ApiToken,
    Path(call_id): Path<String>,
) -> Result<impl IntoResponse, CallEventApiError> {
    let repository = PostgresCallEventRepository::new(state.db.clone());
    let record = repository
        .find_latest_by_call_id(&call_id)
        .await
        .map_err(CallEventApiError::Storage)?
        .ok_or(CallEventApiError::NotFound)?;
    Ok(Json(record))
}

/// Errors that can occur in call event API handlers.
#[derive(Debug)]
enum CallEventApiError {
    Ingest(IngestError),
    Storage(StorageError),
    NotFound,
}

impl From<IngestError> for CallEventApiError {
    fn from(err: IngestError) -> Self {
        Self::Ingest(err)
    }
}

impl IntoResponse for CallEventApiError {
    fn into_response(self) -> axum::response::Response {
        // Broker and storage failures both surface as a generic server
        // error but carry distinct log lines for operational triage.
        let (status, message) = match self {
            CallEventApiError::Ingest(IngestError::Broker(e)) => {
                tracing::error!(error = %e, "failed to queue call event");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to queue event. Please try again later.",
                )
            }
            CallEventApiError::Ingest(IngestError::Storage(e))
            | CallEventApiError::Storage(e) => {
                tracing::error!(error = %e, "call event storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred.",
                )
            }
            CallEventApiError::NotFound => (StatusCode::NOT_FOUND, "call event not found"),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
