//! Custom Axum extractors for request authentication and validation.
//!
//! Provides:
//! - `ApiToken` — verifies the `Authorization: Bearer` header against the
//!   configured API token.
//! - `ValidatedCallEvent` — deserializes and validates the JSON request
//!   body into a [`CallEvent`].

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Request},
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use callwire_core::call_event::CallEvent;
use serde_json::json;

use crate::api::validation::{self, ValidationError};
use crate::state::AppState;

/// Maximum accepted request body size. Call events are tiny; anything
/// larger is garbage.
const MAX_BODY_BYTES: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// ApiToken — bearer-token authentication
// ---------------------------------------------------------------------------

/// An Axum extractor that verifies the bearer token sent by the
/// signaling server. The comparison is constant-time.
pub struct ApiToken;

/// Errors returned by the [`ApiToken`] extractor.
#[derive(Debug)]
pub enum ApiTokenError {
    MissingOrInvalid,
}

impl IntoResponse for ApiTokenError {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Unauthorized. Invalid or missing API token." })),
        )
            .into_response()
    }
}

impl FromRequestParts<AppState> for ApiToken {
    type Rejection = ApiTokenError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(ApiTokenError::MissingOrInvalid)?;

        let config = state.config().await;
        ring::constant_time::verify_slices_are_equal(
            token.as_bytes(),
            config.auth.token_bytes(),
        )
        .map_err(|_| ApiTokenError::MissingOrInvalid)?;
        drop(config);

        Ok(ApiToken)
    }
}

// ---------------------------------------------------------------------------
// ValidatedCallEvent — JSON body deserialization + validation
// ---------------------------------------------------------------------------

/// An Axum extractor that reads the JSON body and applies the request
/// validation rules before the event reaches the pipeline.
pub struct ValidatedCallEvent(pub CallEvent);

/// Errors returned by the [`ValidatedCallEvent`] extractor.
#[derive(Debug)]
pub enum CallEventRejection {
    BodyRead,
    Json(serde_json::Error),
    Validation(ValidationError),
}

impl IntoResponse for CallEventRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            CallEventRejection::BodyRead => (
                StatusCode::BAD_REQUEST,
                "failed to read request body".to_owned(),
            ),
            CallEventRejection::Json(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Invalid call event payload: {e}"),
            ),
            CallEventRejection::Validation(e) => {
                (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl FromRequest<AppState> for ValidatedCallEvent {
    type Rejection = CallEventRejection;

    async fn from_request(req: Request, _state: &AppState) -> Result<Self, Self::Rejection> {
        let body_bytes = axum::body::to_bytes(req.into_body(), MAX_BODY_BYTES)
            .await
            .map_err(|_| CallEventRejection::BodyRead)?;

        let event: CallEvent =
            serde_json::from_slice(&body_bytes).map_err(CallEventRejection::Json)?;

        validation::validate(&event).map_err(CallEventRejection::Validation)?;

        Ok(ValidatedCallEvent(event))
    }
}
