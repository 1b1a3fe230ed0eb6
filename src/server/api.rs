//! Axum handlers for `/api/*` routes.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{error, warn};

use crate::explain::ExplanationRequest;

use super::ApiState;

/// Build a JSON error response body.
fn json_error(msg: impl std::fmt::Display) -> Json<serde_json::Value> {
    Json(json!({ "error": format!("{msg}") }))
}

/// GET /api/health — liveness only.
pub(super) async fn health() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

/// POST /api/explain
pub(super) async fn explain(
    State(state): State<ApiState>,
    body: Result<Json<ExplanationRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "rejected explain body");
            return (StatusCode::BAD_REQUEST, json_error(rejection.body_text())).into_response();
        }
    };

    match state.resolver.resolve(&req).await {
        Ok(explanation) => (StatusCode::OK, Json(explanation)).into_response(),
        Err(e) => {
            let status =
                StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            if status.is_server_error() {
                error!(interest = %req.interest, concept = %req.concept, %status, "explain failed: {e}");
            } else {
                warn!(interest = %req.interest, concept = %req.concept, %status, "explain rejected: {e}");
            }
            (status, json_error(e)).into_response()
        }
    }
}
