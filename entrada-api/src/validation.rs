use axum::{extract::State, routing::post, Json, Router};
use entrada_ticket::models::{Ticket, Verdict};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    pub ticket_id: String,
}

/// A scan outcome is data, never an HTTP error: the response is 200
/// whether or not the ticket was admitted, and callers branch on `status`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub valid: bool,
    pub status: Verdict,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket: Option<Ticket>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/validate", post(validate_ticket))
}

/// POST /v1/validate
async fn validate_ticket(
    State(state): State<AppState>,
    Json(request): Json<ValidateRequest>,
) -> Result<Json<ValidateResponse>, AppError> {
    let validation = state.store.validate_ticket(&request.ticket_id).await?;
    tracing::info!(
        ticket_id = %request.ticket_id,
        verdict = ?validation.verdict,
        "Ticket scan"
    );

    Ok(Json(ValidateResponse {
        valid: validation.valid(),
        message: validation.verdict.message().to_string(),
        status: validation.verdict,
        ticket: validation.ticket,
    }))
}
