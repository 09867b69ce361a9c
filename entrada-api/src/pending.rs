use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use entrada_ticket::models::{PendingTicket, PurchaseRequest, Ticket};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/pending", get(list_pending).post(submit_pending))
        .route("/v1/pending/{id}/approve", post(approve_pending))
        .route("/v1/pending/{id}/reject", post(reject_pending))
        .route(
            "/v1/pending/{id}/payment-proof",
            delete(delete_payment_proof),
        )
}

/// GET /v1/pending
async fn list_pending(
    State(state): State<AppState>,
) -> Result<Json<Vec<PendingTicket>>, AppError> {
    Ok(Json(state.store.list_pending().await?))
}

/// POST /v1/pending
///
/// Records a purchase request for later administrative review.
async fn submit_pending(
    State(state): State<AppState>,
    Json(request): Json<PurchaseRequest>,
) -> Result<(StatusCode, Json<PendingTicket>), AppError> {
    let pending = state.store.submit_pending(request).await?;
    Ok((StatusCode::CREATED, Json(pending)))
}

/// POST /v1/pending/:id/approve
///
/// Converts the request into its confirmed tickets and returns them.
async fn approve_pending(
    State(state): State<AppState>,
    Path(pending_id): Path<String>,
) -> Result<Json<Vec<Ticket>>, AppError> {
    Ok(Json(state.store.approve_pending(&pending_id).await?))
}

/// POST /v1/pending/:id/reject
async fn reject_pending(
    State(state): State<AppState>,
    Path(pending_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.store.reject_pending(&pending_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /v1/pending/:id/payment-proof
async fn delete_payment_proof(
    State(state): State<AppState>,
    Path(pending_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.store.clear_payment_proof(&pending_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
