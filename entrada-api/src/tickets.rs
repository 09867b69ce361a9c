use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use entrada_ticket::models::Ticket;
use entrada_ticket::search::UsageTally;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteTicketResponse {
    pub deleted: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/tickets", get(list_tickets))
        .route("/v1/tickets/search", get(search_tickets))
        .route("/v1/tickets/summary", get(ticket_summary))
        .route("/v1/tickets/{id}", get(get_ticket).delete(delete_ticket))
        .route("/v1/customers/{email}/tickets", get(customer_tickets))
}

/// GET /v1/tickets
async fn list_tickets(State(state): State<AppState>) -> Result<Json<Vec<Ticket>>, AppError> {
    Ok(Json(state.store.list_tickets().await?))
}

/// GET /v1/tickets/search?q=term
async fn search_tickets(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Ticket>>, AppError> {
    Ok(Json(state.store.search(&query.q).await?))
}

/// GET /v1/tickets/summary
async fn ticket_summary(State(state): State<AppState>) -> Result<Json<UsageTally>, AppError> {
    Ok(Json(state.store.usage_tally().await?))
}

/// GET /v1/tickets/:id
async fn get_ticket(
    State(state): State<AppState>,
    Path(ticket_id): Path<String>,
) -> Result<Json<Ticket>, AppError> {
    state
        .store
        .get_ticket(&ticket_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Ticket not found: {}", ticket_id)))
}

/// DELETE /v1/tickets/:id
///
/// Deleting an absent ticket is a reported outcome, not a 404.
async fn delete_ticket(
    State(state): State<AppState>,
    Path(ticket_id): Path<String>,
) -> Result<Json<DeleteTicketResponse>, AppError> {
    let deleted = state.store.delete_ticket(&ticket_id).await?;
    Ok(Json(DeleteTicketResponse { deleted }))
}

/// GET /v1/customers/:email/tickets
async fn customer_tickets(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Vec<Ticket>>, AppError> {
    Ok(Json(state.store.tickets_for_customer(&email).await?))
}
