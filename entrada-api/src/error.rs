use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use entrada_store::StoreError;
use entrada_ticket::registry::RegistryError;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match &err {
            StoreError::Registry(RegistryError::PendingNotFound(_)) => {
                AppError::NotFound(err.to_string())
            }
            StoreError::Registry(RegistryError::EmptyRequest) => {
                AppError::BadRequest(err.to_string())
            }
            // Tag exhaustion and snapshot failures are server-side faults
            _ => AppError::Internal(err.to_string()),
        }
    }
}
