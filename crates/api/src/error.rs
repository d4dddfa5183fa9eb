use alms_core::error::CoreError;
use alms_events::EmailError;
use alms_gateway::GatewayError;
use alms_storage::StorageError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and the errors of each outbound
/// integration. Implements [`IntoResponse`] to produce consistent JSON error
/// responses of the form `{ "error": ..., "code": ... }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `alms_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The payment gateway could not be reached or answered with an error.
    #[error("Payment gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// The gateway reports the transaction did not succeed.
    #[error("Payment {reference} was not successful (status: {status})")]
    PaymentNotSuccessful { reference: String, status: String },

    /// Object storage failure.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Email provider failure.
    #[error("Email error: {0}")]
    Email(#[from] EmailError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A lookup by something other than a numeric id found nothing.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Core(CoreError::Validation(describe_validation_errors(&errors)))
    }
}

/// Flatten field errors into `field: message; field: message`, sorted by
/// field name so the output is stable.
fn describe_validation_errors(errors: &validator::ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let messages: Vec<String> = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            format!("{field}: {}", messages.join(", "))
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal()
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- Outbound integrations ---
            AppError::Gateway(err) => {
                tracing::error!(error = %err, "Payment gateway error");
                (
                    StatusCode::BAD_GATEWAY,
                    "GATEWAY_ERROR",
                    "The payment provider could not be reached. Please try again.".to_string(),
                )
            }
            AppError::PaymentNotSuccessful { status, .. } => (
                StatusCode::PAYMENT_REQUIRED,
                "PAYMENT_NOT_SUCCESSFUL",
                format!("Payment was not successful (status: {status})"),
            ),
            AppError::Storage(err) => {
                tracing::error!(error = %err, "Storage error");
                (
                    StatusCode::BAD_GATEWAY,
                    "STORAGE_ERROR",
                    "The file could not be retrieved from storage".to_string(),
                )
            }
            AppError::Email(err) => match err {
                EmailError::Address(e) => (
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    format!("Invalid email address: {e}"),
                ),
                other => {
                    tracing::error!(error = %other, "Email delivery error");
                    (
                        StatusCode::BAD_GATEWAY,
                        "EMAIL_ERROR",
                        "The email could not be sent".to_string(),
                    )
                }
            },

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            internal()
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}
