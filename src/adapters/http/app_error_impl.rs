use crate::app_error::{AppError, ErrorCode};
use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let message = self.to_string();

        let (status, message) = match self {
            AppError::Database(_) | AppError::Internal(_) => {
                // Log the details, don't expose them.
                tracing::error!(error = ?self, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
            AppError::DeliveryFailure(_) => {
                tracing::error!(error = ?self, "Request failed");
                (StatusCode::BAD_GATEWAY, None)
            }
            AppError::MemberNotFound | AppError::NotFound => (StatusCode::NOT_FOUND, Some(message)),
            AppError::MemberInactive => (StatusCode::FORBIDDEN, Some(message)),
            AppError::InvalidCode | AppError::CodeExpired | AppError::InvalidInput(_) => {
                (StatusCode::BAD_REQUEST, Some(message))
            }
            AppError::AlreadySignedIn | AppError::NoOpenVisit | AppError::DuplicateEmail => {
                (StatusCode::CONFLICT, Some(message))
            }
            AppError::NoActiveSession | AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, Some(message))
            }
        };

        if status.is_client_error() {
            tracing::warn!(code = code.as_str(), %status, "Request rejected");
        }
        error_resp(status, code, message)
    }
}

fn error_resp(status: StatusCode, code: ErrorCode, message: Option<String>) -> Response {
    let body = match message {
        Some(msg) => serde_json::json!({ "code": code.as_str(), "message": msg }),
        None => serde_json::json!({ "code": code.as_str() }),
    };
    (status, Json(body)).into_response()
}
