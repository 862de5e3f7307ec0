use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::auth::TokenError;
use crate::room_service::RoomServiceError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Room service error: {0}")]
    RoomService(#[from] RoomServiceError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::RoomService(RoomServiceError::Unreachable { .. }) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::RoomService(RoomServiceError::Rejected { .. })
            | AppError::RoomService(RoomServiceError::InvalidResponse(_)) => StatusCode::BAD_GATEWAY,
            AppError::RoomService(RoomServiceError::Credentials(_)) | AppError::Token(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match &self {
            AppError::BadRequest(msg) => msg.clone(),
            AppError::RoomService(e) => e.to_string(),
            AppError::Token(e) => e.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %error_message, "Request failed");
        }

        let body = Json(json!({
            "error": error_message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(format!("JSON error: {}", rejection.body_text()))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(RoomServiceError::Unreachable {
                url: "http://localhost:7880".into(),
                message: "connection refused".into(),
            })
            .status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::from(RoomServiceError::Rejected {
                method: "CreateRoom",
                code: "unauthenticated".into(),
                message: "invalid token".into(),
            })
            .status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::from(RoomServiceError::InvalidResponse("eof".into())).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::from(RoomServiceError::Credentials("empty secret".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
