use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// API-level errors. Every variant renders as `{"detail": <message>}` so
/// clients can surface one string regardless of status code.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("internal error: {0}")]
    Internal(String),
    #[error("database error")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal(msg) => {
                tracing::error!("internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Database(err) => {
                tracing::error!("database error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn conflict_carries_detail_string() {
        let (status, body) = render(ApiError::Conflict("Seat(s) already booked: A1".into())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["detail"], "Seat(s) already booked: A1");
    }

    #[tokio::test]
    async fn database_errors_do_not_leak() {
        let (status, body) = render(ApiError::Database(sqlx::Error::PoolClosed)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], "Internal server error");
    }

    #[tokio::test]
    async fn statuses_match_variants() {
        assert_eq!(
            render(ApiError::BadRequest("x".into())).await.0,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            render(ApiError::Unauthorized("x".into())).await.0,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            render(ApiError::Forbidden("x".into())).await.0,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            render(ApiError::NotFound("x".into())).await.0,
            StatusCode::NOT_FOUND
        );
    }
}
