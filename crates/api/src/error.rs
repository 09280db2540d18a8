//! Error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde_json::json;
use tracing::error;

use rentbook_core::rents::RentsError;
use rentbook_shared::AppError;

/// Handler error rendered as `{ "error": code, "message": text }`.
#[derive(Debug, Clone)]
pub struct ApiError(pub AppError);

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<RentsError> for ApiError {
    fn from(err: RentsError) -> Self {
        Self(err.into())
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        Self(AppError::Database(err.to_string()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Backend details stay in the logs.
        let message = match &self.0 {
            AppError::Database(_) | AppError::Internal(_) => {
                error!(error = %self.0, "Request failed");
                "An error occurred".to_string()
            }
            other => other.to_string(),
        };

        (
            status,
            Json(json!({
                "error": self.0.error_code(),
                "message": message,
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rentbook_shared::types::PropertyId;
    use rstest::rstest;

    #[rstest]
    #[case(RentsError::PropertyNotInScope(PropertyId::new(1)), StatusCode::NOT_FOUND)]
    #[case(RentsError::Validation("bad".into()), StatusCode::BAD_REQUEST)]
    #[case(RentsError::query("timeout"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn test_rents_error_status(#[case] err: RentsError, #[case] status: StatusCode) {
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), status);
    }
}
