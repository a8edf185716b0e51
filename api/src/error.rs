//! API error type and its JSON envelope

use agora_common::{ModerationError, RepositoryError};
use agora_forms::{FieldError, FormsError, PayloadError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::models::ApiResponse;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{} field(s) failed validation", .0.len())]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    InvalidDefinition(String),

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
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Validation(_) | Self::InvalidDefinition(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::InvalidDefinition(_) => "INVALID_FORM",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Internal(_) => "INTERNAL",
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Validation(errors) => serde_json::to_value(errors).ok(),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(code = self.code(), error = %self, "request rejected");
        }

        let mut body = ApiResponse::<()>::error(self.code(), &self.to_string());
        if let Some(error) = body.error.as_mut() {
            error.details = self.details();
        }
        (status, Json(body)).into_response()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(id) => Self::NotFound(format!("no record with id {id}")),
            RepositoryError::Conflict(id) => Self::Conflict(format!("record {id} already exists")),
            RepositoryError::StorageError(msg) => Self::Internal(msg),
        }
    }
}

impl From<ModerationError> for ApiError {
    fn from(err: ModerationError) -> Self {
        Self::Conflict(err.to_string())
    }
}

impl From<FormsError> for ApiError {
    fn from(err: FormsError) -> Self {
        match err {
            FormsError::FormClosed => Self::Conflict(err.to_string()),
            FormsError::InvalidDefinition(msg) => Self::InvalidDefinition(msg),
            // Stored columns are written by this service; unreadable JSON is ours.
            FormsError::Json(e) => Self::Internal(format!("stored form is unreadable: {e}")),
        }
    }
}

impl From<PayloadError> for ApiError {
    fn from(err: PayloadError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_common::ContentStatus;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::from(RepositoryError::NotFound("x".into())).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(ModerationError::NotApproved(ContentStatus::Pending)).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(PayloadError::Missing(vec!["title".into()])).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(FormsError::InvalidDefinition("dup".into())).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_validation_details() {
        let err = ApiError::Validation(vec![FieldError {
            field_id: "f1".into(),
            label: "Email".into(),
            message: "Email is required".into(),
        }]);
        let details = err.details().unwrap();
        assert_eq!(details[0]["fieldId"], "f1");
        assert_eq!(err.to_string(), "1 field(s) failed validation");
    }
}
