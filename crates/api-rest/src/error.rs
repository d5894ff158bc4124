//! HTTP error mapping.
//!
//! Every handler error becomes an [`ApiError`], rendered as `{"error": "<message>"}` with the
//! matching status code. Internal failures are logged and answered with a generic message.

use api_shared::dto::ErrorRes;
use api_shared::TokenError;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use medvault_core::{RecordError, TextError};

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    fn internal(context: &str, err: &dyn std::fmt::Debug) -> Self {
        tracing::error!("{} error: {:?}", context, err);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorRes {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<RecordError> for ApiError {
    fn from(err: RecordError) -> Self {
        let status = match &err {
            RecordError::NotFound(_) => StatusCode::NOT_FOUND,
            RecordError::Expired | RecordError::AccessExhausted => StatusCode::GONE,
            RecordError::DownloadNotAllowed => StatusCode::FORBIDDEN,
            RecordError::InvalidScope(_)
            | RecordError::InvalidInput(_)
            | RecordError::Text(_) => StatusCode::BAD_REQUEST,
            RecordError::Conflict(_) => StatusCode::CONFLICT,
            RecordError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            RecordError::InvalidConfig(_)
            | RecordError::Database(_)
            | RecordError::Migration(_)
            | RecordError::Serialization(_)
            | RecordError::PasswordHash(_) => return Self::internal("Record store", &err),
        };
        Self::new(status, err.to_string())
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(_) => Self::internal("Token signing", &err),
            _ => Self::unauthorized(err.to_string()),
        }
    }
}

impl From<TextError> for ApiError {
    fn from(err: TextError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_error_status_mapping() {
        let cases = [
            (RecordError::NotFound("share link"), StatusCode::NOT_FOUND),
            (RecordError::Expired, StatusCode::GONE),
            (RecordError::AccessExhausted, StatusCode::GONE),
            (RecordError::DownloadNotAllowed, StatusCode::FORBIDDEN),
            (RecordError::InvalidScope("x".into()), StatusCode::BAD_REQUEST),
            (RecordError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (RecordError::Conflict("x".into()), StatusCode::CONFLICT),
            (RecordError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (
                RecordError::InvalidConfig("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = ApiError::from(RecordError::Database(sqlx_row_not_found()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Internal error");
    }

    fn sqlx_row_not_found() -> medvault_core::sqlx::Error {
        medvault_core::sqlx::Error::RowNotFound
    }

    #[test]
    fn test_token_errors_are_unauthorised() {
        assert_eq!(
            ApiError::from(TokenError::Expired).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(TokenError::Signing("bad key".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
