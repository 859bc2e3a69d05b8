use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mint_api::v1::ErrorBody;

use crate::store::StoreError;

pub const UNEXPECTED_MESSAGE: &str = "Unexpected server error";
pub const NOT_FOUND_MESSAGE: &str = "Todo not found";

/// Everything a todo route can fail with.
///
/// Validation and not-found are reported precisely; anything else is logged
/// here and answered with a generic message.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("todo not found")]
    NotFound,

    #[error("unexpected error: {0}")]
    Unexpected(eyre::Report),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<eyre::Report> for ApiError {
    fn from(report: eyre::Report) -> Self {
        Self::Unexpected(report)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::NotFound,
            err => Self::Unexpected(eyre::Report::new(err)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match self {
            Self::Validation(message) => message,
            Self::NotFound => String::from(NOT_FOUND_MESSAGE),
            Self::Unexpected(report) => {
                tracing::error!("unexpected error: {:?}", report);
                String::from(UNEXPECTED_MESSAGE)
            }
        };

        (status, Json(ErrorBody::new(message))).into_response()
    }
}

/// Renders a trapped panic the same way as any other unexpected error.
pub fn panic_response(panic: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = match panic.downcast_ref::<&str>() {
        Some(detail) => detail.to_string(),
        None => match panic.downcast_ref::<String>() {
            Some(detail) => detail.clone(),
            None => String::from("unknown panic payload"),
        },
    };

    tracing::error!(%detail, "handler panicked");

    let body = ErrorBody::new(UNEXPECTED_MESSAGE);
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
