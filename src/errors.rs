use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::models::ScheduleError;
use crate::services::booking::BookingError;
use crate::services::validation::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("storage unavailable: {0}")]
    Storage(#[from] anyhow::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("that time slot was just booked by someone else, please pick another")]
    Conflict,

    #[error("invalid status change: {0}")]
    InvalidTransition(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized")]
    Unauthorized,
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Storage(_) => "storage_unavailable",
            AppError::Validation(e) => e.code(),
            AppError::Schedule(_) => "invalid_schedule_format",
            AppError::Conflict => "slot_unavailable",
            AppError::InvalidTransition(_) => "invalid_transition",
            AppError::BadRequest(_) => "bad_request",
            AppError::NotFound(_) => "not_found",
            AppError::Unauthorized => "unauthorized",
        }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Invalid(e) => AppError::Validation(e),
            BookingError::Conflict => AppError::Conflict,
            BookingError::UnknownService(id) => AppError::NotFound(format!("service {id}")),
            BookingError::NotFound(id) => AppError::NotFound(format!("booking {id}")),
            BookingError::InvalidTransition { from, to } => {
                AppError::InvalidTransition(format!("{} -> {}", from.as_str(), to.as_str()))
            }
            BookingError::Storage(e) => AppError::Storage(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Schedule(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict => StatusCode::CONFLICT,
            AppError::InvalidTransition(_) => StatusCode::CONFLICT,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
        };

        if status == StatusCode::SERVICE_UNAVAILABLE {
            tracing::error!(error = %self, "request failed on storage");
        }

        let body = serde_json::json!({ "error": self.to_string(), "code": self.code() });
        (status, axum::Json(body)).into_response()
    }
}
