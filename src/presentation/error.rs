// Error banners - every failure reaches the client as a dismissible JSON banner
use crate::application::errors::{ApiError, Banner, BannerLevel, ServiceError};
use crate::application::report_service::ReportError;
use crate::domain::session::SessionError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("{0}")]
    BadRequest(String),
}

fn session_status(error: &SessionError) -> StatusCode {
    match error {
        SessionError::NotAuthenticated => StatusCode::UNAUTHORIZED,
        SessionError::Forbidden(_) => StatusCode::FORBIDDEN,
    }
}

fn api_status(error: &ApiError) -> StatusCode {
    match error {
        ApiError::Session(e) => session_status(e),
        ApiError::Application { status, .. } if (400..500).contains(status) => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
        }
        ApiError::Network(_) | ApiError::Application { .. } | ApiError::Decode(_) => {
            StatusCode::BAD_GATEWAY
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Service(ServiceError::Api(e)) | AppError::Api(e) => api_status(e),
            AppError::Service(ServiceError::Session(e)) | AppError::Session(e) => session_status(e),
            AppError::Service(ServiceError::Invalid(_)) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Report(ReportError::InvalidQuery(_)) => StatusCode::BAD_REQUEST,
            AppError::Report(ReportError::Superseded | ReportError::PhaseConflict(_)) => StatusCode::CONFLICT,
            AppError::Report(ReportError::Session(e)) => session_status(e),
            AppError::Report(ReportError::Fetch(e)) => api_status(e),
            AppError::Report(ReportError::Export(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn banner(&self) -> Banner {
        let level = if self.status().is_client_error() {
            BannerLevel::Warning
        } else {
            BannerLevel::Error
        };
        Banner::new(level, self.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
        }
        (status, Json(self.banner())).into_response()
    }
}
