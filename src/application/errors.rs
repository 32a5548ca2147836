// Error taxonomy shared by the repository seams and the services built on them
use crate::domain::session::SessionError;
use serde::Serialize;
use thiserror::Error;

const BANNER_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never completed
    #[error("network error: {0}")]
    Network(String),
    /// The backend answered with a non-success status
    #[error("{message}")]
    Application { status: u16, message: String },
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ApiError {
    /// The backend rejected the request itself (4xx)
    pub fn is_client_error(&self) -> bool {
        match self {
            ApiError::Application { status, .. } => (400..500).contains(status),
            ApiError::Session(_) => true,
            ApiError::Network(_) | ApiError::Decode(_) => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerLevel {
    Warning,
    Error,
}

/// User-facing failure notice; every error surface uses this shape
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Banner {
    pub level: BannerLevel,
    pub message: String,
    pub dismissible: bool,
    pub expires_in_ms: u64,
}

impl Banner {
    pub fn new(level: BannerLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            dismissible: true,
            expires_in_ms: BANNER_TIMEOUT_MS,
        }
    }
}

impl From<&ApiError> for Banner {
    fn from(error: &ApiError) -> Self {
        let level = if error.is_client_error() {
            BannerLevel::Warning
        } else {
            BannerLevel::Error
        };
        Banner::new(level, error.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("{0}")]
    Invalid(String),
}

/// Reject blank required text fields with a readable message
pub fn require_text(field: &str, value: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::Invalid(format!("{} must not be empty", field)));
    }
    Ok(())
}
