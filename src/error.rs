use serde::Deserialize;
use thiserror::Error;

/// Failures surfaced by repositories and services.
///
/// Everything that crossed the network arrives as an [`ApiError`]; the other
/// variants never reach the wire.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("A create request is already in flight")]
    CreateInFlight,

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// Normalized record for every failure the backend or transport produced.
///
/// `status` is the HTTP status code, or 0 when no response was received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    pub status: u16,
    pub details: Vec<FieldDetail>,
}

impl ApiError {
    pub fn new(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            status,
            details: Vec::new(),
        }
    }

    /// No response was obtained from the backend.
    pub fn is_transport(&self) -> bool {
        self.status == 0
    }

    /// Authorization failure; the gateway clears the session on these.
    pub fn is_auth(&self) -> bool {
        self.status == 401
    }
}

/// One field-level validation message from an error body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldDetail {
    pub field: String,
    pub message: String,
}

pub type Result<T> = std::result::Result<T, AppError>;
