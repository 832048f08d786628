//! Maps heterogeneous transport and HTTP failures into one [`ApiError`]
//! shape. Total by construction: every input lands in some branch.

use serde::Deserialize;

use crate::error::{ApiError, FieldDetail};

/// Error bodies the backend is known to produce. Anything outside this set
/// takes the synthesized fallback.
#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Detail { detail: DetailField },
    Nested { error: NestedError },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DetailField {
    Message(String),
    Fields(Vec<FieldDetail>),
}

#[derive(Deserialize)]
struct NestedError {
    message: String,
    #[serde(default)]
    details: Vec<FieldDetail>,
}

/// No response was received; status 0 distinguishes these from HTTP failures.
pub fn transport_error(err: &reqwest::Error) -> ApiError {
    ApiError::new(err.to_string(), 0)
}

/// A response arrived with a failure status; pull a human-readable message
/// out of the body if one of the recognized shapes matches.
pub fn http_error(status: u16, body: &[u8]) -> ApiError {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(ErrorBody::Detail {
            detail: DetailField::Message(message),
        }) => ApiError::new(message, status),
        Ok(ErrorBody::Detail {
            detail: DetailField::Fields(details),
        }) => ApiError {
            message: format!("Error {status}"),
            status,
            details,
        },
        Ok(ErrorBody::Nested { error }) => ApiError {
            message: error.message,
            status,
            details: error.details,
        },
        Err(_) => ApiError::new(format!("Error {status}"), status),
    }
}

/// Fallback for shapes nothing else accounts for, e.g. a success status with
/// an undecodable body.
pub fn unknown_error() -> ApiError {
    ApiError::new("An unknown error occurred", 500)
}
