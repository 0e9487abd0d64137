//! Request handlers

pub mod add;
pub mod blocks;

use axum::http::StatusCode;
use merkl_domain::{AddError, ErrorKind};

/// HTTP status for a domain error
pub fn status_for(err: &AddError) -> StatusCode {
    match err.kind() {
        ErrorKind::Config | ErrorKind::Source => StatusCode::BAD_REQUEST,
        ErrorKind::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Storage if matches!(err, AddError::NotFound(_)) => StatusCode::NOT_FOUND,
        ErrorKind::Storage | ErrorKind::Finalize | ErrorKind::Internal => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
