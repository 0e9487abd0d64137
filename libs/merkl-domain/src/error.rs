//! Domain errors for add operations
//!
//! Every failure the adder can surface is an [`AddError`]. Adapters convert
//! their infrastructure errors (S3, filesystem, multipart) into one of these
//! variants so callers never see backend-specific types.

use thiserror::Error;

use crate::cid::Cid;

/// Errors that can occur while adding content
#[derive(Error, Debug)]
pub enum AddError {
    /// The add parameters cannot be turned into a working configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The run was cancelled, or the adder has already been used
    #[error("Operation cancelled")]
    Cancelled,

    /// The file source or the DAG builder failed while adding a file
    #[error("Source error: {0}")]
    SourceFailure(String),

    /// Finalizing the DAG or the cluster root failed
    #[error("Finalize failed: {0}")]
    FinalizeFailure(String),

    /// The node store failed
    #[error("Storage operation failed: {0}")]
    StorageFailure(String),

    /// A node was requested that the store does not hold
    #[error("Node {0} not found")]
    NotFound(Cid),

    /// An unexpected internal error occurred
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Coarse classification of an [`AddError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Cancelled,
    Source,
    Finalize,
    Storage,
    Internal,
}

impl AddError {
    /// Create a config error with a message
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a source failure with a message
    pub fn source_failure(msg: impl Into<String>) -> Self {
        Self::SourceFailure(msg.into())
    }

    /// Create a finalize failure with a message
    pub fn finalize_failure(msg: impl Into<String>) -> Self {
        Self::FinalizeFailure(msg.into())
    }

    /// Create a storage failure with a message
    pub fn storage_failure(msg: impl Into<String>) -> Self {
        Self::StorageFailure(msg.into())
    }

    /// Create an internal error with a message
    pub fn internal_error(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigError(_) => ErrorKind::Config,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::SourceFailure(_) => ErrorKind::Source,
            Self::FinalizeFailure(_) => ErrorKind::Finalize,
            Self::StorageFailure(_) | Self::NotFound(_) => ErrorKind::Storage,
            Self::InternalError(_) => ErrorKind::Internal,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<std::io::Error> for AddError {
    fn from(err: std::io::Error) -> Self {
        Self::SourceFailure(err.to_string())
    }
}

/// Result type alias for add operations
pub type Result<T> = std::result::Result<T, AddError>;
