//! Error types for maintenance-desk
//!
//! Gateway calls fail with `RequestFailed`. Controllers translate that into
//! `FetchFailed` (reads) or `ActionFailed` (mutations) before handing it to
//! the UI layer, which logs the former and alerts on the latter.

use thiserror::Error;

/// Application-wide error type
#[derive(Debug, Error)]
pub enum AppError {
    /// A single backend round trip failed (transport, HTTP status or body)
    #[error("{method} {path} failed: {reason}")]
    RequestFailed {
        method: String,
        path: String,
        reason: String,
    },

    /// A read on behalf of a screen failed
    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    /// A mutating action failed; state was left untouched
    #[error("Action failed: {0}")]
    ActionFailed(String),

    /// Required input missing; nothing was sent
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Action is not in the permitted set for this ticket and role
    #[error("Action {action} is not permitted while ticket is {status}")]
    ActionNotPermitted { action: String, status: String },

    /// The owning screen went away before the work finished
    #[error("Operation cancelled")]
    Cancelled,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local token storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Build a `RequestFailed` for the given call
    pub fn request_failed(
        method: &http::Method,
        path: &str,
        reason: impl std::fmt::Display,
    ) -> Self {
        AppError::RequestFailed {
            method: method.to_string(),
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Reclassify a gateway failure as a read failure
    pub fn into_fetch_failed(self) -> Self {
        match self {
            AppError::RequestFailed { .. } => AppError::FetchFailed(self.to_string()),
            other => other,
        }
    }

    /// Reclassify a gateway failure as a failed user action
    pub fn into_action_failed(self) -> Self {
        match self {
            AppError::RequestFailed { .. } => AppError::ActionFailed(self.to_string()),
            other => other,
        }
    }

    /// Short machine-readable label, used for metrics and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::RequestFailed { .. } => "request_failed",
            AppError::FetchFailed(_) => "fetch_failed",
            AppError::ActionFailed(_) => "action_failed",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::ActionNotPermitted { .. } => "action_not_permitted",
            AppError::Cancelled => "cancelled",
            AppError::Config(_) => "config",
            AppError::Storage(_) => "storage",
            AppError::Internal(_) => "internal",
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
