//! Error types shared by the dashboard components.

use crate::fleet::TimeRange;

/// Failure of a single backend request.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Network failure, timeout, or a body that could not be read.
    #[error("transient fetch error: {0}")]
    Transient(String),

    /// The backend answered with a non-success status.
    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The body did not decode or violated a data-model invariant.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl FetchError {
    /// Returns `true` for failures a later attempt may not repeat. Decides
    /// whether a failed poll is logged as a warning or an error.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Transient(_) => true,
            FetchError::Status { status, .. } => *status >= 500,
            FetchError::Malformed(_) => false,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FetchError::Malformed(e.to_string())
        } else {
            FetchError::Transient(e.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Malformed(e.to_string())
    }
}

/// Errors surfaced to the caller of a dashboard operation.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("statistics query for vehicle {vehicle_id} ({time_range}) failed: {source}")]
    QueryFailed {
        vehicle_id: u32,
        time_range: TimeRange,
        #[source]
        source: FetchError,
    },

    #[error("backend reset failed: {0}")]
    BackendResetFailure(#[source] FetchError),
}

pub type Result<T> = std::result::Result<T, DashboardError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid base url '{value}': {reason}")]
    InvalidUrl { value: String, reason: String },
    #[error("invalid value for {key}: '{value}'")]
    InvalidNumber { key: &'static str, value: String },
}
