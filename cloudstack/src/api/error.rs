use serde::Deserialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Error body CloudStack returns alongside a non-200 status.
#[derive(Debug, Clone, Default, Deserialize, Error, PartialEq, Eq)]
#[error("CloudStack API error {errorcode} (CSExceptionErrorCode: {cserrorcode}): {errortext}")]
pub struct CsError {
    #[serde(default)]
    pub errorcode: i32,
    #[serde(default)]
    pub cserrorcode: i32,
    #[serde(default)]
    pub errortext: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    DecodeError(#[from] serde_json::Error),

    #[error("Failed to sign request: {0}")]
    Signing(String),

    #[error("Unable to extract the raw value from: {0}")]
    Envelope(String),

    #[error("{error} (HTTP {status})")]
    Api {
        status: u16,
        #[source]
        error: CsError,
    },

    #[error("{message}")]
    JobFailed {
        job_id: String,
        message: String,
        result: serde_json::Value,
    },

    #[error("Timeout while waiting for async job {job_id} to finish")]
    AsyncTimeout { job_id: String },

    #[error("Waiting for async job {job_id} was cancelled")]
    Cancelled { job_id: String },

    #[error("No match found for {0}")]
    NotFound(String),

    #[error("Could not find an exact match for {0}")]
    AmbiguousName(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// True when an async job did not finish within the configured wait.
    ///
    /// The job may still complete server-side; the carried job ID can be
    /// polled again later.
    pub fn is_async_timeout(&self) -> bool {
        matches!(self, ApiError::AsyncTimeout { .. })
    }

    /// The job ID attached to async failures, timeouts and cancellations.
    pub fn job_id(&self) -> Option<&str> {
        match self {
            ApiError::JobFailed { job_id, .. }
            | ApiError::AsyncTimeout { job_id }
            | ApiError::Cancelled { job_id } => Some(job_id),
            _ => None,
        }
    }
}
