//! PDS gateway error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdsError {
    #[error("environment variable {0} is not set")]
    MissingEnvVar(String),

    #[error("XRPC call {nsid} failed ({status}): {error}: {message}")]
    Api {
        nsid: String,
        status: u16,
        /// XRPC error name (e.g. "InvalidSwap"); may be empty
        error: String,
        message: String,
    },

    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PdsError {
    /// Whether this is the service's "record does not exist" answer
    pub fn is_record_not_found(&self) -> bool {
        matches!(self, PdsError::Api { error, .. } if error == "RecordNotFound")
    }
}

pub type Result<T> = std::result::Result<T, PdsError>;
