//! Reconciliation engine error types

use thiserror::Error;

/// Errors produced by the reconciliation engine
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("secure random source unavailable: {0}")]
    RandomnessUnavailable(String),

    #[error("session token lacks full account privilege (scope: {0})")]
    PrivilegeInsufficient(String),

    #[error("session token is malformed: {0}")]
    TokenMalformed(String),

    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("state file error: {0}")]
    State(String),

    #[error("lock acquisition failed: {0}")]
    Lock(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors surfaced by a remote account gateway
///
/// Every remote call fails independently with one of these; the engine
/// decides per lifecycle phase whether a failure aborts the cycle or is
/// recorded and carried past.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The service understood the request and refused it
    #[error("service rejected the request: {0}")]
    Rejected(String),

    /// The request never completed (connection, TLS, timeout)
    #[error("transport error: {0}")]
    Transport(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// An optimistic-concurrency write lost the race
    #[error("version conflict: {0}")]
    VersionConflict(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Result alias for gateway operations
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;
