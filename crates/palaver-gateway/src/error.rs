//! Error types for gateway operations.

use serde::Deserialize;
use thiserror::Error;

/// Error body some gateways return alongside a non-success status.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    /// The error detail object.
    pub error: ErrorDetail,
}

/// Detailed error information from the gateway.
#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    /// Human-readable description of what went wrong.
    pub message: String,
}

/// A failed gateway call.
///
/// Every variant is fatal to the turn that issued the call; the orchestrator
/// never retries on its own.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// Network or HTTP transport failure (DNS, connect, socket, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The gateway answered with a non-success status.
    #[error("gateway returned status {status}: {message}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The error message extracted from the response body, or the raw
        /// body when it was not structured.
        message: String,
    },

    /// The response body could not be decoded as an `AgentTurnResult`.
    #[error("failed to decode gateway response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The gateway was misconfigured (bad base URL, missing credentials).
    #[error("gateway configuration error: {0}")]
    Configuration(String),
}
