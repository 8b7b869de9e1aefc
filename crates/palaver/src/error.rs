//! Error types for the orchestration core.
//!
//! Four failure kinds can end a turn (a missing tool, a failing tool, bad
//! tool arguments, and a failed gateway call) plus the two this crate adds
//! on top of the protocol: the round limit and cancellation. Every one of
//! them aborts the turn, clears the busy flag, and leaves history exactly as
//! the submission left it. None are used for normal control flow; tool-call
//! rounds are a planned branch, not an error path.

use thiserror::Error;

use palaver_gateway::GatewayError;

/// A rejected submission.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SubmitError {
    /// A turn is already in flight and the submit policy does not allow the
    /// new message.
    #[error("a turn is already in progress")]
    Busy,
}

/// A fatal turn failure.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TurnError {
    /// The agent requested a function with no registered handler.
    #[error("tool '{name}' is not registered")]
    ToolNotFound {
        /// The requested function name.
        name: String,
    },

    /// A handler returned an error.
    #[error("tool '{name}' failed: {source}")]
    ToolExecution {
        /// The function that failed.
        name: String,
        /// The handler's error.
        #[source]
        source: anyhow::Error,
    },

    /// A tool call's arguments were not valid JSON.
    #[error("arguments for tool '{name}' are not valid JSON: {source}")]
    ArgumentParse {
        /// The function whose arguments failed to parse.
        name: String,
        /// The parse error.
        #[source]
        source: serde_json::Error,
    },

    /// A gateway call failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The agent kept issuing tool-call rounds past the configured limit.
    #[error("turn exceeded the maximum of {max_rounds} tool-call rounds")]
    MaxRoundsExceeded {
        /// The configured round limit.
        max_rounds: u32,
    },

    /// The turn was cancelled through its [`CancelToken`](crate::CancelToken).
    #[error("turn was cancelled")]
    Cancelled,
}

/// Errors surfaced by the caller-facing [`Chat`](crate::Chat) handle.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChatError {
    /// The submission was rejected.
    #[error(transparent)]
    Submit(#[from] SubmitError),

    /// The turn failed after the submission was accepted.
    #[error(transparent)]
    Turn(#[from] TurnError),
}
