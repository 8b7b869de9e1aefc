//! # palaver-common
//!
//! Shared types for the palaver conversation orchestration library.
//!
//! This crate defines the two vocabularies the rest of the workspace speaks:
//!
//! - [`chat`]: the caller-visible conversation model, with [`ChatMessage`]
//!   history entries, the [`PendingMessage`] awaiting resolution, and the
//!   [`ConversationId`] assigned by the remote agent.
//! - [`agent`]: the wire protocol exchanged with the remote agent gateway,
//!   with [`AgentTurnResult`], [`AgentMessage`], [`ToolCall`], and
//!   [`ToolExecutionResult`].
//!
//! All wire types serialize in the camelCase shape the gateway protocol uses.

pub mod agent;
pub mod chat;

pub use agent::{
    AgentMessage, AgentTurnResult, FinishReason, FunctionCall, ToolCall, ToolExecutionResult,
};
pub use chat::{ChatMessage, Context, ConversationId, PendingMessage, Role};
