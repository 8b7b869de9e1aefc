//! # palaver-gateway
//!
//! The remote agent service boundary.
//!
//! The gateway exposes three request/response operations against a single
//! logical agent session: start a conversation, reply as the user, and reply
//! with tool results. Every operation returns an
//! [`AgentTurnResult`](palaver_common::AgentTurnResult) or fails with a
//! [`GatewayError`].
//!
//! [`HttpGateway`] is the production implementation, speaking JSON over HTTP
//! POST. The [`AgentGateway`] trait is the seam the orchestrator is written
//! against, which keeps turn logic testable with scripted in-memory gateways.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use palaver_common::{AgentTurnResult, ConversationId, ToolExecutionResult};

pub mod error;
pub mod http;

pub use error::GatewayError;
pub use http::HttpGateway;

/// The three operations of the remote agent protocol.
///
/// Implementations must be safe to share across tasks; the orchestrator holds
/// one gateway for the lifetime of a conversation.
#[async_trait]
pub trait AgentGateway: Send + Sync {
    /// Starts a new conversation with an initial user message.
    ///
    /// The response assigns the [`ConversationId`] for the session.
    ///
    /// # Errors
    ///
    /// Fails on transport errors, non-success statuses, or undecodable
    /// responses.
    async fn new_conversation(
        &self,
        message: &str,
        context: &HashMap<String, serde_json::Value>,
    ) -> Result<AgentTurnResult, GatewayError>;

    /// Continues an existing conversation with a user message.
    ///
    /// # Errors
    ///
    /// Fails on transport errors, non-success statuses, or undecodable
    /// responses.
    async fn reply_as_user(
        &self,
        conversation_id: &ConversationId,
        message: &str,
        context: &HashMap<String, serde_json::Value>,
    ) -> Result<AgentTurnResult, GatewayError>;

    /// Answers one round of tool calls with their execution results.
    ///
    /// `tool_outputs` must preserve the order of the tool calls that produced
    /// them; the gateway correlates replies positionally as well as by id.
    ///
    /// # Errors
    ///
    /// Fails on transport errors, non-success statuses, or undecodable
    /// responses.
    async fn reply_with_tool_results(
        &self,
        conversation_id: &ConversationId,
        tool_outputs: &[ToolExecutionResult],
    ) -> Result<AgentTurnResult, GatewayError>;
}

#[async_trait]
impl<G: AgentGateway + ?Sized> AgentGateway for Arc<G> {
    async fn new_conversation(
        &self,
        message: &str,
        context: &HashMap<String, serde_json::Value>,
    ) -> Result<AgentTurnResult, GatewayError> {
        (**self).new_conversation(message, context).await
    }

    async fn reply_as_user(
        &self,
        conversation_id: &ConversationId,
        message: &str,
        context: &HashMap<String, serde_json::Value>,
    ) -> Result<AgentTurnResult, GatewayError> {
        (**self).reply_as_user(conversation_id, message, context).await
    }

    async fn reply_with_tool_results(
        &self,
        conversation_id: &ConversationId,
        tool_outputs: &[ToolExecutionResult],
    ) -> Result<AgentTurnResult, GatewayError> {
        (**self)
            .reply_with_tool_results(conversation_id, tool_outputs)
            .await
    }
}
