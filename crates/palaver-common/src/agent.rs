//! Wire types for the remote agent protocol.
//!
//! Every gateway operation returns an [`AgentTurnResult`]. Its message may
//! carry plain content, tool calls, or both; tool calls mean the turn is not
//! yet finished and the orchestrator owes the gateway a batch of
//! [`ToolExecutionResult`]s before the agent will continue.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::chat::ConversationId;

/// Why the agent stopped generating for this round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Generation completed naturally.
    Stop,
    /// Generation was truncated at the token limit.
    Length,
    /// The agent requested tool calls.
    ToolCalls,
    /// Generation was stopped by a content filter.
    ContentFilter,
    /// Any reason this client does not recognize.
    #[serde(other)]
    Other,
}

/// A function invocation requested by the agent.
///
/// `arguments` is the raw JSON text exactly as the agent produced it; it is
/// parsed only at execution time so malformed arguments fail the turn rather
/// than the decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// The tool name to look up in the registry.
    pub name: String,
    /// The arguments as a JSON string.
    #[serde(default)]
    pub arguments: String,
}

/// A complete agent-issued tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Gateway-assigned identifier; echoed back in the matching
    /// [`ToolExecutionResult`] so the agent can correlate replies.
    pub id: String,
    /// The type of call, "function" for every known gateway.
    #[serde(rename = "type", default = "function_call_type")]
    pub call_type: String,
    /// The function being invoked.
    pub function: FunctionCall,
}

fn function_call_type() -> String {
    "function".to_string()
}

impl ToolCall {
    /// Creates a function tool call.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            call_type: function_call_type(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

/// The message portion of an agent response.
///
/// `content` and `tool_calls` may co-occur: the agent can narrate while it
/// requests tools. The turn only terminates once a response carries no
/// unresolved tool calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentMessage {
    /// The speaking role as reported by the gateway, "assistant" in practice.
    pub role: String,
    /// Plain text content, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Tool calls to resolve, in the order the agent issued them.
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub tool_calls: SmallVec<[ToolCall; 2]>,
}

impl AgentMessage {
    /// An assistant message carrying only text.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: Some(content.into()),
            tool_calls: SmallVec::new(),
        }
    }

    /// An assistant message carrying tool calls and optional text.
    pub fn with_tool_calls(
        content: Option<String>,
        tool_calls: impl IntoIterator<Item = ToolCall>,
    ) -> Self {
        Self {
            role: "assistant".to_string(),
            content,
            tool_calls: tool_calls.into_iter().collect(),
        }
    }
}

/// The result of one gateway request/response cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentTurnResult {
    /// Why generation stopped for this round.
    pub finish_reason: FinishReason,
    /// The agent's message for this round.
    pub message: AgentMessage,
    /// The session identity; assigned on the first response and constant
    /// afterwards.
    pub conversation_id: ConversationId,
}

/// The outcome of executing one tool call, reported back to the gateway.
///
/// A batch of these answers one round of tool calls. The batch must preserve
/// the order of the originating [`ToolCall`]s, not handler completion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolExecutionResult {
    /// The id of the [`ToolCall`] this answers.
    pub tool_id: String,
    /// The function that was executed.
    pub function_name: String,
    /// The handler's JSON output.
    pub output: serde_json::Value,
}


#[cfg(test)]
mod proptests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn fuzz_turn_result_deserialization(data in prop::collection::vec(any::<u8>(), 0..1000)) {
            // Should not panic on arbitrary bytes.
            let _ = serde_json::from_slice::<AgentTurnResult>(&data);
        }

        #[test]
        fn tool_call_roundtrip(
            id in "[a-zA-Z0-9_-]{1,32}",
            name in "[a-zA-Z0-9_]{1,32}",
            arguments in ".*",
        ) {
            let call = ToolCall::new(id, name, arguments);
            let json = serde_json::to_string(&call).unwrap();
            let parsed: ToolCall = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(call, parsed);
        }

        #[test]
        fn tool_execution_result_roundtrip(
            tool_id in "[a-zA-Z0-9_-]{1,32}",
            function_name in "[a-zA-Z0-9_]{1,32}",
            hits in any::<i64>(),
        ) {
            let result = ToolExecutionResult {
                tool_id,
                function_name,
                output: serde_json::json!({ "hits": hits }),
            };
            let json = serde_json::to_string(&result).unwrap();
            let parsed: ToolExecutionResult = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(result, parsed);
        }
    }
}
