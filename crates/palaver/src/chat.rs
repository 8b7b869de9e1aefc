//! The caller-facing conversation handle.
//!
//! [`Chat`] bundles a gateway, a tool registry, and the conversation state
//! behind the surface the embedding application uses: submit a message,
//! observe history / busy / conversation id, and optionally cancel.

use log::error;
use typed_builder::TypedBuilder;

use palaver_common::{ChatMessage, Context, ConversationId};
use palaver_gateway::AgentGateway;
use palaver_tools::ToolRegistry;

use crate::cancel::CancelToken;
use crate::error::ChatError;
use crate::orchestrator::{Orchestrator, DEFAULT_MAX_ROUNDS};
use crate::state::{StateCell, SubmitPolicy};

/// Whether turn failures reach the caller.
///
/// The default is [`Surface`](Self::Surface). [`LogOnly`](Self::LogOnly)
/// swallows the error after logging it, for embeddings where a failed turn
/// should degrade quietly; either way the turn's state transitions (busy
/// cleared, history intact) are identical.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailureVisibility {
    /// Return turn errors from [`Chat::send`].
    #[default]
    Surface,
    /// Log turn errors at error level and return `Ok(())`.
    LogOnly,
}

/// Tunables for a [`Chat`] session.
#[derive(Debug, Clone, TypedBuilder)]
pub struct ChatConfig {
    /// Bound on tool-call rounds per turn.
    #[builder(default = DEFAULT_MAX_ROUNDS)]
    pub max_rounds: u32,
    /// What to do with submissions that arrive while a turn is in flight.
    #[builder(default)]
    pub submit_policy: SubmitPolicy,
    /// Whether turn failures reach the caller.
    #[builder(default)]
    pub failure_visibility: FailureVisibility,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// A conversation session with a remote agent.
///
/// The handle is cheap to share through a clone of its [`CancelToken`] and
/// its state accessors; `send` itself takes `&self`, so observers can read
/// while a turn is in flight.
pub struct Chat<G> {
    orchestrator: Orchestrator<G>,
    state: StateCell,
    submit_policy: SubmitPolicy,
    failure_visibility: FailureVisibility,
    cancel: CancelToken,
}

impl<G: AgentGateway> Chat<G> {
    /// Creates a session with default configuration.
    pub fn new(gateway: G, registry: ToolRegistry) -> Self {
        Self::with_config(gateway, registry, ChatConfig::default())
    }

    /// Creates a session with explicit configuration.
    pub fn with_config(gateway: G, registry: ToolRegistry, config: ChatConfig) -> Self {
        Self {
            orchestrator: Orchestrator::new(gateway, registry).with_max_rounds(config.max_rounds),
            state: StateCell::new(),
            submit_policy: config.submit_policy,
            failure_visibility: config.failure_visibility,
            cancel: CancelToken::new(),
        }
    }

    /// Submits a user message and drives the turn to completion.
    ///
    /// The submission itself is synchronous: by the time the first await
    /// point is reached, the user message is in history and `busy` is true.
    /// The returned future resolves when the turn reaches a terminal state.
    ///
    /// # Errors
    ///
    /// [`ChatError::Submit`] if the submission was rejected;
    /// [`ChatError::Turn`] if the turn failed and the session surfaces
    /// failures.
    pub async fn send(&self, text: impl Into<String>, context: Context) -> Result<(), ChatError> {
        self.state.submit(text, context, self.submit_policy)?;

        match self
            .orchestrator
            .resolve_pending(&self.state, &self.cancel)
            .await
        {
            Ok(()) => Ok(()),
            Err(err) => match self.failure_visibility {
                FailureVisibility::Surface => Err(err.into()),
                FailureVisibility::LogOnly => {
                    error!("turn failed: {err}");
                    Ok(())
                }
            },
        }
    }

    /// A copy of the conversation history.
    #[must_use]
    pub fn history(&self) -> Vec<ChatMessage> {
        self.state.history()
    }

    /// Whether a turn is currently in flight.
    #[must_use]
    pub fn busy(&self) -> bool {
        self.state.busy()
    }

    /// The session identity, once the gateway has assigned one.
    #[must_use]
    pub fn conversation_id(&self) -> Option<ConversationId> {
        self.state.conversation_id()
    }

    /// A token that aborts in-flight turns of this session when cancelled.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// The registry the session resolves tool calls against.
    pub const fn registry(&self) -> &ToolRegistry {
        self.orchestrator.registry()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use palaver_common::{
        AgentMessage, AgentTurnResult, FinishReason, Role, ToolExecutionResult,
    };
    use palaver_gateway::GatewayError;

    use super::*;

    struct ReplayGateway {
        responses: Mutex<VecDeque<Result<AgentTurnResult, GatewayError>>>,
    }

    impl ReplayGateway {
        fn new(responses: Vec<Result<AgentTurnResult, GatewayError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
            }
        }

        fn next(&self) -> Result<AgentTurnResult, GatewayError> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| {
                    Err(GatewayError::Status {
                        status: 500,
                        message: "script exhausted".to_string(),
                    })
                })
        }
    }

    #[async_trait]
    impl AgentGateway for ReplayGateway {
        async fn new_conversation(
            &self,
            _message: &str,
            _context: &Context,
        ) -> Result<AgentTurnResult, GatewayError> {
            self.next()
        }

        async fn reply_as_user(
            &self,
            _conversation_id: &ConversationId,
            _message: &str,
            _context: &Context,
        ) -> Result<AgentTurnResult, GatewayError> {
            self.next()
        }

        async fn reply_with_tool_results(
            &self,
            _conversation_id: &ConversationId,
            _tool_outputs: &[ToolExecutionResult],
        ) -> Result<AgentTurnResult, GatewayError> {
            self.next()
        }
    }

    fn stop(id: &str, content: &str) -> Result<AgentTurnResult, GatewayError> {
        Ok(AgentTurnResult {
            finish_reason: FinishReason::Stop,
            message: AgentMessage::text(content),
            conversation_id: ConversationId::new(id),
        })
    }

    fn failure() -> Result<AgentTurnResult, GatewayError> {
        Err(GatewayError::Status {
            status: 502,
            message: "bad gateway".to_string(),
        })
    }

    #[tokio::test]
    async fn send_resolves_a_full_turn() {
        let chat = Chat::new(ReplayGateway::new(vec![stop("c1", "hi")]), ToolRegistry::new());

        chat.send("hello", Context::new()).await.unwrap();

        let history = chat.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[1].content, "hi");
        assert_eq!(chat.conversation_id().unwrap().as_str(), "c1");
        assert!(!chat.busy());
    }

    #[tokio::test]
    async fn surfaced_failure_returns_turn_error() {
        let chat = Chat::new(ReplayGateway::new(vec![failure()]), ToolRegistry::new());

        let err = chat.send("hello", Context::new()).await.unwrap_err();
        assert!(matches!(err, ChatError::Turn(_)));
        assert!(!chat.busy());
        // The user's message stays recorded even though the turn failed.
        assert_eq!(chat.history().len(), 1);
    }

    #[tokio::test]
    async fn log_only_failure_is_swallowed() {
        let config = ChatConfig::builder()
            .failure_visibility(FailureVisibility::LogOnly)
            .build();
        let chat = Chat::with_config(
            ReplayGateway::new(vec![failure()]),
            ToolRegistry::new(),
            config,
        );

        chat.send("hello", Context::new()).await.unwrap();
        assert!(!chat.busy());
        assert_eq!(chat.history().len(), 1);
    }

    #[tokio::test]
    async fn failed_turn_does_not_poison_the_session() {
        let chat = Chat::new(
            ReplayGateway::new(vec![failure(), stop("c1", "recovered")]),
            ToolRegistry::new(),
        );

        assert!(chat.send("first", Context::new()).await.is_err());
        chat.send("second", Context::new()).await.unwrap();

        let history = chat.history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[2].content, "recovered");
    }

    #[tokio::test]
    async fn cancelled_session_surfaces_cancellation() {
        let chat = Chat::new(ReplayGateway::new(vec![stop("c1", "hi")]), ToolRegistry::new());
        chat.cancel_token().cancel();

        let err = chat.send("hello", Context::new()).await.unwrap_err();
        assert!(matches!(
            err,
            ChatError::Turn(crate::error::TurnError::Cancelled)
        ));
        assert!(!chat.busy());
    }

    #[test]
    fn config_defaults() {
        let config = ChatConfig::default();
        assert_eq!(config.max_rounds, DEFAULT_MAX_ROUNDS);
        assert_eq!(config.submit_policy, SubmitPolicy::Reject);
        assert_eq!(config.failure_visibility, FailureVisibility::Surface);
    }
}
