//! The turn orchestration state machine.
//!
//! A turn resolves one user submission: dispatch to the gateway, then zero or
//! more tool-call rounds, each strictly sequential with respect to the next,
//! until a response arrives with no unresolved tool calls. Within a round all
//! handlers run concurrently and their results are reassembled in call order
//! before being sent back.
//!
//! Assistant content is buffered while the turn runs and committed to history
//! in one transition at the end, so a failed turn leaves history exactly as
//! the submission left it and observers never see a half-applied turn.

use futures::future::try_join_all;
use log::{debug, info};

use palaver_common::{PendingMessage, ToolCall, ToolExecutionResult};
use palaver_gateway::AgentGateway;
use palaver_tools::{parse_arguments, ToolRegistry};

use crate::cancel::CancelToken;
use crate::error::TurnError;
use crate::state::StateCell;

/// Default bound on tool-call rounds per turn.
///
/// The limit protects against a misbehaving agent issuing unbounded rounds;
/// legitimate turns rarely need more than two or three.
pub const DEFAULT_MAX_ROUNDS: u32 = 8;

/// Drives turns against a gateway and a tool registry.
pub struct Orchestrator<G> {
    gateway: G,
    registry: ToolRegistry,
    max_rounds: u32,
}

impl<G: AgentGateway> Orchestrator<G> {
    /// Creates an orchestrator with the default round limit.
    pub const fn new(gateway: G, registry: ToolRegistry) -> Self {
        Self {
            gateway,
            registry,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    /// Overrides the per-turn round limit.
    #[must_use]
    pub const fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// The registry tool calls are resolved against.
    pub const fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Resolves the pending submission, if one exists.
    ///
    /// On success the buffered assistant content is committed and `busy`
    /// clears; on failure `busy` clears, history keeps only the user message,
    /// and the error is returned. A call with nothing pending is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the [`TurnError`] that aborted the turn.
    pub async fn resolve_pending(
        &self,
        state: &StateCell,
        cancel: &CancelToken,
    ) -> Result<(), TurnError> {
        let Some(pending) = state.take_pending() else {
            return Ok(());
        };

        match self.run_turn(state, pending, cancel).await {
            Ok(assistant_contents) => {
                state.complete_turn(assistant_contents);
                Ok(())
            }
            Err(err) => {
                state.abort_turn();
                Err(err)
            }
        }
    }

    async fn run_turn(
        &self,
        state: &StateCell,
        pending: PendingMessage,
        cancel: &CancelToken,
    ) -> Result<Vec<String>, TurnError> {
        ensure_live(cancel)?;

        let mut result = match state.conversation_id() {
            None => {
                debug!("starting new conversation");
                self.gateway
                    .new_conversation(&pending.text, &pending.context)
                    .await?
            }
            Some(id) => {
                debug!("replying as user on conversation {id}");
                self.gateway
                    .reply_as_user(&id, &pending.text, &pending.context)
                    .await?
            }
        };

        // The id assigned first wins and is reused verbatim; it is never
        // re-derived from later responses.
        let conversation_id = state
            .conversation_id()
            .unwrap_or_else(|| result.conversation_id.clone());
        state.adopt_conversation_id(&conversation_id);

        let mut assistant_contents = Vec::new();
        let mut rounds: u32 = 0;

        loop {
            // Content and tool calls may co-occur; content is kept whether or
            // not the round also requested tools.
            if let Some(content) = result.message.content.take() {
                assistant_contents.push(content);
            }

            if result.message.tool_calls.is_empty() {
                debug!("turn finished after {rounds} tool round(s)");
                return Ok(assistant_contents);
            }

            if rounds >= self.max_rounds {
                return Err(TurnError::MaxRoundsExceeded {
                    max_rounds: self.max_rounds,
                });
            }
            rounds += 1;

            info!(
                "resolving tool round {rounds} with {} call(s)",
                result.message.tool_calls.len()
            );
            let outputs = self.execute_round(&result.message.tool_calls).await?;

            ensure_live(cancel)?;
            result = self
                .gateway
                .reply_with_tool_results(&conversation_id, &outputs)
                .await?;
        }
    }

    /// Executes one round of tool calls.
    ///
    /// Handlers are resolved and arguments parsed up front, so a missing tool
    /// or malformed arguments fail the round before any handler runs. The
    /// fan-out awaits every handler; outputs come back in call order, not
    /// completion order.
    async fn execute_round(
        &self,
        calls: &[ToolCall],
    ) -> Result<Vec<ToolExecutionResult>, TurnError> {
        let mut invocations = Vec::with_capacity(calls.len());
        for call in calls {
            let name = call.function.name.clone();
            let handler = self
                .registry
                .lookup(&name)
                .ok_or_else(|| TurnError::ToolNotFound { name: name.clone() })?;
            let args = parse_arguments(&call.function.arguments)
                .map_err(|source| TurnError::ArgumentParse {
                    name: name.clone(),
                    source,
                })?;
            invocations.push((call.id.clone(), name, handler, args));
        }

        let futures = invocations
            .into_iter()
            .map(|(tool_id, name, handler, args)| async move {
                debug!("executing tool '{name}' (id: {tool_id})");
                let output =
                    handler
                        .call(args)
                        .await
                        .map_err(|source| TurnError::ToolExecution {
                            name: name.clone(),
                            source,
                        })?;
                Ok::<_, TurnError>(ToolExecutionResult {
                    tool_id,
                    function_name: name,
                    output,
                })
            });

        try_join_all(futures).await
    }
}

fn ensure_live(cancel: &CancelToken) -> Result<(), TurnError> {
    if cancel.is_cancelled() {
        Err(TurnError::Cancelled)
    } else {
        Ok(())
    }
}
