//! # palaver
//!
//! A client-side orchestration library for conversational agent services.
//!
//! Palaver drives the full lifecycle of a conversation turn against a remote
//! agent: submit a user message, dispatch it over the gateway, resolve any
//! tool calls the agent requests (round after round, bounded), and commit the
//! agent's replies to an append-only history.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use palaver::{Chat, Context, FnTool, HttpGateway, ToolRegistry};
//! use serde_json::{json, Value};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let gateway = HttpGateway::new("https://agent.example.com", "service-key")?;
//!
//! let registry = ToolRegistry::new();
//! registry.register(
//!     "get_time",
//!     FnTool::new(|_args: Value| async move { Ok(json!({"time": "12:00"})) }),
//! );
//!
//! let chat = Chat::new(gateway, registry);
//! chat.send("What time is it?", Context::new()).await?;
//!
//! for message in chat.history() {
//!     println!("{}: {}", message.role, message.content);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **Turn Orchestration**: One submission resolves to completion, including
//!   nested tool-call rounds, before the next is accepted
//! - **Tool Calling**: Register async handlers and let the turn loop fan them
//!   out concurrently, replying in call order
//! - **Observable State**: History, busy flag, and conversation identity are
//!   readable at any point and never show a half-applied transition
//! - **Cancellation**: A cloneable token aborts in-flight turns between
//!   gateway calls

pub mod cancel;
pub mod chat;
pub mod error;
pub mod orchestrator;
pub mod state;

pub use palaver_common::*;
pub use palaver_gateway::*;
pub use palaver_tools::*;

pub use cancel::CancelToken;
pub use chat::{Chat, ChatConfig, FailureVisibility};
pub use error::{ChatError, SubmitError, TurnError};
pub use orchestrator::{Orchestrator, DEFAULT_MAX_ROUNDS};
pub use state::{ConversationState, StateCell, SubmitPolicy};
