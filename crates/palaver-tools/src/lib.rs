//! # palaver-tools
//!
//! Tool registry for the palaver conversation orchestration library.
//!
//! When the remote agent issues a tool call, the orchestrator looks the
//! function name up here and invokes the registered handler with the parsed
//! JSON arguments. Handlers follow one uniform contract:
//!
//! ```text
//! (parsed JSON arguments) -> Future<JSON value>
//! ```
//!
//! ## Example
//!
//! ```
//! use palaver_tools::{FnTool, ToolRegistry};
//! use serde_json::{json, Value};
//!
//! let registry = ToolRegistry::new();
//! registry.register(
//!     "get_weather",
//!     FnTool::new(|args: Value| async move {
//!         let city = args["city"].as_str().unwrap_or("unknown");
//!         Ok(json!({ "city": city, "temperature_c": 18 }))
//!     }),
//! );
//!
//! assert!(registry.contains("get_weather"));
//! assert!(registry.lookup("nonexistent").is_none());
//! ```
//!
//! ## Thread safety
//!
//! The registry uses `DashMap`, so it can be shared across async tasks and
//! handlers of the same round can be dispatched concurrently without extra
//! synchronization.

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

/// An asynchronous client-side function the remote agent may invoke.
///
/// Handlers receive arguments already parsed from the agent's JSON text and
/// return a JSON-serializable output that is reported back to the agent.
/// A returned error fails the whole turn; handlers should not use errors for
/// expected outcomes (encode those in the output value instead).
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Executes the tool with the parsed arguments.
    async fn call(&self, args: Value) -> Result<Value>;
}

/// Adapter that turns a plain async closure into a [`ToolHandler`].
pub struct FnTool<F> {
    f: F,
}

impl<F, Fut> FnTool<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value>> + Send,
{
    /// Wraps the closure.
    pub const fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> ToolHandler for FnTool<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value>> + Send,
{
    async fn call(&self, args: Value) -> Result<Value> {
        (self.f)(args).await
    }
}

/// Mapping from function name to executable handler.
///
/// Lookup is by the exact name the agent supplies in its tool calls; a miss is
/// fatal to the turn that requested it, so names registered here must match
/// the tool definitions the agent was configured with.
pub struct ToolRegistry {
    tools: Arc<DashMap<String, Arc<dyn ToolHandler>>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ToolRegistry {
    fn clone(&self) -> Self {
        Self {
            tools: Arc::clone(&self.tools),
        }
    }
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tools: Arc::new(DashMap::new()),
        }
    }

    /// Registers a handler under `name`, replacing any previous registration.
    pub fn register<T: ToolHandler + 'static>(&self, name: impl Into<String>, handler: T) {
        self.tools.insert(name.into(), Arc::new(handler));
    }

    /// Registers an already-shared handler under `name`.
    pub fn register_arc(&self, name: impl Into<String>, handler: Arc<dyn ToolHandler>) {
        self.tools.insert(name.into(), handler);
    }

    /// Looks a handler up by function name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.tools.get(name).map(|entry| entry.value().clone())
    }

    /// Whether a handler is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Removes a handler, returning it if present.
    pub fn remove(&self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.tools.remove(name).map(|(_, handler)| handler)
    }

    /// The registered function names, in no particular order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Parses a tool call's argument text as strict JSON.
///
/// An empty string is treated as `{}`; gateways omit the arguments field for
/// zero-parameter tools. Anything else must be valid JSON; a parse failure is
/// fatal to the turn, never a partial result.
///
/// # Errors
///
/// Returns the underlying `serde_json` error for invalid JSON.
pub fn parse_arguments(raw: &str) -> Result<Value, serde_json::Error> {
    if raw.is_empty() {
        Ok(Value::Object(serde_json::Map::new()))
    } else {
        serde_json::from_str(raw)
    }
}
