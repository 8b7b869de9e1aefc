//! JSON-over-HTTP gateway implementation.
//!
//! One POST per operation:
//!
//! - `POST {base}/agent/new-conversation` with `{"message", "context"?}`
//! - `POST {base}/agent/{id}/reply-as-user` with `{"message", "context"?}`
//! - `POST {base}/agent/{id}/reply-as-tool` with `{"toolOutputs": [...]}`
//!
//! Requests carry a bearer service key. The key is held in a
//! [`SecretString`] so it never shows up in logs or debug output.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use palaver_common::{AgentTurnResult, ConversationId, ToolExecutionResult};

use crate::error::{ErrorResponse, GatewayError};
use crate::AgentGateway;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UserMessageBody<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    context: &'a HashMap<String, serde_json::Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolOutputsBody<'a> {
    tool_outputs: &'a [ToolExecutionResult],
}

/// HTTP client for the remote agent gateway.
#[derive(Debug)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    service_key: SecretString,
}

impl HttpGateway {
    /// Creates a gateway client for the given base URL and service key.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] if the base URL does not parse
    /// or the underlying HTTP client cannot be constructed.
    pub fn new(
        base_url: impl Into<String>,
        service_key: impl Into<String>,
    ) -> Result<Self, GatewayError> {
        Self::with_timeout(base_url, service_key, None)
    }

    /// Creates a gateway client with an optional per-request timeout.
    ///
    /// `None` means no timeout, which suits long-running agent turns.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] if the base URL does not parse
    /// or the underlying HTTP client cannot be constructed.
    pub fn with_timeout(
        base_url: impl Into<String>,
        service_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, GatewayError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        url::Url::parse(&base_url).map_err(|e| {
            GatewayError::Configuration(format!("invalid base URL '{base_url}': {e}"))
        })?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| GatewayError::Configuration(format!("failed to build client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            service_key: SecretString::from(service_key.into()),
        })
    }

    async fn post<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<AgentTurnResult, GatewayError> {
        let url = format!("{}/{path}", self.base_url);
        debug!("POST {url}");

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.service_key.expose_secret())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;

            // Prefer the structured error message; fall back to the raw body.
            let message = serde_json::from_str::<ErrorResponse>(&error_text)
                .map_or(error_text, |parsed| parsed.error.message);

            error!("gateway call {url} failed with status {status}: {message}");
            return Err(GatewayError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let response_text = response.text().await?;
        let result: AgentTurnResult = serde_json::from_str(&response_text)?;
        Ok(result)
    }
}

#[async_trait]
impl AgentGateway for HttpGateway {
    async fn new_conversation(
        &self,
        message: &str,
        context: &HashMap<String, serde_json::Value>,
    ) -> Result<AgentTurnResult, GatewayError> {
        self.post("agent/new-conversation", &UserMessageBody { message, context })
            .await
    }

    async fn reply_as_user(
        &self,
        conversation_id: &ConversationId,
        message: &str,
        context: &HashMap<String, serde_json::Value>,
    ) -> Result<AgentTurnResult, GatewayError> {
        self.post(
            &format!("agent/{conversation_id}/reply-as-user"),
            &UserMessageBody { message, context },
        )
        .await
    }

    async fn reply_with_tool_results(
        &self,
        conversation_id: &ConversationId,
        tool_outputs: &[ToolExecutionResult],
    ) -> Result<AgentTurnResult, GatewayError> {
        self.post(
            &format!("agent/{conversation_id}/reply-as-tool"),
            &ToolOutputsBody { tool_outputs },
        )
        .await
    }
}
