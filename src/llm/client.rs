//! Ollama chat client
//!
//! Non-streaming `POST /api/chat`; one request per agent invocation.

use crate::errors::{BackendError, Result};
use crate::llm::{ChatMessage, ChatModel};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Ollama chat client bound to one model
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    /// Create Ollama client with custom configuration
    pub fn with_config(base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(BackendError::HttpError)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    /// Send a conversation and return the assistant's reply text
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let url = format!("{}/api/chat", self.base_url);

        let request = OllamaChatRequest {
            model: &self.model,
            messages,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| BackendError::OllamaApiError(format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(BackendError::OllamaApiError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let body: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| BackendError::OllamaApiError(format!("Failed to parse response: {}", e)))?;

        debug!(model = %self.model, done = body.done, "Chat completion received");

        Ok(body.message.content)
    }

    /// Check if Ollama is available
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/api/version", self.base_url);

        match self.client.get(&url).timeout(Duration::from_secs(2)).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ChatModel for OllamaClient {
    async fn chat(&self, messages: &[ChatMessage]) -> anyhow::Result<String> {
        Ok(self.complete(messages).await?)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Ollama chat request
#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

/// Ollama chat response (non-streaming)
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: ChatMessage,
    #[serde(default)]
    done: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;

    #[test]
    fn test_client_with_config() {
        let client = OllamaClient::with_config(
            "http://localhost:11434/",
            "llama2:7b",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.model(), "llama2:7b");
        assert_eq!(client.base_url(), "http://localhost:11434");
    }

    #[test]
    fn test_request_shape() {
        let messages = vec![ChatMessage::system("sys"), ChatMessage::user("hi")];
        let request = OllamaChatRequest {
            model: "qwen2.5:7b-instruct",
            messages: &messages,
            stream: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["messages"][1]["role"], "user");
    }

    #[test]
    fn test_response_parsing() {
        let raw = r#"{"model":"m","created_at":"2024-01-01T00:00:00Z",
            "message":{"role":"assistant","content":"Refunds take 5 days."},"done":true}"#;
        let parsed: OllamaChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.message.role, Role::Assistant);
        assert_eq!(parsed.message.content, "Refunds take 5 days.");
        assert!(parsed.done);
    }

    #[tokio::test]
    #[ignore] // Requires Ollama running
    async fn test_health_check_integration() {
        let client = OllamaClient::with_config(
            crate::config::DEFAULT_OLLAMA_URL,
            crate::config::DEFAULT_MODEL,
            Duration::from_secs(5),
        )
        .unwrap();
        assert!(client.health_check().await);
    }
}
