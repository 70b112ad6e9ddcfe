//! OpenAI-compatible narrative backend
//!
//! Works with any server that implements the OpenAI chat completions API:
//! - Docker Model Runner (http://localhost:12434)
//! - vLLM (http://localhost:8000)
//! - LocalAI / llama-server (http://localhost:8080)
//! - Hosted OpenAI-compatible APIs (with `NARRATIVE_API_KEY`)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

use super::{DecisionSummary, NarrativeBackend};

/// Upper bound on any narrative call; verdicts never wait longer
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// OpenAI-compatible backend
#[derive(Clone)]
pub struct OpenAICompatibleBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAICompatibleBackend {
    /// Create a new OpenAI-compatible backend
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: None,
        }
    }

    /// Create with an API key
    pub fn with_api_key(base_url: &str, model: &str, api_key: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: Some(api_key.to_string()),
        }
    }

    /// Create a new instance with a different model
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            http_client: self.http_client.clone(),
            base_url: self.base_url.clone(),
            model: model.to_string(),
            api_key: self.api_key.clone(),
        }
    }

    /// Create from environment variables
    ///
    /// Required: `NARRATIVE_HOST`
    /// Optional: `NARRATIVE_MODEL` (default: llama3.2), `NARRATIVE_API_KEY`
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("NARRATIVE_HOST").ok()?;
        let model = std::env::var("NARRATIVE_MODEL").unwrap_or_else(|_| "llama3.2".to_string());
        let api_key = std::env::var("NARRATIVE_API_KEY").ok();

        let mut backend = Self::new(&host, &model);
        backend.api_key = api_key;
        Some(backend)
    }

    fn render_prompt(summary: &DecisionSummary) -> String {
        format!(
            "You are a personal finance advisor. A {} decision was evaluated as {}.\n\
             Figures used: {}\n\
             Explain the verdict in two or three sentences using the concrete numbers, \
             and suggest a practical alternative if it was declined.",
            summary.decision,
            if summary.affordable {
                "affordable"
            } else {
                "not affordable"
            },
            summary.figures
        )
    }

    /// Make a chat completion request
    async fn chat_completion(&self, prompt: &str) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: Some(0.1),
            max_tokens: Some(400),
            stream: false,
        };

        let mut req_builder = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .timeout(REQUEST_TIMEOUT)
            .json(&request);

        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req_builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::NarrativeUnavailable(format!(
                "narrative API error {}: {}",
                status, body
            )));
        }

        let chat_response: ChatCompletionResponse = response.json().await?;
        debug!(model = %self.model, "Narrative response received");

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::NarrativeUnavailable("no choices in response".into()))
    }
}

/// Request to the chat completions API
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Response from the chat completions API
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[async_trait]
impl NarrativeBackend for OpenAICompatibleBackend {
    async fn explain(&self, summary: &DecisionSummary) -> Result<String> {
        let prompt = Self::render_prompt(summary);
        self.chat_completion(&prompt).await
    }

    async fn health_check(&self) -> bool {
        let result = self
            .http_client
            .get(format!("{}/v1/models", self.base_url))
            .timeout(Duration::from_secs(2))
            .send()
            .await;
        matches!(result, Ok(response) if response.status().is_success())
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DecisionType;
    use crate::test_utils::MockNarrativeServer;
    use serde_json::json;

    #[test]
    fn test_prompt_carries_the_figures() {
        let summary = DecisionSummary::new(
            DecisionType::Purchase,
            true,
            json!({"cost": 1200.0, "salary_fraction_limit": 1250.0}),
        );
        let prompt = OpenAICompatibleBackend::render_prompt(&summary);
        assert!(prompt.contains("purchase"));
        assert!(prompt.contains("affordable"));
        assert!(prompt.contains("1250"));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let backend = OpenAICompatibleBackend::new("http://localhost:8080/", "test-model");
        assert_eq!(backend.host(), "http://localhost:8080");
        assert_eq!(backend.model(), "test-model");
    }

    #[tokio::test]
    async fn test_explain_against_mock_server() {
        let server = MockNarrativeServer::start().await;
        let backend = OpenAICompatibleBackend::new(&server.url(), "mock-model");

        assert!(backend.health_check().await);

        let summary = DecisionSummary::new(
            DecisionType::Trip,
            false,
            json!({"cost": 2500.0, "monthly_salary": 5000.0}),
        );
        let text = backend.explain(&summary).await.unwrap();
        assert!(!text.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_an_error_not_a_panic() {
        // Nothing listens on this port
        let backend = OpenAICompatibleBackend::new("http://127.0.0.1:1", "test-model");
        assert!(!backend.health_check().await);

        let summary = DecisionSummary::new(DecisionType::Purchase, true, json!({}));
        assert!(backend.explain(&summary).await.is_err());
    }
}
