//! Test utilities for steward-core
//!
//! This module provides testing infrastructure including a mock narrative
//! server implementing the OpenAI-compatible chat completions surface,
//! used for development and integration tests.

use axum::{
    extract::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::sync::oneshot;

/// Mock narrative server for testing and development
pub struct MockNarrativeServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockNarrativeServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        let app = Router::new()
            .route("/v1/models", get(handle_models))
            .route("/v1/chat/completions", post(handle_chat));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockNarrativeServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Models endpoint response (health check)
async fn handle_models() -> Json<ModelsResponse> {
    Json(ModelsResponse {
        object: "list".to_string(),
        data: vec![ModelInfo {
            id: "mock-model".to_string(),
            object: "model".to_string(),
        }],
    })
}

/// Chat completions endpoint
///
/// Keys the canned reply off the decision type tag embedded in the prompt.
async fn handle_chat(Json(request): Json<ChatRequest>) -> Json<ChatResponse> {
    let prompt = request
        .messages
        .first()
        .map(|m| m.content.as_str())
        .unwrap_or_default();

    let content = if prompt.contains("trip") {
        "Taking this trip now would eat into your emergency cushion; a short save-up \
         plan gets you there without the squeeze."
    } else if prompt.contains("purchase") {
        "This purchase fits within your monthly discretionary room without touching savings."
    } else if prompt.contains("subscription") {
        "Your recurring subscriptions are creeping up; audit the ones you no longer use \
         before adding another."
    } else if prompt.contains("rent_vs_buy") {
        "At current rates the monthly numbers favor one option clearly; see the figures \
         for the comparison."
    } else if prompt.contains("career_move") {
        "Weigh the cost-of-living change against the raw salary bump; the disposable \
         income delta is what you'll actually feel."
    } else {
        "Reviewed the figures; the verdict follows the numbers."
    };

    Json(ChatResponse {
        choices: vec![ChatChoice {
            message: ChatResponseMessage {
                role: "assistant".to_string(),
                content: content.to_string(),
            },
        }],
        model: request.model,
    })
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatRequestMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatRequestMessage {
    #[allow(dead_code)]
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Serialize)]
struct ChatResponseMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ModelsResponse {
    object: String,
    data: Vec<ModelInfo>,
}

#[derive(Debug, Serialize)]
struct ModelInfo {
    id: String,
    object: String,
}
