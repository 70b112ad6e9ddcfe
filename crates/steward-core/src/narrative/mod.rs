//! Pluggable narrative-enrichment boundary
//!
//! This module provides a backend-agnostic interface for turning a
//! structured decision summary into a human-readable explanation. The
//! capability is strictly optional: every verdict in this crate is
//! computed before narration and survives the backend being absent,
//! unreachable or slow.
//!
//! # Architecture
//!
//! - `NarrativeBackend` trait: defines the narration interface
//! - `NarrativeClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OpenAICompatibleBackend`, `MockBackend`
//!
//! # Configuration
//!
//! Environment variables:
//! - `NARRATIVE_BACKEND`: Backend to use (openai_compatible, mock). Default: openai_compatible
//! - `NARRATIVE_HOST`: Server URL (required for openai_compatible backend)
//! - `NARRATIVE_MODEL`: Model name (default: llama3.2)
//! - `NARRATIVE_API_KEY`: API key if required (optional)

mod mock;
mod openai_compatible;

pub use mock::MockBackend;
pub use openai_compatible::OpenAICompatibleBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::DecisionType;

/// Structured decision summary sent to the narrative service
///
/// Carries the verdict boolean, the decision type tag and the key numeric
/// inputs behind the decision; nothing else crosses the boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionSummary {
    pub decision: DecisionType,
    pub affordable: bool,
    /// Key numeric inputs behind the verdict
    pub figures: serde_json::Value,
}

impl DecisionSummary {
    pub fn new(decision: DecisionType, affordable: bool, figures: serde_json::Value) -> Self {
        Self {
            decision,
            affordable,
            figures,
        }
    }
}

/// Trait defining the interface for narrative backends
///
/// Backends should be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait NarrativeBackend: Send + Sync {
    /// Produce a free-text explanation for a decision summary
    async fn explain(&self, summary: &DecisionSummary) -> Result<String>;

    /// Check if the backend is available
    async fn health_check(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete narrative client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum NarrativeClient {
    /// Any server implementing the OpenAI chat completions API
    OpenAICompatible(OpenAICompatibleBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl NarrativeClient {
    /// Create a narrative client from environment variables
    ///
    /// Returns None if the required environment variables are not set;
    /// callers then run without narrative enrichment.
    pub fn from_env() -> Option<Self> {
        let backend =
            std::env::var("NARRATIVE_BACKEND").unwrap_or_else(|_| "openai_compatible".to_string());

        match backend.to_lowercase().as_str() {
            "openai_compatible" | "openai" | "vllm" | "localai" | "llamacpp" => {
                OpenAICompatibleBackend::from_env().map(NarrativeClient::OpenAICompatible)
            }
            "mock" => Some(NarrativeClient::Mock(MockBackend::new())),
            _ => {
                tracing::warn!(backend = %backend, "Unknown NARRATIVE_BACKEND, falling back to openai_compatible");
                OpenAICompatibleBackend::from_env().map(NarrativeClient::OpenAICompatible)
            }
        }
    }

    /// Create an OpenAI-compatible backend directly
    pub fn openai_compatible(host: &str, model: &str) -> Self {
        NarrativeClient::OpenAICompatible(OpenAICompatibleBackend::new(host, model))
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        NarrativeClient::Mock(MockBackend::new())
    }
}

// Implement NarrativeBackend for NarrativeClient by delegating to the inner backend
#[async_trait]
impl NarrativeBackend for NarrativeClient {
    async fn explain(&self, summary: &DecisionSummary) -> Result<String> {
        match self {
            NarrativeClient::OpenAICompatible(b) => b.explain(summary).await,
            NarrativeClient::Mock(b) => b.explain(summary).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            NarrativeClient::OpenAICompatible(b) => b.health_check().await,
            NarrativeClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            NarrativeClient::OpenAICompatible(b) => b.model(),
            NarrativeClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            NarrativeClient::OpenAICompatible(b) => b.host(),
            NarrativeClient::Mock(b) => b.host(),
        }
    }
}
