//! Mock narrative backend for testing
//!
//! Returns deterministic narration without a running LLM server. The
//! unhealthy variant exercises the degradation path in the decision
//! engine.

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::{DecisionSummary, NarrativeBackend};

/// Mock narrative backend
#[derive(Clone, Default)]
pub struct MockBackend {
    /// Whether explain/health_check should succeed
    pub healthy: bool,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self { healthy: true }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self { healthy: false }
    }
}

#[async_trait]
impl NarrativeBackend for MockBackend {
    async fn explain(&self, summary: &DecisionSummary) -> Result<String> {
        if !self.healthy {
            return Err(Error::NarrativeUnavailable(
                "mock backend is unhealthy".into(),
            ));
        }
        Ok(format!(
            "Mock narrative: the {} decision came out {} based on the supplied figures.",
            summary.decision,
            if summary.affordable {
                "affordable"
            } else {
                "not affordable"
            }
        ))
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DecisionType;
    use serde_json::json;

    #[tokio::test]
    async fn test_unhealthy_mock_fails_explain() {
        let backend = MockBackend::unhealthy();
        assert!(!backend.health_check().await);

        let summary = DecisionSummary::new(DecisionType::Subscription, true, json!({}));
        let err = backend.explain(&summary).await.unwrap_err();
        assert_eq!(err.kind(), "narrative_unavailable");
    }
}
