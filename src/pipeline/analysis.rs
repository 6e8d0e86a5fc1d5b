//! Batch analysis against the completion service
//!
//! One batch becomes exactly one request. The reply is free-form text; no
//! per-entry structure is requested or assumed.

use super::batcher::Batch;
use super::prompt::{combine_entries, user_prompt, SYSTEM_PROMPT};
use crate::llm::{ChatMessage, LLMClient, LLMRequest};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_MAX_TOKENS: u32 = 500;

/// Request parameters applied to every batch
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSettings {
    pub temperature: f32,
    pub max_tokens: u32,
    /// Threat framework each entry should be mapped to, if any
    pub threat_framework: Option<String>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            threat_framework: None,
        }
    }
}

/// Result of analyzing one batch
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    /// The service answered; the text is trimmed and may be empty
    Analyzed {
        analysis: String,
        response_time: Duration,
    },
    /// The request failed and the batch should be skipped
    Failed { reason: String },
}

impl BatchOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, BatchOutcome::Failed { .. })
    }

    pub fn analysis(&self) -> Option<&str> {
        match self {
            BatchOutcome::Analyzed { analysis, .. } => Some(analysis),
            BatchOutcome::Failed { .. } => None,
        }
    }
}

/// Sends batches to an injected [`LLMClient`]
pub struct LogAnalyzer {
    client: Arc<dyn LLMClient>,
    settings: AnalysisSettings,
}

impl LogAnalyzer {
    pub fn new(client: Arc<dyn LLMClient>, settings: AnalysisSettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    pub fn client_name(&self) -> &str {
        self.client.name()
    }

    /// Builds the single request for `batch`.
    pub fn build_request(&self, batch: &Batch) -> LLMRequest {
        let combined = combine_entries(batch.texts());
        let messages = vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(user_prompt(
                &combined,
                self.settings.threat_framework.as_deref(),
            )),
        ];

        LLMRequest::new(messages)
            .with_temperature(self.settings.temperature)
            .with_max_tokens(self.settings.max_tokens)
    }

    /// Analyzes one batch. Never fails: errors become [`BatchOutcome::Failed`].
    pub async fn analyze_batch(&self, batch: &Batch) -> BatchOutcome {
        let request = self.build_request(batch);

        match self.client.chat(request).await {
            Ok(response) => {
                debug!(
                    batch = batch.number(),
                    response_time_ms = response.response_time.as_millis(),
                    chars = response.content.len(),
                    "Received analysis"
                );
                BatchOutcome::Analyzed {
                    analysis: response.content.trim().to_string(),
                    response_time: response.response_time,
                }
            }
            Err(e) => {
                error!(batch = batch.number(), error = %e, "Error analyzing logs");
                BatchOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

impl std::fmt::Debug for LogAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogAnalyzer")
            .field("client", &self.client.name())
            .field("settings", &self.settings)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{BackendError, MessageRole, MockLLMClient, MockResponse};
    use crate::pipeline::normalizer::NormalizedRecord;

    fn batch(texts: &[&str]) -> Batch {
        Batch {
            index: 0,
            records: texts
                .iter()
                .enumerate()
                .map(|(i, t)| NormalizedRecord {
                    line: i + 1,
                    text: t.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_build_request_shape() {
        let analyzer =
            LogAnalyzer::new(Arc::new(MockLLMClient::new()), AnalysisSettings::default());

        let request = analyzer.build_request(&batch(&["sshd: failed password", "sudo: root"]));

        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, MessageRole::System);
        assert_eq!(request.messages[0].content, "You are a security analyst.");
        assert_eq!(request.messages[1].role, MessageRole::User);
        assert_eq!(
            request.messages[1].content,
            "Analyze these logs for security threats:\nsshd: failed password\n\nsudo: root"
        );
        assert_eq!(request.temperature, Some(0.3));
        assert_eq!(request.max_tokens, Some(500));
    }

    #[test]
    fn test_build_request_with_framework() {
        let settings = AnalysisSettings {
            threat_framework: Some("MITRE ATT&CK".to_string()),
            ..Default::default()
        };
        let analyzer = LogAnalyzer::new(Arc::new(MockLLMClient::new()), settings);

        let request = analyzer.build_request(&batch(&["entry"]));
        assert!(request.messages[1].content.contains("MITRE ATT&CK"));
    }

    #[tokio::test]
    async fn test_analyze_batch_trims_response() {
        let client = Arc::new(MockLLMClient::new());
        client.add_response(MockResponse::text("\n  Brute force attempt.  \n"));
        let analyzer = LogAnalyzer::new(client.clone(), AnalysisSettings::default());

        let outcome = analyzer.analyze_batch(&batch(&["R"])).await;

        assert_eq!(outcome.analysis(), Some("Brute force attempt."));
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_response_is_not_failure() {
        let client = Arc::new(MockLLMClient::new());
        client.add_response(MockResponse::text("   "));
        let analyzer = LogAnalyzer::new(client, AnalysisSettings::default());

        let outcome = analyzer.analyze_batch(&batch(&["R"])).await;

        assert!(!outcome.is_failed());
        assert_eq!(outcome.analysis(), Some(""));
    }

    #[tokio::test]
    async fn test_backend_error_becomes_failed_outcome() {
        let client = Arc::new(MockLLMClient::new());
        client.add_response(MockResponse::error(BackendError::AuthenticationError {
            message: "invalid api key".to_string(),
        }));
        let analyzer = LogAnalyzer::new(client, AnalysisSettings::default());

        let outcome = analyzer.analyze_batch(&batch(&["R"])).await;

        match outcome {
            BatchOutcome::Failed { reason } => assert!(reason.contains("invalid api key")),
            other => panic!("Expected failure, got {:?}", other),
        }
    }
}
