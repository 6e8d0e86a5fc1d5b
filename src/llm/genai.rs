//! GenAI-based completion client
//!
//! This module provides the production [`LLMClient`] on top of the `genai`
//! crate, which covers OpenAI, Anthropic, Gemini, xAI, Groq and Ollama.
//! Credentials are read by `genai` from each provider's standard environment
//! variable (`OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, ...).

use super::client::LLMClient;
use super::error::BackendError;
use super::types::{ChatMessage, LLMRequest, LLMResponse, MessageRole};
use async_trait::async_trait;
use genai::adapter::AdapterKind;
use genai::chat::{ChatMessage as GenAIChatMessage, ChatOptions, ChatRequest as GenAIChatRequest};
use genai::resolver::{self, AuthData, Endpoint, ServiceTargetResolver};
use genai::webc;
use genai::{Client, ModelIden, ServiceTarget};
use std::time::Duration;
use tracing::{debug, error};

/// Environment variable overriding the provider's default endpoint
pub const API_BASE_URL_ENV: &str = "LOGLENS_API_BASE_URL";

/// Completion client backed by `genai`
pub struct GenAIClient {
    client: Client,
    model: String,
    provider: AdapterKind,
    timeout: Duration,
}

impl GenAIClient {
    /// Creates a new GenAI client
    ///
    /// # Arguments
    ///
    /// * `provider` - Provider adapter to use
    /// * `model` - Model name (without provider prefix)
    /// * `timeout` - Upper bound for a single request
    pub fn new(
        provider: AdapterKind,
        model: String,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        if model.trim().is_empty() {
            return Err(BackendError::ConfigurationError {
                message: "model name must not be empty".to_string(),
            });
        }

        // Pin the adapter to the configured provider instead of inferring it
        // from the model name.
        let mut builder = Client::builder().with_model_mapper_fn(
            move |model_iden: ModelIden| -> resolver::Result<ModelIden> {
                Ok(ModelIden::new(provider, model_iden.model_name))
            },
        );

        if let Ok(endpoint_url) = std::env::var(API_BASE_URL_ENV) {
            debug!(
                "Using custom endpoint for {}: {}",
                provider.as_str(),
                endpoint_url
            );

            let target_resolver = ServiceTargetResolver::from_resolver_fn(
                move |service_target: ServiceTarget| -> resolver::Result<ServiceTarget> {
                    let auth = match provider.default_key_env_name() {
                        Some(api_key_var) => AuthData::from_env(api_key_var),
                        None => AuthData::from_single(""),
                    };

                    Ok(ServiceTarget {
                        endpoint: Endpoint::from_owned(endpoint_url.clone()),
                        auth,
                        model: service_target.model,
                    })
                },
            );
            builder = builder.with_service_target_resolver(target_resolver);
        }

        let client = builder.build();

        debug!(
            "Creating GenAI client: provider={}, model={}",
            provider.as_str(),
            model,
        );

        Ok(Self {
            client,
            model,
            provider,
            timeout,
        })
    }

    fn convert_message(msg: &ChatMessage) -> GenAIChatMessage {
        match msg.role {
            MessageRole::System => GenAIChatMessage::system(&msg.content),
            MessageRole::User => GenAIChatMessage::user(&msg.content),
            MessageRole::Assistant => GenAIChatMessage::assistant(&msg.content),
        }
    }
}

#[async_trait]
impl LLMClient for GenAIClient {
    async fn chat(&self, request: LLMRequest) -> Result<LLMResponse, BackendError> {
        let start = std::time::Instant::now();

        let messages: Vec<GenAIChatMessage> =
            request.messages.iter().map(Self::convert_message).collect();
        let genai_request = GenAIChatRequest::new(messages);

        let mut options = ChatOptions::default();
        if let Some(temp) = request.temperature {
            options = options.with_temperature(temp as f64);
        }
        if let Some(max_tokens) = request.max_tokens {
            options = options.with_max_tokens(max_tokens);
        }

        let response = match tokio::time::timeout(
            self.timeout,
            self.client.exec_chat(&self.model, genai_request, Some(&options)),
        )
        .await
        {
            Ok(Ok(resp)) => resp,
            Ok(Err(e)) => {
                error!("{} API error: {}", self.provider.as_str(), e);
                return Err(map_genai_error(self.provider, &e));
            }
            Err(_) => {
                error!(
                    "{} request timed out after {}s",
                    self.provider.as_str(),
                    self.timeout.as_secs()
                );
                return Err(BackendError::TimeoutError {
                    seconds: self.timeout.as_secs(),
                });
            }
        };

        let content = response
            .first_text()
            .ok_or_else(|| BackendError::InvalidResponse {
                message: "response contained no text".to_string(),
                raw_response: None,
            })?
            .to_string();

        Ok(LLMResponse::text(content, start.elapsed()))
    }

    fn name(&self) -> &str {
        self.provider.as_str()
    }

    fn model_info(&self) -> Option<String> {
        Some(self.model.clone())
    }
}

/// Maps a `genai` failure onto [`BackendError`], keeping the HTTP status
/// when the service answered with one.
fn map_genai_error(provider: AdapterKind, err: &genai::Error) -> BackendError {
    match err {
        genai::Error::WebModelCall { webc_error, .. }
        | genai::Error::WebAdapterCall { webc_error, .. } => match webc_error {
            webc::Error::ResponseFailedStatus {
                status,
                body,
                headers,
            } => {
                let retry_after = headers
                    .get("retry-after")
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.trim().parse().ok());
                status_error(
                    status.as_u16(),
                    format!("{} request failed: {}", provider.as_str(), body.trim()),
                    retry_after,
                )
            }
            webc::Error::Reqwest(e) => BackendError::NetworkError {
                message: format!("{} unreachable: {}", provider.as_str(), e),
            },
            _ => BackendError::ApiError {
                message: format!("{} request failed: {}", provider.as_str(), err),
                status_code: None,
            },
        },
        genai::Error::RequiresApiKey { .. }
        | genai::Error::NoAuthResolver { .. }
        | genai::Error::NoAuthData { .. } => BackendError::AuthenticationError {
            message: err.to_string(),
        },
        genai::Error::Resolver { .. } | genai::Error::ModelMapperFailed { .. } => {
            BackendError::ConfigurationError {
                message: err.to_string(),
            }
        }
        _ => BackendError::ApiError {
            message: format!("{} request failed: {}", provider.as_str(), err),
            status_code: None,
        },
    }
}

fn status_error(status: u16, message: String, retry_after: Option<u64>) -> BackendError {
    match status {
        401 | 403 => BackendError::AuthenticationError { message },
        429 => BackendError::RateLimitError { retry_after },
        _ => BackendError::ApiError {
            message,
            status_code: Some(status),
        },
    }
}

impl std::fmt::Debug for GenAIClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenAIClient")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use yare::parameterized;

    async fn resolved_target(client: &GenAIClient) -> ServiceTarget {
        client
            .client
            .resolve_service_target(&client.model)
            .await
            .unwrap()
    }

    #[parameterized(
        openai_fine_tune = { AdapterKind::OpenAI, "ft:gpt-3.5-turbo-0125:acme::abc123" },
        groq_oss_model = { AdapterKind::Groq, "openai/gpt-oss-120b" },
        ollama_gpt_name = { AdapterKind::Ollama, "gpt-4o-mini" },
        anthropic_plain = { AdapterKind::Anthropic, "claude-3-5-haiku-latest" },
    )]
    #[test_macro(tokio::test)]
    #[serial]
    async fn test_configured_provider_is_used(provider: AdapterKind, model: &str) {
        std::env::remove_var(API_BASE_URL_ENV);
        let client =
            GenAIClient::new(provider, model.to_string(), Duration::from_secs(5)).unwrap();

        let target = resolved_target(&client).await;

        assert_eq!(target.model.adapter_kind, provider);
    }

    #[tokio::test]
    #[serial]
    async fn test_custom_endpoint_keeps_provider() {
        std::env::set_var(API_BASE_URL_ENV, "http://127.0.0.1:9/v1/");
        let client = GenAIClient::new(
            AdapterKind::OpenAI,
            "local-model".to_string(),
            Duration::from_secs(5),
        );
        std::env::remove_var(API_BASE_URL_ENV);

        let target = resolved_target(&client.unwrap()).await;

        assert_eq!(target.model.adapter_kind, AdapterKind::OpenAI);
        assert_eq!(target.endpoint.base_url(), "http://127.0.0.1:9/v1/");
    }

    #[parameterized(
        unauthorized = { 401 },
        forbidden = { 403 },
    )]
    fn test_auth_statuses(status: u16) {
        assert!(matches!(
            status_error(status, "denied".to_string(), None),
            BackendError::AuthenticationError { .. }
        ));
    }

    #[test]
    fn test_rate_limit_status() {
        assert_eq!(
            status_error(429, "slow down".to_string(), Some(20)),
            BackendError::RateLimitError {
                retry_after: Some(20)
            }
        );
    }

    #[test]
    fn test_other_status_keeps_code() {
        assert_eq!(
            status_error(503, "unavailable".to_string(), None),
            BackendError::ApiError {
                message: "unavailable".to_string(),
                status_code: Some(503),
            }
        );
    }

    #[test]
    fn test_missing_key_is_authentication_error() {
        let err = genai::Error::RequiresApiKey {
            model_iden: ModelIden::new(AdapterKind::OpenAI, "gpt-3.5-turbo"),
        };
        assert!(matches!(
            map_genai_error(AdapterKind::OpenAI, &err),
            BackendError::AuthenticationError { .. }
        ));
    }

    #[test]
    fn test_unclassified_error_is_api_error() {
        let err = genai::Error::Internal("boom".to_string());
        assert!(matches!(
            map_genai_error(AdapterKind::Groq, &err),
            BackendError::ApiError {
                status_code: None,
                ..
            }
        ));
    }

    #[test]
    fn test_genai_client_creation() {
        let client = GenAIClient::new(
            AdapterKind::OpenAI,
            "gpt-3.5-turbo".to_string(),
            Duration::from_secs(30),
        )
        .unwrap();

        assert_eq!(client.name(), "OpenAI");
        assert_eq!(client.model_info(), Some("gpt-3.5-turbo".to_string()));
    }

    #[test]
    fn test_empty_model_rejected() {
        let result =
            GenAIClient::new(AdapterKind::OpenAI, "  ".to_string(), Duration::from_secs(5));
        assert!(matches!(result, Err(BackendError::ConfigurationError { .. })));
    }

    #[test]
    fn test_debug_impl() {
        fn assert_debug<T: std::fmt::Debug>() {}
        assert_debug::<GenAIClient>();
    }
}
