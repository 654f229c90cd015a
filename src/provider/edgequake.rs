//! Adapter from any `edgequake_llm` provider to [`GenerativeModel`].
//!
//! Each content part becomes one user message, in order: text parts as
//! plain user messages and the résumé image as a user message whose only
//! content is the image.

use crate::config::EvaluationConfig;
use crate::error::{EvaluationError, ProviderError};
use crate::pipeline::dispatch::{ContentPart, GenerativeModel, ModelReply};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;

/// A named edgequake-llm provider bound to one model.
pub struct EdgequakeModel {
    provider: Arc<dyn LLMProvider>,
    name: String,
    options: CompletionOptions,
}

impl EdgequakeModel {
    /// Wrap an already-constructed provider.
    pub fn new(provider: Arc<dyn LLMProvider>, name: impl Into<String>) -> Self {
        Self {
            provider,
            name: name.into(),
            options: CompletionOptions::default(),
        }
    }

    /// Create `provider_name` through the factory, which reads the
    /// provider's API key from its usual environment variable.
    pub fn from_config(
        provider_name: &str,
        config: &EvaluationConfig,
    ) -> Result<Self, EvaluationError> {
        let provider = ProviderFactory::create_llm_provider(provider_name, &config.model)
            .map_err(|e| EvaluationError::ProviderNotConfigured {
                provider: provider_name.to_string(),
                hint: format!("{e}"),
            })?;

        Ok(Self {
            provider,
            name: format!("{}/{}", provider_name, config.model),
            options: build_options(config),
        })
    }
}

#[async_trait]
impl GenerativeModel for EdgequakeModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, parts: &[ContentPart]) -> Result<ModelReply, ProviderError> {
        let messages = build_messages(parts);
        let response = self
            .provider
            .chat(&messages, Some(&self.options))
            .await
            .map_err(|e| ProviderError::Api {
                status: None,
                message: e.to_string(),
            })?;

        Ok(ModelReply {
            text: response.content,
            input_tokens: Some(response.prompt_tokens as u64),
            output_tokens: Some(response.completion_tokens as u64),
        })
    }
}

fn build_messages(parts: &[ContentPart]) -> Vec<ChatMessage> {
    parts
        .iter()
        .map(|part| match part {
            ContentPart::Text(text) => ChatMessage::user(text.as_str()),
            ContentPart::Image(image) => {
                ChatMessage::user_with_images("", vec![image.to_image_data()])
            }
        })
        .collect()
}

fn build_options(config: &EvaluationConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: config.temperature,
        max_tokens: config.max_output_tokens.map(|n| n as usize),
        ..Default::default()
    }
}
