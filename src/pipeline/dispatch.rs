//! Model dispatch: send job description, résumé image and prompt to the model.
//!
//! The request is three ordered content parts:
//!
//! 1. **Text**: the job description as the user typed it
//! 2. **Image**: page one of the résumé as base64 JPEG
//! 3. **Text**: the instruction template of the selected action
//!
//! Exactly one call is made. There is no retry, no timeout beyond the
//! client's defaults and no caching; a failure comes back as
//! [`EvaluationError::ProviderCallError`] and the user decides whether to
//! try again.

use crate::error::{EvaluationError, ProviderError};
use crate::pipeline::encode::EncodedImagePart;
use crate::prompts::EvaluationPrompt;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, warn};

/// One unit of a multimodal request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    Image(EncodedImagePart),
}

impl ContentPart {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentPart::Text(t) => Some(t),
            ContentPart::Image(_) => None,
        }
    }

    pub fn as_image(&self) -> Option<&EncodedImagePart> {
        match self {
            ContentPart::Image(i) => Some(i),
            ContentPart::Text(_) => None,
        }
    }
}

/// What a model returned for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModelReply {
    /// The completion, untouched.
    pub text: String,
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
}

impl ModelReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// A multimodal text-generation backend.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Provider/model name for logs.
    fn name(&self) -> &str;

    /// Issue one generation request for the ordered `parts`.
    async fn generate(&self, parts: &[ContentPart]) -> Result<ModelReply, ProviderError>;
}

/// Build the ordered parts for one evaluation.
pub fn build_parts(
    job_description: &str,
    image: &EncodedImagePart,
    prompt: EvaluationPrompt,
) -> Vec<ContentPart> {
    vec![
        ContentPart::Text(job_description.to_string()),
        ContentPart::Image(image.clone()),
        ContentPart::Text(prompt.template().to_string()),
    ]
}

/// Send one evaluation request and return the model's reply verbatim.
pub async fn dispatch(
    model: &dyn GenerativeModel,
    job_description: &str,
    image: &EncodedImagePart,
    prompt: EvaluationPrompt,
) -> Result<ModelReply, EvaluationError> {
    let start = Instant::now();
    let parts = build_parts(job_description, image, prompt);

    match model.generate(&parts).await {
        Ok(reply) => {
            debug!(
                "{}: '{}' answered in {:?} ({:?} input tokens, {:?} output tokens)",
                model.name(),
                prompt.label(),
                start.elapsed(),
                reply.input_tokens,
                reply.output_tokens
            );
            Ok(reply)
        }
        Err(e) => {
            warn!("{}: '{}' failed: {}", model.name(), prompt.label(), e);
            Err(EvaluationError::ProviderCallError(e))
        }
    }
}
