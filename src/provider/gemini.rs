//! Google Gemini `generateContent` client.
//!
//! One POST per evaluation to
//! `{base}/v1beta/models/{model}:generateContent`, authenticated with the
//! `x-goog-api-key` header. Parts are sent in the order they are given,
//! images as `inlineData`. The reply text is the concatenation of the text
//! parts of the first candidate.

use crate::config::EvaluationConfig;
use crate::error::{EvaluationError, ProviderError};
use crate::pipeline::dispatch::{ContentPart, GenerativeModel, ModelReply};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use tracing::debug;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Longest slice of a non-JSON error body echoed back in an error.
const MAX_ERROR_BODY: usize = 300;

/// Optional sampling knobs; omitted fields keep the model defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

impl GenerationConfig {
    fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.max_output_tokens.is_none()
    }
}

/// Gemini REST client. Cheap to clone.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
    endpoint: String,
    generation_config: GenerationConfig,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl GeminiClient {
    /// Create a client for `model` at `api_base_url` using `api_key`.
    pub fn new(
        api_key: Option<String>,
        model: &str,
        api_base_url: &str,
    ) -> Result<Self, EvaluationError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("ats-resume-expert/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| EvaluationError::Internal(format!("HTTP client: {e}")))?;

        let model = model.trim().trim_start_matches("models/").to_string();
        let endpoint = generate_content_url(api_base_url, &model);

        Ok(Self {
            http,
            api_key,
            model,
            endpoint,
            generation_config: GenerationConfig::default(),
        })
    }

    /// Create a client from the evaluation config.
    pub fn from_config(config: &EvaluationConfig) -> Result<Self, EvaluationError> {
        Ok(
            Self::new(config.api_key.clone(), &config.model, &config.api_base_url)?
                .with_generation_config(GenerationConfig {
                    temperature: config.temperature,
                    max_output_tokens: config.max_output_tokens,
                }),
        )
    }

    pub fn with_generation_config(mut self, generation_config: GenerationConfig) -> Self {
        self.generation_config = generation_config;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, parts: &[ContentPart]) -> Result<ModelReply, ProviderError> {
        let body = serde_json::to_vec(&build_request(parts, &self.generation_config)).map_err(
            |e| ProviderError::Api {
                status: None,
                message: format!("request could not be serialised: {e}"),
            },
        )?;
        debug!("POST {} ({} bytes)", self.endpoint, body.len());

        let mut request = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(ref key) = self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request.send().await.map_err(|e| ProviderError::Network {
            detail: e.to_string(),
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| ProviderError::Network {
            detail: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(error_from_response(status.as_u16(), &bytes));
        }

        let parsed: GenerateContentResponse =
            serde_json::from_slice(&bytes).map_err(|e| ProviderError::MalformedResponse {
                detail: e.to_string(),
            })?;

        extract_reply(parsed)
    }
}

// ── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<&'a GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Text {
        text: &'a str,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u64>,
    candidates_token_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    status: Option<String>,
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn generate_content_url(api_base_url: &str, model: &str) -> String {
    format!(
        "{}/v1beta/models/{}:generateContent",
        api_base_url.trim_end_matches('/'),
        model
    )
}

fn build_request<'a>(
    parts: &'a [ContentPart],
    generation_config: &'a GenerationConfig,
) -> GenerateContentRequest<'a> {
    let parts = parts
        .iter()
        .map(|part| match part {
            ContentPart::Text(text) => RequestPart::Text { text },
            ContentPart::Image(image) => RequestPart::InlineData {
                inline_data: InlineData {
                    mime_type: &image.mime_type,
                    data: &image.data,
                },
            },
        })
        .collect();

    GenerateContentRequest {
        contents: vec![RequestContent { role: "user", parts }],
        generation_config: (!generation_config.is_empty()).then_some(generation_config),
    }
}

fn extract_reply(response: GenerateContentResponse) -> Result<ModelReply, ProviderError> {
    let GenerateContentResponse {
        candidates,
        prompt_feedback,
        usage_metadata,
    } = response;

    if let Some(reason) = prompt_feedback.and_then(|f| f.block_reason) {
        return Err(ProviderError::Blocked { reason });
    }

    let candidate =
        candidates
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::MalformedResponse {
                detail: "response contained no candidates".to_string(),
            })?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(match candidate.finish_reason {
            Some(reason) if reason != "STOP" => ProviderError::Blocked { reason },
            _ => ProviderError::MalformedResponse {
                detail: "candidate contained no text".to_string(),
            },
        });
    }

    let (input_tokens, output_tokens) = usage_metadata
        .map(|u| (u.prompt_token_count, u.candidates_token_count))
        .unwrap_or_default();

    Ok(ModelReply {
        text,
        input_tokens,
        output_tokens,
    })
}

fn error_from_response(status: u16, body: &[u8]) -> ProviderError {
    let (message, status_text) = match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(envelope) => (envelope.error.message, envelope.error.status),
        Err(_) => {
            let raw = String::from_utf8_lossy(body);
            let raw = raw.trim();
            let message = if raw.is_empty() {
                format!("HTTP {status}")
            } else {
                raw.chars().take(MAX_ERROR_BODY).collect()
            };
            (message, None)
        }
    };

    let status_text = status_text.as_deref().unwrap_or("");
    match status {
        401 | 403 => ProviderError::Auth { detail: message },
        429 => ProviderError::RateLimited { detail: message },
        _ if matches!(status_text, "UNAUTHENTICATED" | "PERMISSION_DENIED")
            || message.contains("API key not valid") =>
        {
            ProviderError::Auth { detail: message }
        }
        _ if status_text == "RESOURCE_EXHAUSTED" => ProviderError::RateLimited { detail: message },
        _ => ProviderError::Api {
            status: Some(status),
            message,
        },
    }
}
