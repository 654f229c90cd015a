//! Configuration for résumé evaluations.
//!
//! Everything an [`crate::Evaluator`] needs to know is held in one
//! [`EvaluationConfig`], built through [`EvaluationConfigBuilder`]. The
//! config is created once at startup, is read-only afterwards, and carries
//! the provider credential explicitly so nothing below it reads the
//! environment.

use crate::error::EvaluationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Base URL of the Gemini REST API.
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Which client talks to the model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelBackend {
    /// Google Gemini `generateContent` over REST. (default)
    #[default]
    Gemini,
    /// A provider created by name through `edgequake_llm::ProviderFactory`
    /// (e.g. "openai", "anthropic", "ollama"). Credentials are read by the
    /// factory from the provider's usual environment variable.
    Named(String),
}

impl ModelBackend {
    /// Parse a provider name; `"gemini"` selects the built-in REST client.
    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        if name.is_empty() || name.eq_ignore_ascii_case("gemini") {
            ModelBackend::Gemini
        } else {
            ModelBackend::Named(name.to_lowercase())
        }
    }

    /// Short name for logs.
    pub fn name(&self) -> &str {
        match self {
            ModelBackend::Gemini => "gemini",
            ModelBackend::Named(name) => name,
        }
    }
}

/// Configuration for an evaluation session.
///
/// # Example
/// ```rust
/// use ats_resume_expert::EvaluationConfig;
///
/// let config = EvaluationConfig::builder()
///     .api_key("my-key")
///     .model("gemini-2.0-flash")
///     .build()
///     .unwrap();
/// assert_eq!(config.model, "gemini-2.0-flash");
/// ```
#[derive(Clone)]
pub struct EvaluationConfig {
    /// Model client. Default: [`ModelBackend::Gemini`].
    pub backend: ModelBackend,

    /// Model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// Provider API key for the Gemini backend.
    ///
    /// Not validated: a missing key surfaces as an authentication failure
    /// on the first model call.
    pub api_key: Option<String>,

    /// Gemini API base URL. Default: [`DEFAULT_GEMINI_API_BASE`].
    pub api_base_url: String,

    /// Sampling temperature. `None` leaves the provider default in place.
    pub temperature: Option<f32>,

    /// Output token cap. `None` leaves the provider default in place.
    pub max_output_tokens: Option<u32>,

    /// Path to libpdfium, either the library file or its directory.
    /// `None` binds the system library.
    pub pdfium_library_path: Option<PathBuf>,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            backend: ModelBackend::default(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            api_base_url: DEFAULT_GEMINI_API_BASE.to_string(),
            temperature: None,
            max_output_tokens: None,
            pdfium_library_path: None,
        }
    }
}

impl fmt::Debug for EvaluationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluationConfig")
            .field("backend", &self.backend)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("pdfium_library_path", &self.pdfium_library_path)
            .finish()
    }
}

impl EvaluationConfig {
    /// Create a new builder for `EvaluationConfig`.
    pub fn builder() -> EvaluationConfigBuilder {
        EvaluationConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`EvaluationConfig`].
#[derive(Debug)]
pub struct EvaluationConfigBuilder {
    config: EvaluationConfig,
}

impl EvaluationConfigBuilder {
    pub fn backend(mut self, backend: ModelBackend) -> Self {
        self.config.backend = backend;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = Some(t.clamp(0.0, 2.0));
        self
    }

    pub fn max_output_tokens(mut self, n: u32) -> Self {
        self.config.max_output_tokens = Some(n.max(1));
        self
    }

    pub fn pdfium_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library_path = Some(path.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<EvaluationConfig, EvaluationError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(EvaluationError::InvalidConfig(
                "Model name must not be empty".into(),
            ));
        }
        if reqwest::Url::parse(&c.api_base_url).is_err() {
            return Err(EvaluationError::InvalidConfig(format!(
                "API base URL is not a valid URL: '{}'",
                c.api_base_url
            )));
        }
        Ok(self.config)
    }
}
