//! Model clients.
//!
//! [`gemini`] talks to Google's `generateContent` REST endpoint directly;
//! [`edgequake`] adapts any provider `edgequake_llm` can build by name.

pub mod edgequake;
pub mod gemini;

use crate::config::{EvaluationConfig, ModelBackend};
use crate::error::EvaluationError;
use crate::pipeline::dispatch::GenerativeModel;
use edgequake::EdgequakeModel;
use gemini::GeminiClient;
use std::sync::Arc;
use tracing::info;

/// Build the model client selected by `config.backend`.
pub fn resolve_model(config: &EvaluationConfig) -> Result<Arc<dyn GenerativeModel>, EvaluationError> {
    let model: Arc<dyn GenerativeModel> = match config.backend {
        ModelBackend::Gemini => Arc::new(GeminiClient::from_config(config)?),
        ModelBackend::Named(ref name) => Arc::new(EdgequakeModel::from_config(name, config)?),
    };
    info!("Model: {} via {}", config.model, config.backend.name());
    Ok(model)
}
