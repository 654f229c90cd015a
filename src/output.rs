//! Result types for one evaluation.

use crate::prompts::EvaluationPrompt;
use serde::Serialize;

/// A completed evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    /// The action that produced this evaluation.
    pub prompt: EvaluationPrompt,
    /// The model's answer, exactly as returned.
    pub text: String,
    pub stats: EvaluationStats,
}

/// Measurements taken while producing an [`Evaluation`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EvaluationStats {
    /// Rendered page width in pixels.
    pub image_width: u32,
    /// Rendered page height in pixels.
    pub image_height: u32,
    /// Size of the JPEG before base64 encoding.
    pub jpeg_bytes: usize,
    /// Reported by the provider, when it reports usage.
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
    /// Time spent rasterising and encoding page one.
    pub render_duration_ms: u64,
    /// Time spent waiting on the model.
    pub model_duration_ms: u64,
    pub total_duration_ms: u64,
}
