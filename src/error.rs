//! Error types for the ats-resume-expert library.
//!
//! Two error types mirror the two halves of an evaluation:
//!
//! * [`EvaluationError`]: everything that can stop a single evaluation:
//!   no résumé supplied, a PDF that will not open or render, a JPEG encode
//!   failure, or a failed model call. Returned as `Err(EvaluationError)` from
//!   [`crate::Evaluator::evaluate`].
//!
//! * [`ProviderError`]: what went wrong on the model-provider side of the
//!   wire. Carried inside [`EvaluationError::ProviderCallError`].
//!
//! None of these strings are meant for end users verbatim; the
//! [`crate::display`] module decides what the user sees for each kind.

use std::path::PathBuf;
use thiserror::Error;

/// All errors an evaluation can end with.
#[derive(Debug, Error)]
pub enum EvaluationError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// An action was triggered before a résumé PDF was supplied.
    #[error("No résumé PDF was provided")]
    NoFileProvided,

    /// The résumé path could not be read.
    #[error("Failed to read résumé '{path}': {source}")]
    ResumeReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// The bytes are not a PDF, pdfium could not open them, or the
    /// document has no pages.
    #[error("Document could not be parsed: {detail}")]
    DocumentParseError { detail: String },

    /// No pdfium library could be bound.
    #[error(
        "Failed to bind to pdfium library: {detail}\n\
Set PDFIUM_LIB_PATH (or --pdfium-lib-path) to the directory or file holding libpdfium."
    )]
    RendererUnavailable { detail: String },

    /// The rendered page could not be encoded as JPEG.
    #[error("Image encoding failed: {detail}")]
    ImageEncodeError { detail: String },

    // ── Provider errors ───────────────────────────────────────────────────
    /// The model provider call failed.
    #[error("Model provider call failed: {0}")]
    ProviderCallError(#[from] ProviderError),

    /// A named provider could not be constructed (unknown name, missing key).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EvaluationError {
    /// `true` for failures raised while turning the résumé into an image.
    ///
    /// These all render as the same upload error in the UI.
    pub fn is_document_error(&self) -> bool {
        matches!(
            self,
            EvaluationError::ResumeReadFailed { .. }
                | EvaluationError::DocumentParseError { .. }
                | EvaluationError::RendererUnavailable { .. }
                | EvaluationError::ImageEncodeError { .. }
                | EvaluationError::Internal(_)
        )
    }
}

/// A failed call to the generative-model provider.
///
/// The variants exist for logging; the UI renders every one of them the
/// same way and the user retries by triggering the action again.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// HTTP 401/403: missing or rejected API key.
    #[error("authentication failed: {detail}")]
    Auth { detail: String },

    /// HTTP 429: quota or rate limit exhausted.
    #[error("rate limit or quota exceeded: {detail}")]
    RateLimited { detail: String },

    /// The request never produced an HTTP response.
    #[error("network failure: {detail}")]
    Network { detail: String },

    /// The provider answered, but not with anything we could read.
    #[error("malformed response: {detail}")]
    MalformedResponse { detail: String },

    /// The provider refused to answer the prompt.
    #[error("prompt was blocked: {reason}")]
    Blocked { reason: String },

    /// Any other provider-side error.
    #[error("{}", api_message(.status, .message))]
    Api { status: Option<u16>, message: String },
}

fn api_message(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(s) => format!("API error (HTTP {s}): {message}"),
        None => format!("API error: {message}"),
    }
}
