//! What the user sees for each evaluation outcome.
//!
//! The library returns typed results; this module is the only place that
//! turns them into the fixed user-facing strings.

use crate::error::EvaluationError;
use crate::output::Evaluation;
use crate::prompts::EvaluationPrompt;
use serde::Serialize;

/// Shown when an action is triggered before a résumé is supplied.
pub const NO_FILE_MESSAGE: &str = "Please upload the resume.";

/// Prefix of every provider failure.
pub const PROVIDER_ERROR_PREFIX: &str = "Error in generating response: ";

/// Prefix of every failure to turn the résumé into an image.
pub const DOCUMENT_ERROR_PREFIX: &str = "Error processing PDF: ";

/// A displayable outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rendered {
    /// Heading printed above the body, if any.
    pub heading: Option<&'static str>,
    pub body: String,
    pub is_error: bool,
}

/// Map the outcome of `prompt` onto its heading and body.
pub fn render_outcome(
    prompt: EvaluationPrompt,
    outcome: &Result<Evaluation, EvaluationError>,
) -> Rendered {
    match outcome {
        Ok(evaluation) => Rendered {
            heading: Some(prompt.heading()),
            body: evaluation.text.clone(),
            is_error: false,
        },
        Err(EvaluationError::NoFileProvided) => Rendered {
            heading: None,
            body: NO_FILE_MESSAGE.to_string(),
            is_error: true,
        },
        Err(EvaluationError::ProviderCallError(cause)) => Rendered {
            heading: Some(prompt.heading()),
            body: format!("{PROVIDER_ERROR_PREFIX}{cause}"),
            is_error: true,
        },
        Err(e) => Rendered {
            heading: None,
            body: format!("{DOCUMENT_ERROR_PREFIX}{e}"),
            is_error: true,
        },
    }
}
