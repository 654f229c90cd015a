//! # ats-resume-expert
//!
//! Evaluate a one-page résumé against a job description with a multimodal
//! language model.
//!
//! The résumé PDF is never parsed for text. Page one is rasterised, encoded
//! as JPEG and sent to the model as an image next to the job description and
//! one of three fixed instructions, so the model reads the layout the way a
//! recruiter would.
//!
//! ## Pipeline Overview
//!
//! ```text
//! job description + résumé PDF + action
//!  │
//!  ├─ 1. Input     no résumé? stop with NoFileProvided
//!  ├─ 2. Render    page 0 via pdfium at native size (spawn_blocking)
//!  ├─ 3. Encode    RGB → JPEG → base64 image part
//!  ├─ 4. Dispatch  [text, image, prompt] → one model call
//!  └─ 5. Display   heading + verbatim answer, or a fixed error string
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ats_resume_expert::{EvaluationConfig, EvaluationPrompt, Evaluator, ResumeDocument};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EvaluationConfig::builder()
//!         .api_key(std::env::var("GOOGLE_API_KEY")?)
//!         .build()?;
//!     let evaluator = Evaluator::from_config(config)?;
//!
//!     let resume = ResumeDocument::from_path("resume.pdf").await?;
//!     let evaluation = evaluator
//!         .evaluate(
//!             "Seeking a Python backend engineer",
//!             Some(&resume),
//!             EvaluationPrompt::PercentageMatch,
//!         )
//!         .await?;
//!     println!("{}", evaluation.text);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `ats-expert` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod display;
pub mod error;
pub mod evaluate;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod provider;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{EvaluationConfig, EvaluationConfigBuilder, ModelBackend};
pub use display::{render_outcome, Rendered, NO_FILE_MESSAGE};
pub use error::{EvaluationError, ProviderError};
pub use evaluate::Evaluator;
pub use output::{Evaluation, EvaluationStats};
pub use pipeline::dispatch::{ContentPart, GenerativeModel, ModelReply};
pub use pipeline::encode::EncodedImagePart;
pub use pipeline::input::ResumeDocument;
pub use pipeline::render::{FirstPageRenderer, PdfiumRenderer, RenderedPage};
pub use prompts::EvaluationPrompt;
