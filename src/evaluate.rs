//! Evaluation entry points.
//!
//! One [`Evaluator`] is built at startup and reused for every action. Each
//! call to [`Evaluator::evaluate`] runs the whole pipeline once: the résumé
//! is re-parsed and re-rendered on every trigger and nothing is cached
//! between calls.

use crate::config::EvaluationConfig;
use crate::error::EvaluationError;
use crate::output::{Evaluation, EvaluationStats};
use crate::pipeline::dispatch::{self, GenerativeModel};
use crate::pipeline::encode::{self, EncodedImagePart};
use crate::pipeline::input::ResumeDocument;
use crate::pipeline::render::{self, FirstPageRenderer, PdfiumRenderer};
use crate::prompts::EvaluationPrompt;
use crate::provider;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Runs evaluations against one model with one renderer.
#[derive(Clone)]
pub struct Evaluator {
    config: EvaluationConfig,
    model: Arc<dyn GenerativeModel>,
    renderer: Arc<dyn FirstPageRenderer>,
}

impl std::fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Evaluator")
            .field("config", &self.config)
            .field("model", &self.model.name())
            .finish_non_exhaustive()
    }
}

impl Evaluator {
    /// Use `model` for every call; the renderer is pdfium, bound as
    /// `config.pdfium_library_path` says.
    pub fn new(config: EvaluationConfig, model: Arc<dyn GenerativeModel>) -> Self {
        let renderer: Arc<dyn FirstPageRenderer> = match config.pdfium_library_path {
            Some(ref path) => Arc::new(PdfiumRenderer::with_library_path(path)),
            None => Arc::new(PdfiumRenderer::system()),
        };
        Self {
            config,
            model,
            renderer,
        }
    }

    /// Build the model client named by `config.backend`.
    pub fn from_config(config: EvaluationConfig) -> Result<Self, EvaluationError> {
        let model = provider::resolve_model(&config)?;
        Ok(Self::new(config, model))
    }

    /// Replace the page renderer.
    pub fn with_renderer(mut self, renderer: Arc<dyn FirstPageRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Run one action.
    ///
    /// # Errors
    /// - [`EvaluationError::NoFileProvided`] when `resume` is `None`; the
    ///   model is not called.
    /// - Rasteriser errors (`DocumentParseError`, `RendererUnavailable`,
    ///   `ImageEncodeError`, `Internal`); the model is not called.
    /// - [`EvaluationError::ProviderCallError`] when the model call fails.
    pub async fn evaluate(
        &self,
        job_description: &str,
        resume: Option<&ResumeDocument>,
        prompt: EvaluationPrompt,
    ) -> Result<Evaluation, EvaluationError> {
        let total_start = Instant::now();

        let Some(resume) = resume else {
            warn!("'{}' triggered with no résumé uploaded", prompt.label());
            return Err(EvaluationError::NoFileProvided);
        };
        info!(
            "Evaluating '{}' ({} byte résumé, {} char job description)",
            prompt.label(),
            resume.len(),
            job_description.chars().count()
        );

        // ── Step 1: Rasterise page one ───────────────────────────────────
        let render_start = Instant::now();
        let page = render::render_first_page(Arc::clone(&self.renderer), resume.clone()).await?;

        // ── Step 2: JPEG + base64 ────────────────────────────────────────
        let jpeg = encode::encode_jpeg(&page)?;
        let image = EncodedImagePart::from_jpeg(&jpeg);
        let render_duration = render_start.elapsed();
        debug!(
            "Page one: {}x{} px, {} JPEG bytes, prepared in {:?}",
            page.width(),
            page.height(),
            jpeg.len(),
            render_duration
        );

        // ── Step 3: One model call ───────────────────────────────────────
        let model_start = Instant::now();
        let reply =
            dispatch::dispatch(self.model.as_ref(), job_description, &image, prompt).await?;
        let model_duration = model_start.elapsed();

        let stats = EvaluationStats {
            image_width: page.width(),
            image_height: page.height(),
            jpeg_bytes: jpeg.len(),
            input_tokens: reply.input_tokens,
            output_tokens: reply.output_tokens,
            render_duration_ms: render_duration.as_millis() as u64,
            model_duration_ms: model_duration.as_millis() as u64,
            total_duration_ms: total_start.elapsed().as_millis() as u64,
        };
        info!(
            "'{}' done in {}ms ({} chars)",
            prompt.label(),
            stats.total_duration_ms,
            reply.text.len()
        );

        Ok(Evaluation {
            prompt,
            text: reply.text,
            stats,
        })
    }

    /// Synchronous wrapper around [`Evaluator::evaluate`].
    ///
    /// Creates a temporary tokio runtime internally.
    pub fn evaluate_sync(
        &self,
        job_description: &str,
        resume: Option<&ResumeDocument>,
        prompt: EvaluationPrompt,
    ) -> Result<Evaluation, EvaluationError> {
        tokio::runtime::Runtime::new()
            .map_err(|e| EvaluationError::Internal(format!("Failed to create tokio runtime: {}", e)))?
            .block_on(self.evaluate(job_description, resume, prompt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::pipeline::dispatch::{ContentPart, ModelReply};
    use crate::pipeline::render::RenderedPage;
    use async_trait::async_trait;
    use image::{Rgb, RgbImage};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakeRenderer {
        calls: AtomicUsize,
        fail: bool,
    }

    impl FakeRenderer {
        fn ok() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail: false,
            })
        }

        fn broken() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail: true,
            })
        }
    }

    impl FirstPageRenderer for FakeRenderer {
        fn render_first_page(&self, _pdf: &[u8]) -> Result<RenderedPage, EvaluationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(EvaluationError::DocumentParseError {
                    detail: "document has no pages".into(),
                });
            }
            Ok(RenderedPage {
                image: RgbImage::from_pixel(40, 52, Rgb([255, 255, 255])),
                page_width_points: 40.0,
                page_height_points: 52.0,
            })
        }
    }

    struct FakeModel {
        calls: Mutex<Vec<Vec<ContentPart>>>,
        reply: Result<ModelReply, ProviderError>,
    }

    impl FakeModel {
        fn answering(text: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                reply: Ok(ModelReply {
                    text: text.to_string(),
                    input_tokens: Some(1200),
                    output_tokens: Some(80),
                }),
            })
        }

        fn failing(err: ProviderError) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                reply: Err(err),
            })
        }

        fn calls(&self) -> Vec<Vec<ContentPart>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GenerativeModel for FakeModel {
        fn name(&self) -> &str {
            "fake"
        }

        async fn generate(&self, parts: &[ContentPart]) -> Result<ModelReply, ProviderError> {
            self.calls.lock().unwrap().push(parts.to_vec());
            self.reply.clone()
        }
    }

    fn evaluator(model: Arc<FakeModel>, renderer: Arc<FakeRenderer>) -> Evaluator {
        Evaluator::new(EvaluationConfig::default(), model).with_renderer(renderer)
    }

    fn resume() -> ResumeDocument {
        ResumeDocument::from_bytes(b"%PDF-1.4\n% fake resume".to_vec()).unwrap()
    }

    #[tokio::test]
    async fn no_file_never_calls_model() {
        let model = FakeModel::answering("unused");
        let renderer = FakeRenderer::ok();
        let ev = evaluator(model.clone(), renderer.clone());

        for prompt in EvaluationPrompt::ALL {
            let err = ev.evaluate("any job", None, prompt).await.unwrap_err();
            assert!(matches!(err, EvaluationError::NoFileProvided));
        }
        assert_eq!(model.calls().len(), 0);
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn percentage_match_sends_text_image_prompt() {
        let model = FakeModel::answering("Match: 64%\nMissing keywords: FastAPI, PostgreSQL");
        let ev = evaluator(model.clone(), FakeRenderer::ok());

        let out = ev
            .evaluate(
                "Seeking a Python backend engineer",
                Some(&resume()),
                EvaluationPrompt::PercentageMatch,
            )
            .await
            .unwrap();

        assert_eq!(out.text, "Match: 64%\nMissing keywords: FastAPI, PostgreSQL");
        assert_eq!(out.prompt, EvaluationPrompt::PercentageMatch);

        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        let parts = &calls[0];
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].as_text(), Some("Seeking a Python backend engineer"));
        assert_eq!(parts[1].as_image().map(|i| i.mime_type.as_str()), Some("image/jpeg"));
        assert_eq!(
            parts[2].as_text(),
            Some(EvaluationPrompt::PercentageMatch.template())
        );
    }

    #[tokio::test]
    async fn different_actions_change_only_the_prompt() {
        let model = FakeModel::answering("ok");
        let ev = evaluator(model.clone(), FakeRenderer::ok());
        let doc = resume();

        ev.evaluate("jd", Some(&doc), EvaluationPrompt::FitReview)
            .await
            .unwrap();
        ev.evaluate("jd", Some(&doc), EvaluationPrompt::SkillImprovement)
            .await
            .unwrap();

        let calls = model.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0][0], calls[1][0]);
        assert_eq!(calls[0][1], calls[1][1]);
        assert_ne!(calls[0][2], calls[1][2]);
        assert_eq!(calls[0][2].as_text(), Some(EvaluationPrompt::FitReview.template()));
        assert_eq!(
            calls[1][2].as_text(),
            Some(EvaluationPrompt::SkillImprovement.template())
        );
    }

    #[tokio::test]
    async fn every_trigger_re_renders() {
        let renderer = FakeRenderer::ok();
        let ev = evaluator(FakeModel::answering("ok"), renderer.clone());
        let doc = resume();

        for prompt in EvaluationPrompt::ALL {
            ev.evaluate("jd", Some(&doc), prompt).await.unwrap();
        }
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn render_failure_skips_model() {
        let model = FakeModel::answering("unused");
        let ev = evaluator(model.clone(), FakeRenderer::broken());

        let err = ev
            .evaluate("jd", Some(&resume()), EvaluationPrompt::FitReview)
            .await
            .unwrap_err();
        assert!(matches!(err, EvaluationError::DocumentParseError { .. }));
        assert!(model.calls().is_empty());
    }

    #[tokio::test]
    async fn provider_failure_is_typed() {
        let ev = evaluator(
            FakeModel::failing(ProviderError::Network {
                detail: "connection reset".into(),
            }),
            FakeRenderer::ok(),
        );
        let err = ev
            .evaluate("jd", Some(&resume()), EvaluationPrompt::PercentageMatch)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EvaluationError::ProviderCallError(ProviderError::Network { .. })
        ));
    }

    #[tokio::test]
    async fn stats_describe_the_rendered_page() {
        let ev = evaluator(FakeModel::answering("ok"), FakeRenderer::ok());
        let out = ev
            .evaluate("jd", Some(&resume()), EvaluationPrompt::FitReview)
            .await
            .unwrap();
        assert_eq!((out.stats.image_width, out.stats.image_height), (40, 52));
        assert!(out.stats.jpeg_bytes > 0);
        assert_eq!(out.stats.input_tokens, Some(1200));
        assert_eq!(out.stats.output_tokens, Some(80));
    }

    #[test]
    fn sync_wrapper_runs_outside_a_runtime() {
        let model = FakeModel::answering("sync ok");
        let ev = evaluator(model.clone(), FakeRenderer::ok());
        let out = ev
            .evaluate_sync("jd", Some(&resume()), EvaluationPrompt::SkillImprovement)
            .unwrap();
        assert_eq!(out.text, "sync ok");
        assert_eq!(model.calls().len(), 1);
    }
}
