//! Integration tests for the evaluation pipeline.
//!
//! Tests that render real PDFs need a pdfium library. They bind the one at
//! `PDFIUM_LIB_PATH` (or the system library) and print `SKIP` when none can
//! be found. The live Gemini test is additionally gated behind
//! `E2E_ENABLED` and `GOOGLE_API_KEY`.
//!
//! Run with:
//!   PDFIUM_LIB_PATH=/path/to/lib cargo test --test pipeline -- --nocapture

use async_trait::async_trait;
use ats_resume_expert::pipeline::encode::encode_page;
use ats_resume_expert::pipeline::render::{bind_pdfium, rasterize_first_page};
use ats_resume_expert::{
    render_outcome, ContentPart, EvaluationConfig, EvaluationError, EvaluationPrompt, Evaluator,
    GenerativeModel, ModelReply, ProviderError, ResumeDocument, NO_FILE_MESSAGE,
};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

// ── Test helpers ─────────────────────────────────────────────────────────────

fn pdfium_library_path() -> Option<PathBuf> {
    std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from)
}

macro_rules! skip_unless_pdfium {
    () => {{
        if let Err(e) = bind_pdfium(pdfium_library_path().as_deref()) {
            println!("SKIP — pdfium library not available: {e}");
            return;
        }
    }};
}

/// Build a PDF with one blank page per `(width, height)` in points.
fn build_pdf(page_sizes: &[(u32, u32)]) -> Vec<u8> {
    let kids: Vec<String> = (0..page_sizes.len())
        .map(|i| format!("{} 0 R", i + 3))
        .collect();

    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            page_sizes.len()
        ),
    ];
    for (w, h) in page_sizes {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {w} {h}] /Resources << >> >>"
        ));
    }

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_offset = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        )
        .as_bytes(),
    );
    out
}

struct ScriptedModel {
    calls: Mutex<Vec<Vec<ContentPart>>>,
    reply: Result<ModelReply, ProviderError>,
}

impl ScriptedModel {
    fn answering(text: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            reply: Ok(ModelReply::text(text)),
        })
    }

    fn failing(err: ProviderError) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            reply: Err(err),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, parts: &[ContentPart]) -> Result<ModelReply, ProviderError> {
        self.calls.lock().unwrap().push(parts.to_vec());
        self.reply.clone()
    }
}

fn config() -> EvaluationConfig {
    let mut builder = EvaluationConfig::builder().api_key("test-key");
    if let Some(path) = pdfium_library_path() {
        builder = builder.pdfium_library_path(path);
    }
    builder.build().unwrap()
}

// ── Without pdfium ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_no_file_for_every_action() {
    let model = ScriptedModel::answering("unused");
    let evaluator = Evaluator::new(config(), model.clone());

    for prompt in EvaluationPrompt::ALL {
        let outcome = evaluator
            .evaluate("Seeking a Python backend engineer", None, prompt)
            .await;
        let shown = render_outcome(prompt, &outcome);
        assert_eq!(shown.body, NO_FILE_MESSAGE);
        assert_eq!(shown.body, "Please upload the resume.");
    }
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn test_non_pdf_upload_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"Jane Doe\nSenior Engineer\n").unwrap();

    let err = ResumeDocument::from_path(file.path()).await.unwrap_err();
    assert!(matches!(err, EvaluationError::DocumentParseError { .. }));

    let shown = render_outcome(EvaluationPrompt::FitReview, &Err(err));
    assert!(shown.body.starts_with("Error processing PDF: "));
}

// ── With pdfium ──────────────────────────────────────────────────────────────

#[test]
fn test_first_page_renders_at_native_size() {
    skip_unless_pdfium!();
    let pdfium = bind_pdfium(pdfium_library_path().as_deref()).unwrap();

    // Page two is larger; only page one must be rendered.
    let pdf = build_pdf(&[(612, 792), (842, 1191)]);
    let page = rasterize_first_page(&pdfium, &pdf).expect("render page one");
    assert_eq!((page.width(), page.height()), (612, 792));

    let part = encode_page(&page).unwrap();
    let jpeg = part.decode().unwrap();
    let decoded = image::load_from_memory(&jpeg).unwrap().to_rgb8();
    assert_eq!(decoded.dimensions(), (612, 792));
}

#[test]
fn test_zero_page_pdf_is_a_parse_error() {
    skip_unless_pdfium!();
    let pdfium = bind_pdfium(pdfium_library_path().as_deref()).unwrap();

    let err = rasterize_first_page(&pdfium, &build_pdf(&[])).unwrap_err();
    assert!(matches!(err, EvaluationError::DocumentParseError { .. }));
}

#[tokio::test]
async fn test_malformed_pdf_never_reaches_model() {
    skip_unless_pdfium!();
    let model = ScriptedModel::answering("unused");
    let evaluator = Evaluator::new(config(), model.clone());

    let doc = ResumeDocument::from_bytes(b"%PDF-1.7\n1 0 obj garbage".to_vec()).unwrap();
    let outcome = evaluator
        .evaluate("jd", Some(&doc), EvaluationPrompt::PercentageMatch)
        .await;

    assert!(matches!(outcome, Err(EvaluationError::DocumentParseError { .. })));
    assert!(render_outcome(EvaluationPrompt::PercentageMatch, &outcome)
        .body
        .starts_with("Error processing PDF: "));
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn test_percentage_match_from_file() {
    skip_unless_pdfium!();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&build_pdf(&[(612, 792)])).unwrap();

    let model = ScriptedModel::answering("Percentage match: 71%\n\nMissing keywords: Django, Celery");
    let evaluator = Evaluator::new(config(), model.clone());
    let resume = ResumeDocument::from_path(file.path()).await.unwrap();

    let outcome = evaluator
        .evaluate(
            "Seeking a Python backend engineer",
            Some(&resume),
            EvaluationPrompt::PercentageMatch,
        )
        .await;
    let shown = render_outcome(EvaluationPrompt::PercentageMatch, &outcome);
    assert_eq!(shown.heading, Some("The Response is:"));
    assert_eq!(
        shown.body,
        "Percentage match: 71%\n\nMissing keywords: Django, Celery"
    );

    let calls = model.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let parts = &calls[0];
    assert_eq!(parts[0].as_text(), Some("Seeking a Python backend engineer"));
    assert_eq!(
        parts[2].as_text(),
        Some(EvaluationPrompt::PercentageMatch.template())
    );

    let image = parts[1].as_image().expect("image part");
    let decoded = image::load_from_memory(&image.decode().unwrap())
        .unwrap()
        .to_rgb8();
    assert_eq!(decoded.dimensions(), (612, 792));
}

#[tokio::test]
async fn test_provider_failure_is_displayed_not_fatal() {
    skip_unless_pdfium!();
    let model = ScriptedModel::failing(ProviderError::RateLimited {
        detail: "Resource has been exhausted".into(),
    });
    let evaluator = Evaluator::new(config(), model.clone());
    let resume = ResumeDocument::from_bytes(build_pdf(&[(612, 792)])).unwrap();

    for _ in 0..2 {
        let outcome = evaluator
            .evaluate("jd", Some(&resume), EvaluationPrompt::SkillImprovement)
            .await;
        let shown = render_outcome(EvaluationPrompt::SkillImprovement, &outcome);
        assert!(
            shown.body.starts_with("Error in generating response: "),
            "{}",
            shown.body
        );
    }
    assert_eq!(model.call_count(), 2);
}

// ── Live provider ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_live_gemini_fit_review() {
    if std::env::var("E2E_ENABLED").is_err() {
        println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
        return;
    }
    let Ok(key) = std::env::var("GOOGLE_API_KEY") else {
        println!("SKIP — GOOGLE_API_KEY not set");
        return;
    };
    skip_unless_pdfium!();

    let mut builder = EvaluationConfig::builder().api_key(key);
    if let Some(path) = pdfium_library_path() {
        builder = builder.pdfium_library_path(path);
    }
    let evaluator = Evaluator::from_config(builder.build().unwrap()).unwrap();
    let resume = ResumeDocument::from_bytes(build_pdf(&[(612, 792)])).unwrap();

    let evaluation = evaluator
        .evaluate(
            "Seeking a Python backend engineer",
            Some(&resume),
            EvaluationPrompt::FitReview,
        )
        .await
        .expect("live Gemini call");
    assert!(!evaluation.text.trim().is_empty());
    println!("{}", evaluation.text);
}
