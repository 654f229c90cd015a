//! CLI binary for ats-resume-expert.
//!
//! Plays the part of the UI: collects the job description and the résumé,
//! exposes the three actions, and prints the heading and answer (or the
//! fixed error strings) for each one.

use anyhow::{Context, Result};
use ats_resume_expert::{
    render_outcome, EvaluationConfig, EvaluationError, EvaluationPrompt, EvaluationStats,
    Evaluator, ModelBackend, Rendered, ResumeDocument,
};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Percentage match for one résumé
  ats-expert --job-file job.txt --resume resume.pdf --action percentage-match

  # Job description from stdin
  pbpaste | ats-expert --job-file - --resume resume.pdf --action fit-review

  # Menu with all three actions
  ats-expert --interactive --resume resume.pdf

  # Structured output
  ats-expert -j "Seeking a Python backend engineer" -r resume.pdf -a improve-skills --json

ACTIONS:
  fit-review        Tell Me About the Resume
  improve-skills    How Can I Improve My Skills
  percentage-match  Percentage Match

ENVIRONMENT VARIABLES:
  GOOGLE_API_KEY    Gemini API key
  ATS_MODEL         Model ID (default: gemini-2.0-flash)
  ATS_PROVIDER      gemini (default), or any edgequake-llm provider name
                    (openai, anthropic, ollama, ...) using its own key variable
  ATS_API_BASE      Gemini API base URL
  PDFIUM_LIB_PATH   Directory or file of an existing libpdfium

  Variables are also read from a .env file in the working directory.
"#;

/// Evaluate a résumé PDF against a job description with a multimodal LLM.
#[derive(Parser, Debug)]
#[command(
    name = "ats-expert",
    version,
    about = "Evaluate a résumé PDF against a job description with a multimodal LLM",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Job description text.
    #[arg(short, long, conflicts_with = "job_file")]
    job_description: Option<String>,

    /// Read the job description from a file (`-` for stdin).
    #[arg(long)]
    job_file: Option<PathBuf>,

    /// One-page résumé PDF.
    #[arg(short, long)]
    resume: Option<PathBuf>,

    /// Evaluation to run.
    #[arg(short, long, value_enum, required_unless_present = "interactive")]
    action: Option<ActionArg>,

    /// Show a menu and run actions until `q`.
    #[arg(short, long, conflicts_with = "action")]
    interactive: bool,

    /// Model ID.
    #[arg(long, env = "ATS_MODEL")]
    model: Option<String>,

    /// Model provider: gemini, or an edgequake-llm provider name.
    #[arg(long, env = "ATS_PROVIDER", default_value = "gemini")]
    provider: String,

    /// Gemini API key.
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Gemini API base URL.
    #[arg(long, env = "ATS_API_BASE")]
    api_base: Option<String>,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, env = "ATS_TEMPERATURE")]
    temperature: Option<f32>,

    /// Max output tokens.
    #[arg(long, env = "ATS_MAX_TOKENS")]
    max_tokens: Option<u32>,

    /// Directory or file of libpdfium.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib_path: Option<PathBuf>,

    /// Print a JSON report instead of text.
    #[arg(long)]
    json: bool,

    /// Disable the spinner.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress everything except the answer and errors.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ActionArg {
    FitReview,
    ImproveSkills,
    PercentageMatch,
}

impl From<ActionArg> for EvaluationPrompt {
    fn from(v: ActionArg) -> Self {
        match v {
            ActionArg::FitReview => EvaluationPrompt::FitReview,
            ActionArg::ImproveSkills => EvaluationPrompt::SkillImprovement,
            ActionArg::PercentageMatch => EvaluationPrompt::PercentageMatch,
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    action: EvaluationPrompt,
    label: &'static str,
    #[serde(flatten)]
    rendered: &'a Rendered,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<&'a EvaluationStats>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner covers the wait; INFO logs would tear through it.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    if cli.interactive && cli.job_file.as_deref() == Some(Path::new("-")) {
        anyhow::bail!("--job-file - cannot be combined with --interactive (stdin is the menu)");
    }

    let config = build_config(&cli)?;
    let evaluator = Evaluator::from_config(config).context("Failed to set up the model")?;

    let mut job_description = read_job_description(&cli).await?;

    if let Some(ref path) = cli.resume {
        if ResumeDocument::from_path(path).await.is_ok() && !cli.quiet && !cli.json {
            eprintln!("{} PDF Uploaded Successfully", green("✔"));
        }
    }

    if !cli.interactive {
        let prompt = match cli.action {
            Some(action) => EvaluationPrompt::from(action),
            None => anyhow::bail!("--action is required without --interactive"),
        };
        let failed = run_action(&evaluator, &cli, &job_description, prompt, show_progress).await?;
        return Ok(if failed {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        });
    }

    // ── Interactive mode ─────────────────────────────────────────────────
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if job_description.is_empty() {
        job_description = read_job_description_interactively(&mut lines).await?;
    }

    loop {
        print_menu();
        let Some(choice) = lines.next_line().await.context("Failed to read from stdin")? else {
            break;
        };
        let prompt = match choice.trim() {
            "1" => EvaluationPrompt::FitReview,
            "2" => EvaluationPrompt::SkillImprovement,
            "3" => EvaluationPrompt::PercentageMatch,
            "q" | "Q" | "quit" | "exit" => break,
            "" => continue,
            other => {
                eprintln!("{} unknown choice '{}'", red("✘"), other);
                continue;
            }
        };
        run_action(&evaluator, &cli, &job_description, prompt, show_progress).await?;
    }

    Ok(ExitCode::SUCCESS)
}

/// Run one action and print its outcome. Returns `true` if the outcome was
/// an error.
async fn run_action(
    evaluator: &Evaluator,
    cli: &Cli,
    job_description: &str,
    prompt: EvaluationPrompt,
    show_progress: bool,
) -> Result<bool> {
    let spinner = show_progress.then(|| spinner(prompt));

    // The résumé is read again on every trigger.
    let outcome = match load_resume(cli.resume.as_deref()).await {
        Ok(resume) => {
            evaluator
                .evaluate(job_description, resume.as_ref(), prompt)
                .await
        }
        Err(e) => Err(e),
    };

    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }

    let rendered = render_outcome(prompt, &outcome);
    let stats = outcome.as_ref().ok().map(|e| &e.stats);

    if cli.json {
        let report = JsonReport {
            action: prompt,
            label: prompt.label(),
            rendered: &rendered,
            stats,
        };
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    } else {
        print_rendered(&rendered)?;
        if let (Some(stats), false) = (stats, cli.quiet) {
            eprintln!(
                "   {}",
                dim(&format!(
                    "{}x{} px page  ·  {} tokens in / {} tokens out  ·  {}ms",
                    stats.image_width,
                    stats.image_height,
                    token_count(stats.input_tokens),
                    token_count(stats.output_tokens),
                    stats.total_duration_ms
                ))
            );
        }
    }

    Ok(rendered.is_error)
}

async fn load_resume(path: Option<&Path>) -> Result<Option<ResumeDocument>, EvaluationError> {
    match path {
        Some(path) => ResumeDocument::from_path(path).await.map(Some),
        None => Ok(None),
    }
}

fn print_rendered(rendered: &Rendered) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Some(heading) = rendered.heading {
        writeln!(out, "{}", bold(heading)).context("Failed to write to stdout")?;
    }

    if rendered.is_error {
        out.flush().ok();
        eprintln!("{}", red(&rendered.body));
    } else {
        out.write_all(rendered.body.as_bytes())
            .context("Failed to write to stdout")?;
        if !rendered.body.ends_with('\n') {
            out.write_all(b"\n").ok();
        }
    }
    Ok(())
}

fn print_menu() {
    eprintln!();
    for (i, prompt) in EvaluationPrompt::ALL.iter().enumerate() {
        eprintln!("  {} {}", cyan(&format!("{})", i + 1)), prompt.label());
    }
    eprintln!("  {} Quit", cyan("q)"));
    eprint!("{} ", bold(">"));
    io::stderr().flush().ok();
}

fn spinner(prompt: EvaluationPrompt) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_prefix(prompt.label());
    bar.set_message("waiting for the model…");
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

fn token_count(n: Option<u64>) -> String {
    n.map(|n| n.to_string()).unwrap_or_else(|| "?".to_string())
}

/// Map CLI args to `EvaluationConfig`.
fn build_config(cli: &Cli) -> Result<EvaluationConfig> {
    let mut builder = EvaluationConfig::builder().backend(ModelBackend::from_name(&cli.provider));

    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(key) = cli.api_key.as_deref().filter(|k| !k.is_empty()) {
        builder = builder.api_key(key);
    }
    if let Some(ref base) = cli.api_base {
        builder = builder.api_base_url(base);
    }
    if let Some(t) = cli.temperature {
        builder = builder.temperature(t);
    }
    if let Some(n) = cli.max_tokens {
        builder = builder.max_output_tokens(n);
    }
    if let Some(ref path) = cli.pdfium_lib_path {
        builder = builder.pdfium_library_path(path);
    }

    builder.build().context("Invalid configuration")
}

async fn read_job_description(cli: &Cli) -> Result<String> {
    if let Some(ref text) = cli.job_description {
        return Ok(text.clone());
    }
    match cli.job_file {
        Some(ref path) if path.as_os_str() == "-" => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("Failed to read job description from stdin")?;
            Ok(text)
        }
        Some(ref path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read job description from {:?}", path)),
        None => Ok(String::new()),
    }
}

/// Collect a job description line by line until an empty line.
async fn read_job_description_interactively(lines: &mut Lines<BufReader<Stdin>>) -> Result<String> {
    eprintln!(
        "{} {}",
        bold("Job Description:"),
        dim("(finish with an empty line)")
    );
    let mut text = String::new();
    while let Some(line) = lines.next_line().await.context("Failed to read from stdin")? {
        if line.trim().is_empty() {
            break;
        }
        text.push_str(&line);
        text.push('\n');
    }
    Ok(text)
}
