//! CLI binary for edgequake-media2doc.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ProcessorConfig`, runs one job, and prints the results.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_media2doc::{
    InputKind, Job, JobOutput, JobProgressCallback, MediaProcessor, ProcessorConfig,
    ProgressCallback, SourceLanguage, StageKind, StageStatus, TargetLanguage,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

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

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live bar over chunks, one log line per chunk
/// and per stage. Chunks may complete out of order.
struct CliProgressCallback {
    bar: ProgressBar,
    start_times: Mutex<HashMap<usize, Instant>>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    /// Spinner until `on_job_start` reports the chunk count.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading input…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
            errors: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} chunks  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Transcribing");
        self.bar.reset_eta();
    }

    fn elapsed_secs(&self, index: usize) -> f64 {
        self.start_times
            .lock()
            .ok()
            .and_then(|mut m| m.remove(&index))
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl JobProgressCallback for CliProgressCallback {
    fn on_job_start(&self, total_chunks: usize) {
        self.activate_bar(total_chunks);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Transcribing {total_chunks} chunk(s)…"))
        ));
    }

    fn on_chunk_start(&self, index: usize, _total: usize) {
        if let Ok(mut m) = self.start_times.lock() {
            m.insert(index, Instant::now());
        }
        self.bar.set_message(format!("chunk {}", index + 1));
    }

    fn on_chunk_complete(&self, index: usize, total: usize, text_len: usize) {
        let secs = self.elapsed_secs(index);
        self.bar.println(format!(
            "  {} Chunk {:>3}/{:<3}  {:<8}  {}",
            green("✓"),
            index + 1,
            total,
            dim(&format!("{text_len:>5} chars")),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_chunk_error(&self, index: usize, total: usize, error: &str) {
        let secs = self.elapsed_secs(index);
        self.errors.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let msg: String = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} Chunk {:>3}/{:<3}  {}  {}",
            red("✗"),
            index + 1,
            total,
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_stage_complete(&self, stage: StageKind, ok: bool) {
        self.bar.set_prefix("Processing");
        self.bar.println(format!(
            "  {} {}",
            if ok { green("✓") } else { red("✗") },
            stage
        ));
    }

    fn on_job_complete(&self, total_chunks: usize, failed_chunks: usize) {
        self.bar.finish_and_clear();
        if total_chunks == 0 {
            return;
        }
        let ok = total_chunks.saturating_sub(failed_chunks);
        if failed_chunks == 0 {
            eprintln!(
                "{} {} chunks transcribed successfully",
                green("✔"),
                bold(&ok.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} chunks transcribed  ({} failed)",
                if failed_chunks == total_chunks {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&ok.to_string()),
                total_chunks,
                red(&failed_chunks.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Transcribe a Tamil recording and translate it to English
  media2doc interview.wav --kind audio --lang ta-IN --translate-to en

  # Video: the audio track is extracted with ffmpeg first
  media2doc lecture.mp4 --kind video --lang hi-IN --translate-to hi

  # Documents skip transcription entirely
  media2doc minutes.docx --kind document --translate-to ta

  # Full structured output
  media2doc talk.mp3 --kind audio --json > talk.json

  # Retrieve a rendered artifact by name
  media2doc --fetch output_6f1c….pdf --save-to ./translated.pdf

  # Supported languages
  media2doc --list-languages

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI key (LLM and, if STT_API_KEY is unset, speech-to-text)
  ANTHROPIC_API_KEY       Anthropic API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  STT_API_URL             OpenAI-compatible transcription endpoint base URL
  STT_API_KEY             Transcription API key
  STT_MODEL               Transcription model (default whisper-1)
  PDFIUM_LIB_PATH         Directory containing libpdfium
  MEDIA2DOC_*             Any flag below, e.g. MEDIA2DOC_FONT=/usr/share/fonts/...

SETUP:
  1. Set API key:     export OPENAI_API_KEY=sk-...
  2. Install ffmpeg and libpdfium, and provide a font covering your target script
  3. Run:             media2doc talk.wav --kind audio --translate-to en
"#;

/// Transcribe, translate, summarise and render audio, video and documents.
#[derive(Parser, Debug)]
#[command(
    name = "media2doc",
    version,
    about = "Turn audio, video and documents into transcripts, translations, summaries and PDFs",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input file (audio, video, .docx or .pdf).
    #[arg(required_unless_present_any = ["fetch", "list_languages"])]
    input: Option<PathBuf>,

    /// Declared input kind: audio, video or document.
    #[arg(short, long, env = "MEDIA2DOC_KIND", default_value = "audio")]
    kind: String,

    /// Source language locale for speech recognition (e.g. en-US, ta-IN).
    #[arg(short, long, env = "MEDIA2DOC_LANG", default_value = "en-US")]
    lang: String,

    /// Target language code for translation (e.g. en, hi, ta).
    #[arg(short, long, env = "MEDIA2DOC_TRANSLATE_TO", default_value = "en")]
    translate_to: String,

    /// Directory rendered artifacts are written to.
    #[arg(short, long, env = "MEDIA2DOC_OUTPUT_DIR", default_value = "outputs")]
    output_dir: PathBuf,

    /// Directory for transient chunk and audio files (default: system temp).
    #[arg(long, env = "MEDIA2DOC_SCRATCH_DIR")]
    scratch_dir: Option<PathBuf>,

    /// TrueType font used for the output document; must cover the target script.
    #[arg(long, env = "MEDIA2DOC_FONT", default_value = "DejaVuSans.ttf")]
    font: PathBuf,

    /// Audio chunk length in milliseconds (min 1000).
    #[arg(long, env = "MEDIA2DOC_CHUNK_MS", default_value_t = 60_000)]
    chunk_ms: u64,

    /// Number of chunks transcribed concurrently (1 = strictly sequential).
    #[arg(short, long, env = "MEDIA2DOC_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Per-call timeout for every engine, in seconds.
    #[arg(long, env = "MEDIA2DOC_TIMEOUT", default_value_t = 120)]
    timeout: u64,

    /// LLM model ID for translation, summary and entities.
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "MEDIA2DOC_TEMPERATURE", default_value_t = 0.2)]
    temperature: f32,

    /// Speech-to-text API base URL.
    #[arg(long, env = "STT_API_URL")]
    stt_url: Option<String>,

    /// Speech-to-text model.
    #[arg(long, env = "STT_MODEL")]
    stt_model: Option<String>,

    /// Path to the ffmpeg executable.
    #[arg(long, env = "MEDIA2DOC_FFMPEG", default_value = "ffmpeg")]
    ffmpeg: PathBuf,

    /// Directory containing libpdfium.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Output structured JSON (JobOutput) instead of text.
    #[arg(long, env = "MEDIA2DOC_JSON")]
    json: bool,

    /// Fetch a rendered artifact by name instead of running a job.
    #[arg(long, requires = "save_to")]
    fetch: Option<String>,

    /// Where to write the fetched artifact.
    #[arg(long)]
    save_to: Option<PathBuf>,

    /// Print the supported source and target languages.
    #[arg(long)]
    list_languages: bool,

    /// Disable progress bar.
    #[arg(long, env = "MEDIA2DOC_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MEDIA2DOC_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MEDIA2DOC_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs unless --verbose.
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

    // ── Language table ───────────────────────────────────────────────────
    if cli.list_languages {
        print_languages();
        return Ok(());
    }

    // ── Artifact retrieval ───────────────────────────────────────────────
    if let Some(ref name) = cli.fetch {
        let save_to = cli.save_to.clone().context("--fetch needs --save-to")?;
        // Retrieval needs no engines: only the output directory.
        let config = build_config(&cli, None)?;
        let store = edgequake_media2doc::pipeline::artifact::ArtifactStore::new(
            config.output_dir.clone(),
            Arc::new(edgequake_media2doc::engines::PdfRenderer::new(&config.font_path, None)),
            config.capability_timeout(),
        );
        let bytes = store.fetch(name).await.context("Fetch failed")?;
        tokio::fs::write(&save_to, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", save_to.display()))?;
        if !cli.quiet {
            eprintln!(
                "{} {} bytes  →  {}",
                green("✔"),
                bytes.len(),
                bold(&save_to.display().to_string())
            );
        }
        return Ok(());
    }

    let input = cli.input.clone().context("An input file is required")?;

    // Parse before any engine is built so a typo fails fast.
    let job = Job::from_request(&cli.kind, &cli.lang, &cli.translate_to, input)
        .context("Invalid request")?;

    // ── Build processor ──────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn JobProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;
    let processor = MediaProcessor::from_config(config).context("Engine setup failed")?;

    // ── Run job ──────────────────────────────────────────────────────────
    let output = processor.process(&job).await.context("Processing failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        print_output(&output, job.kind);
    }

    if !cli.quiet && !cli.json {
        eprintln!(
            "{}  {} chars  {}ms  →  {}",
            if output.stats.failed_chunks == 0 {
                green("✔")
            } else {
                cyan("⚠")
            },
            output.stats.transcript_chars,
            output.stats.total_duration_ms,
            bold(&output.artifact.path.display().to_string()),
        );
    }

    Ok(())
}

/// Map CLI args to `ProcessorConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ProcessorConfig> {
    let mut builder = ProcessorConfig::builder()
        .chunk_duration_ms(cli.chunk_ms)
        .concurrency(cli.concurrency)
        .output_dir(&cli.output_dir)
        .font_path(&cli.font)
        .capability_timeout_secs(cli.timeout)
        .temperature(cli.temperature)
        .ffmpeg_path(&cli.ffmpeg);

    if let Some(ref dir) = cli.scratch_dir {
        builder = builder.scratch_dir(dir);
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(ref url) = cli.stt_url {
        builder = builder.stt_api_url(url);
    }
    if let Some(ref model) = cli.stt_model {
        builder = builder.stt_model(model);
    }
    if let Some(ref dir) = cli.pdfium_lib {
        builder = builder.pdfium_lib_path(dir);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_output(output: &JobOutput, kind: InputKind) {
    let heading = match kind {
        InputKind::Document => "Extracted text",
        InputKind::Audio | InputKind::Video => "Transcript",
    };
    println!("{}\n{}\n", bold(heading), output.transcript);
    println!("{}\n{}\n", bold("Translation"), output.translation.value);
    println!("{}\n{}\n", bold("Summary"), output.summary.value);

    println!("{}", bold("Entities"));
    if output.entities.value.is_empty() {
        let note = match output.entities.status {
            StageStatus::Failed { ref reason } => format!("(unavailable: {reason})"),
            _ => "(none)".to_string(),
        };
        println!("{}", dim(&note));
    }
    for e in &output.entities.value {
        println!("  {:<30} {}", e.text, dim(&e.label));
    }
    println!();
    println!("{} {}", bold("Artifact"), output.artifact.filename);
}

fn print_languages() {
    println!("{}", bold("Source languages (--lang)"));
    for l in SourceLanguage::ALL {
        println!("  {:<8} {}", l.code(), l.display_name());
    }
    println!();
    println!("{}", bold("Target languages (--translate-to)"));
    for l in TargetLanguage::ALL {
        println!("  {:<8} {}", l.code(), l.display_name());
    }
}
