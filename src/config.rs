//! Configuration types for media-to-document processing.
//!
//! Every knob of the pipeline lives in [`ProcessorConfig`], built via its
//! [`ProcessorConfigBuilder`]. One struct keeps the configuration easy to share
//! across concurrent jobs and easy to log when two runs behave differently.

use crate::error::MediaDocError;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Default chunk length: one minute of audio per recognition call.
pub const DEFAULT_CHUNK_DURATION_MS: u64 = 60_000;

/// Transcripts shorter than this many characters are not summarised.
pub const DEFAULT_SUMMARY_MIN_INPUT_CHARS: usize = 50;

/// Configuration for a media-to-document processor.
///
/// Built via [`ProcessorConfig::builder()`] or using
/// [`ProcessorConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_media2doc::ProcessorConfig;
///
/// let config = ProcessorConfig::builder()
///     .chunk_duration_ms(30_000)
///     .concurrency(2)
///     .output_dir("outputs")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ProcessorConfig {
    /// Length of each audio chunk in milliseconds. Default: 60 000.
    ///
    /// Recognition APIs cap request size and duration; one minute keeps a
    /// 16 kHz mono chunk under 2 MB while still giving the recogniser enough
    /// context to punctuate sensibly.
    pub chunk_duration_ms: u64,

    /// Number of chunks transcribed at the same time. Default: 4.
    ///
    /// 1 transcribes strictly one chunk after another. Results are re-sorted
    /// by chunk index before assembly, so the transcript is identical for
    /// every value.
    pub concurrency: usize,

    /// Directory rendered artifacts are written to and served from. Default: `outputs`.
    pub output_dir: PathBuf,

    /// Directory for transient chunk and extracted-audio files.
    /// If None, uses the system temp directory.
    pub scratch_dir: Option<PathBuf>,

    /// TrueType font used to render the output document. Default: `DejaVuSans.ttf`.
    ///
    /// Must cover the target script. A missing font is a fatal configuration
    /// error, never a fallback to a Latin-only font.
    pub font_path: PathBuf,

    /// Lower bound handed to the summariser, in words. Default: 40.
    pub summary_min_length: usize,

    /// Upper bound handed to the summariser, in words. Default: 150.
    pub summary_max_length: usize,

    /// Transcripts shorter than this (in characters) skip summarisation. Default: 50.
    pub summary_min_input_chars: usize,

    /// Upper bound on any single capability call, in seconds. Default: 120.
    ///
    /// An expired call is treated exactly like a failed call of the same unit.
    pub capability_timeout_secs: u64,

    /// LLM model identifier used for translation, summaries and entities.
    /// If None, uses the provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    /// If None along with `provider`, the provider is auto-detected.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature for LLM calls. Default: 0.2.
    pub temperature: f32,

    /// Base URL of an OpenAI-compatible transcription API.
    /// If None, `STT_API_URL` or the OpenAI endpoint is used.
    pub stt_api_url: Option<String>,

    /// Transcription model. If None, `STT_MODEL` or `whisper-1`.
    pub stt_model: Option<String>,

    /// Transcription API key. If None, `STT_API_KEY` or `OPENAI_API_KEY`.
    pub stt_api_key: Option<String>,

    /// Path to the ffmpeg executable. Default: `ffmpeg` from `PATH`.
    pub ffmpeg_path: PathBuf,

    /// Directory containing libpdfium. If None, `PDFIUM_LIB_PATH` or the system library.
    pub pdfium_lib_path: Option<PathBuf>,

    /// Receives per-chunk and per-stage progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            chunk_duration_ms: DEFAULT_CHUNK_DURATION_MS,
            concurrency: 4,
            output_dir: PathBuf::from("outputs"),
            scratch_dir: None,
            font_path: PathBuf::from("DejaVuSans.ttf"),
            summary_min_length: 40,
            summary_max_length: 150,
            summary_min_input_chars: DEFAULT_SUMMARY_MIN_INPUT_CHARS,
            capability_timeout_secs: 120,
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.2,
            stt_api_url: None,
            stt_model: None,
            stt_api_key: None,
            ffmpeg_path: PathBuf::from("ffmpeg"),
            pdfium_lib_path: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ProcessorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorConfig")
            .field("chunk_duration_ms", &self.chunk_duration_ms)
            .field("concurrency", &self.concurrency)
            .field("output_dir", &self.output_dir)
            .field("scratch_dir", &self.scratch_dir)
            .field("font_path", &self.font_path)
            .field("summary_min_length", &self.summary_min_length)
            .field("summary_max_length", &self.summary_max_length)
            .field("summary_min_input_chars", &self.summary_min_input_chars)
            .field("capability_timeout_secs", &self.capability_timeout_secs)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("stt_api_url", &self.stt_api_url)
            .field("stt_model", &self.stt_model)
            .field("stt_api_key", &self.stt_api_key.as_ref().map(|_| "<redacted>"))
            .field("ffmpeg_path", &self.ffmpeg_path)
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .finish()
    }
}

impl ProcessorConfig {
    /// Create a new builder for `ProcessorConfig`.
    pub fn builder() -> ProcessorConfigBuilder {
        ProcessorConfigBuilder {
            config: Self::default(),
        }
    }

    /// Scratch directory for transient files.
    pub fn scratch_dir(&self) -> PathBuf {
        self.scratch_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }

    pub fn capability_timeout(&self) -> Duration {
        Duration::from_secs(self.capability_timeout_secs)
    }
}

/// Builder for [`ProcessorConfig`].
#[derive(Debug)]
pub struct ProcessorConfigBuilder {
    config: ProcessorConfig,
}

impl ProcessorConfigBuilder {
    pub fn chunk_duration_ms(mut self, ms: u64) -> Self {
        self.config.chunk_duration_ms = ms;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.scratch_dir = Some(dir.into());
        self
    }

    pub fn font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.font_path = path.into();
        self
    }

    pub fn summary_length(mut self, min: usize, max: usize) -> Self {
        self.config.summary_min_length = min;
        self.config.summary_max_length = max;
        self
    }

    pub fn summary_min_input_chars(mut self, n: usize) -> Self {
        self.config.summary_min_input_chars = n;
        self
    }

    pub fn capability_timeout_secs(mut self, secs: u64) -> Self {
        self.config.capability_timeout_secs = secs.max(1);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn stt_api_url(mut self, url: impl Into<String>) -> Self {
        self.config.stt_api_url = Some(url.into());
        self
    }

    pub fn stt_model(mut self, model: impl Into<String>) -> Self {
        self.config.stt_model = Some(model.into());
        self
    }

    pub fn stt_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.stt_api_key = Some(key.into());
        self
    }

    pub fn ffmpeg_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.ffmpeg_path = path.into();
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ProcessorConfig, MediaDocError> {
        let c = &self.config;
        if c.chunk_duration_ms < 1_000 {
            return Err(MediaDocError::InvalidConfig(format!(
                "Chunk duration must be ≥ 1000 ms, got {}",
                c.chunk_duration_ms
            )));
        }
        if c.concurrency == 0 {
            return Err(MediaDocError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        if c.summary_min_length > c.summary_max_length {
            return Err(MediaDocError::InvalidConfig(format!(
                "Summary min length {} exceeds max length {}",
                c.summary_min_length, c.summary_max_length
            )));
        }
        Ok(self.config)
    }
}
