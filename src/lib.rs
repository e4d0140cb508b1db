//! # edgequake-media2doc
//!
//! Turn audio, video and documents into a transcript, a translation, a
//! summary, a list of named entities and a rendered PDF.
//!
//! ## Why this crate?
//!
//! Speech recognisers cap how much audio one request may carry, and a single
//! failed request should not cost the whole recording. This crate cuts long
//! audio into bounded chunks, transcribes each one with its own failure
//! boundary, reassembles the transcript in order, and threads it through
//! translation, summarisation and entity extraction into a durable artifact.
//! The engines themselves (speech-to-text, LLM, pdfium, ffmpeg) sit behind
//! small traits in [`capability`], so any of them can be swapped.
//!
//! ## Pipeline Overview
//!
//! ```text
//! input
//!  │
//!  ├─ 1. Resolve     validate kind, languages and file; route by kind
//!  ├─ 2. Audio       extract (video / non-WAV) and decode to PCM
//!  ├─ 3. Chunk       fixed-duration segments, no gaps, no overlaps
//!  ├─ 4. Transcribe  concurrent STT calls, one temp file per chunk
//!  ├─ 5. Assemble    ordered join of successful chunks
//!  ├─ 6. Stages      translate ∥ summarise ∥ extract entities (all degrade, never abort)
//!  └─ 7. Artifact    output_<uuid>.pdf rendered with a full-coverage font
//! ```
//!
//! Documents (`.docx`, `.pdf`) skip steps 2–5: their text is read directly.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_media2doc::{Job, MediaProcessor, ProcessorConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // LLM provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / ...
//!     let config = ProcessorConfig::builder().font_path("DejaVuSans.ttf").build()?;
//!     let processor = MediaProcessor::from_config(config)?;
//!
//!     let job = Job::from_request("audio", "ta-IN", "en", "interview.wav")?;
//!     let output = processor.process(&job).await?;
//!     println!("{}", output.transcript);
//!     eprintln!("artifact: {} ({} of {} chunks failed)",
//!         output.artifact.filename,
//!         output.stats.failed_chunks,
//!         output.stats.total_chunks);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `media2doc` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-media2doc = { version = "0.1", default-features = false }
//! ```
//!
//! ## External requirements
//!
//! | Needed for | Requirement |
//! |------------|-------------|
//! | video, mp3/m4a/ogg audio | `ffmpeg` on `PATH` (or `ffmpeg_path`) |
//! | PDF input, PDF output | libpdfium (system, or `PDFIUM_LIB_PATH`) |
//! | PDF output | a TrueType font covering the target script |
//! | speech-to-text | `STT_API_KEY` or `OPENAI_API_KEY` |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod capability;
pub mod config;
pub mod engines;
pub mod error;
pub mod language;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod progress;
pub mod prompts;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use capability::{
    AudioExtractor, DocumentFormat, DocumentReader, DocumentRenderer, Engines, EntityExtractor,
    SpeechToText, Summarizer, Translator,
};
pub use config::{ProcessorConfig, ProcessorConfigBuilder};
pub use error::{CapabilityError, ChunkError, ErrorKind, MediaDocError};
pub use language::{SourceLanguage, TargetLanguage};
pub use output::{
    Artifact, ChunkOutcome, ChunkResult, Entity, JobOutput, JobStats, StageKind, StageOutput,
    StageStatus,
};
pub use pipeline::input::{InputKind, Job};
pub use process::{process, process_file, JobState, MediaProcessor};
pub use progress::{JobProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stream::ChunkStream;
