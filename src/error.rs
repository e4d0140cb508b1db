//! Error types for the edgequake-media2doc library.
//!
//! Three error types reflect three distinct failure modes:
//!
//! * [`MediaDocError`] — **Fatal**: the job cannot proceed at all (unknown
//!   input kind, unsupported document, missing font, unreadable input).
//!   Returned as `Err(MediaDocError)` from the top-level `process*` functions.
//!
//! * [`ChunkError`] — **Non-fatal**: a single audio chunk failed (write glitch,
//!   recogniser error, timeout) but every other chunk is fine. Stored inside
//!   [`crate::output::ChunkResult`] so the transcript is assembled from what
//!   succeeded rather than losing the whole job to one bad chunk.
//!
//! * [`CapabilityError`] — what an external engine hands back. The pipeline
//!   decides per call site whether it becomes a `ChunkError`, a degraded
//!   stage result, or a fatal `MediaDocError`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a fatal error.
///
/// Lets a caller (HTTP layer, CLI) answer "was this the user's fault or the
/// server's?" without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The request or its file is unusable.
    BadInput,
    /// The server is missing something it needs (font, engine, library).
    Configuration,
    /// Unexpected failure inside the pipeline itself.
    Internal,
}

/// All fatal errors returned by the edgequake-media2doc library.
///
/// Chunk-level failures use [`ChunkError`] and stage-level failures degrade
/// into [`crate::output::StageOutput`]; neither is propagated here.
#[derive(Debug, Error)]
pub enum MediaDocError {
    // ── Request errors ────────────────────────────────────────────────────
    /// The declared input kind is not audio, video or document.
    #[error("Unsupported input type '{kind}'\nExpected one of: audio, video, document.")]
    UnsupportedInputKind { kind: String },

    /// A language code or name outside the supported tables.
    #[error("Unsupported {role} language '{value}'\nRun `media2doc --list-languages` for the supported set.")]
    UnsupportedLanguage { role: &'static str, value: String },

    /// Document input whose extension is neither .docx nor .pdf.
    #[error("Unsupported document format '{extension}' for '{path}'\nSupported formats: .docx, .pdf")]
    UnsupportedDocumentFormat { path: PathBuf, extension: String },

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The audio stream could not be decoded.
    #[error("Failed to decode audio '{path}': {detail}")]
    AudioDecodeFailed { path: PathBuf, detail: String },

    /// The media-extraction capability could not produce an audio track.
    #[error("Failed to extract audio from '{path}': {detail}")]
    AudioExtractionFailed { path: PathBuf, detail: String },

    /// The document-reader capability could not read the document.
    #[error("Failed to read document '{path}': {detail}")]
    DocumentReadFailed { path: PathBuf, detail: String },

    // ── Configuration errors ──────────────────────────────────────────────
    /// The font used to render the output document is missing.
    #[error("Font file not found: '{path}'\nThe output document needs a font covering the target script (e.g. DejaVuSans.ttf).")]
    FontNotFound { path: PathBuf },

    /// An engine could not be initialised (missing API key etc.).
    #[error("Engine '{engine}' is not configured.\n{hint}")]
    EngineNotConfigured { engine: String, hint: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Install libpdfium for your platform, or set PDFIUM_LIB_PATH to the directory\n\
that contains it.\n"
    )]
    PdfiumBindingFailed(String),

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Output errors ─────────────────────────────────────────────────────
    /// The renderer failed to produce the output document.
    #[error("Failed to render output document '{path}': {detail}")]
    RenderFailed { path: PathBuf, detail: String },

    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Retrieval errors ──────────────────────────────────────────────────
    /// Artifact name is empty or escapes the artifact directory.
    #[error("Invalid artifact name '{name}'")]
    InvalidArtifactName { name: String },

    /// No artifact with this name exists.
    #[error("Artifact not found: '{name}'")]
    ArtifactNotFound { name: String },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MediaDocError {
    /// Whether this error was caused by the request or by the server setup.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MediaDocError::UnsupportedInputKind { .. }
            | MediaDocError::UnsupportedLanguage { .. }
            | MediaDocError::UnsupportedDocumentFormat { .. }
            | MediaDocError::FileNotFound { .. }
            | MediaDocError::PermissionDenied { .. }
            | MediaDocError::AudioDecodeFailed { .. }
            | MediaDocError::AudioExtractionFailed { .. }
            | MediaDocError::DocumentReadFailed { .. }
            | MediaDocError::InvalidArtifactName { .. }
            | MediaDocError::ArtifactNotFound { .. } => ErrorKind::BadInput,
            MediaDocError::FontNotFound { .. }
            | MediaDocError::EngineNotConfigured { .. }
            | MediaDocError::PdfiumBindingFailed(_)
            | MediaDocError::InvalidConfig(_) => ErrorKind::Configuration,
            MediaDocError::RenderFailed { .. }
            | MediaDocError::OutputWriteFailed { .. }
            | MediaDocError::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// A non-fatal error for a single audio chunk.
///
/// Stored alongside [`crate::output::ChunkResult`] when a chunk fails.
/// The job always continues; the chunk contributes nothing to the transcript.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum ChunkError {
    /// The chunk could not be written to its temporary file.
    #[error("Chunk {index}: failed to write temporary audio: {detail}")]
    WriteFailed { index: usize, detail: String },

    /// The speech-to-text engine rejected or failed the chunk.
    #[error("Chunk {index}: recognition failed: {detail}")]
    RecognitionFailed { index: usize, detail: String },

    /// The speech-to-text call did not finish in time.
    #[error("Chunk {index}: recognition timed out after {secs}s")]
    Timeout { index: usize, secs: u64 },
}

/// Failure reported by an external capability.
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// The engine answered with an error.
    #[error("{0}")]
    Failed(String),

    /// The engine did not answer within the configured timeout.
    #[error("timed out after {secs}s")]
    Timeout { secs: u64 },

    /// Local I/O around the call failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The engine itself is missing on this server (library not bound,
    /// executable not found). Carries the configuration error to report.
    #[error("{0}")]
    Unavailable(Box<MediaDocError>),
}

impl CapabilityError {
    pub fn failed(detail: impl Into<String>) -> Self {
        CapabilityError::Failed(detail.into())
    }

    pub fn unavailable(error: MediaDocError) -> Self {
        CapabilityError::Unavailable(Box::new(error))
    }

    /// Turn a failed fatal-path call into a job error.
    ///
    /// Setup faults keep their configuration error; anything else is
    /// attributed to the input through `input_error`.
    pub fn into_job_error(self, input_error: impl FnOnce(String) -> MediaDocError) -> MediaDocError {
        match self {
            CapabilityError::Unavailable(e) => *e,
            e => input_error(e.to_string()),
        }
    }
}
