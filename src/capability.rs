//! Interfaces to the external engines the pipeline orchestrates.
//!
//! The pipeline never recognises speech, translates, or parses a PDF itself.
//! Each of those jobs sits behind one of the traits below, so a local model,
//! a remote API, or a test double can be swapped in without touching the
//! orchestration code. Concrete implementations live in [`crate::engines`].
//!
//! All traits are `Send + Sync`: engines are created once per process,
//! wrapped in [`Engines`], and shared read-only by every concurrent job.

use crate::error::{CapabilityError, MediaDocError};
use crate::output::Entity;
use async_trait::async_trait;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempPath;

/// Supported document formats for document inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Docx,
    Pdf,
}

impl DocumentFormat {
    /// Match a file extension (without the dot), ignoring case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "docx" => Some(DocumentFormat::Docx),
            "pdf" => Some(DocumentFormat::Pdf),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DocumentFormat::Docx => "docx",
            DocumentFormat::Pdf => "pdf",
        })
    }
}

/// Speech-to-text for one WAV segment.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe the WAV file at `audio`. `language` is a locale code such as `hi-IN`.
    async fn transcribe(&self, audio: &Path, language: &str) -> Result<String, CapabilityError>;
}

/// Machine translation.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, CapabilityError>;
}

/// Abstractive summarisation with output-length bounds (in words).
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(
        &self,
        text: &str,
        min_length: usize,
        max_length: usize,
    ) -> Result<String, CapabilityError>;
}

/// Named-entity recognition. Entity-free text yields an empty list.
#[async_trait]
pub trait EntityExtractor: Send + Sync {
    async fn extract_entities(&self, text: &str) -> Result<Vec<Entity>, CapabilityError>;
}

/// Plain-text extraction from a document file.
#[async_trait]
pub trait DocumentReader: Send + Sync {
    async fn read_text(&self, path: &Path, format: DocumentFormat) -> Result<String, CapabilityError>;
}

/// Pulls the audio track out of a media container as WAV.
#[async_trait]
pub trait AudioExtractor: Send + Sync {
    /// Write the audio of `media` into a new file inside `scratch_dir`.
    ///
    /// The returned [`TempPath`] deletes the file when dropped, so callers
    /// get cleanup on every exit path.
    async fn extract_audio_track(
        &self,
        media: &Path,
        scratch_dir: &Path,
    ) -> Result<TempPath, CapabilityError>;
}

/// Renders text into a paginated document file.
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    /// Verify the renderer has what it needs (font file) before a job starts.
    fn preflight(&self) -> Result<(), MediaDocError> {
        Ok(())
    }

    async fn render(&self, text: &str, output: &Path) -> Result<(), CapabilityError>;
}

/// The full set of engines a processor drives.
///
/// Cloning is cheap: every field is an `Arc`.
#[derive(Clone)]
pub struct Engines {
    pub speech_to_text: Arc<dyn SpeechToText>,
    pub translator: Arc<dyn Translator>,
    pub summarizer: Arc<dyn Summarizer>,
    pub entity_extractor: Arc<dyn EntityExtractor>,
    pub document_reader: Arc<dyn DocumentReader>,
    pub audio_extractor: Arc<dyn AudioExtractor>,
    pub renderer: Arc<dyn DocumentRenderer>,
}

impl fmt::Debug for Engines {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engines").finish_non_exhaustive()
    }
}
