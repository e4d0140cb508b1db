//! Concrete engines behind the [`crate::capability`] traits.
//!
//! | Capability        | Engine               | Backend                         |
//! |-------------------|----------------------|---------------------------------|
//! | speech-to-text    | [`WhisperApiStt`]    | OpenAI-compatible HTTP API      |
//! | translate         | [`LlmEngine`]        | `edgequake-llm` provider        |
//! | summarize         | [`LlmEngine`]        | `edgequake-llm` provider        |
//! | extract entities  | [`LlmEngine`]        | `edgequake-llm` provider (JSON) |
//! | read document     | [`FileDocumentReader`] | pdfium (PDF), zip + XML (DOCX) |
//! | extract audio     | [`FfmpegExtractor`]  | `ffmpeg` child process          |
//! | render document   | [`PdfRenderer`]      | pdfium with an embedded TTF     |

pub mod docx;
pub mod ffmpeg;
pub mod layout;
pub mod llm;
pub mod pdf;
pub mod stt;

pub use ffmpeg::FfmpegExtractor;
pub use llm::LlmEngine;
pub use pdf::{FileDocumentReader, PdfRenderer};
pub use stt::WhisperApiStt;

use crate::capability::Engines;
use crate::config::ProcessorConfig;
use crate::error::MediaDocError;
use std::sync::Arc;
use tracing::info;

impl Engines {
    /// Build the default engine set from configuration and environment.
    ///
    /// Fails with `EngineNotConfigured` when no LLM provider or STT key can be
    /// found. pdfium is bound lazily per call, so a missing library surfaces
    /// only for jobs that need it.
    pub fn from_config(config: &ProcessorConfig) -> Result<Self, MediaDocError> {
        let llm = Arc::new(LlmEngine::from_config(config)?);
        let stt = Arc::new(WhisperApiStt::from_config(config)?);
        let lib_dir = pdf::pdfium_lib_dir(config.pdfium_lib_path.as_deref());
        info!(
            "Engines ready (stt: {:?}, ffmpeg: {})",
            stt,
            config.ffmpeg_path.display()
        );

        Ok(Self {
            speech_to_text: stt,
            translator: llm.clone(),
            summarizer: llm.clone(),
            entity_extractor: llm,
            document_reader: Arc::new(FileDocumentReader::new(lib_dir.clone())),
            audio_extractor: Arc::new(FfmpegExtractor::new(&config.ffmpeg_path)),
            renderer: Arc::new(PdfRenderer::new(&config.font_path, lib_dir)),
        })
    }
}
