//! Stage pipeline: translate, summarise and extract entities from a transcript.
//!
//! The three stages depend only on the transcript, never on each other, so
//! they run concurrently with `tokio::join!`. Each stage is total: engine
//! errors and timeouts become a degraded [`StageOutput`] carrying the
//! user-facing fallback text plus a structured [`StageStatus`], and the job
//! carries on to rendering.
//!
//! [`StageStatus`]: crate::output::StageStatus

use crate::capability::{EntityExtractor, Summarizer, Translator};
use crate::config::ProcessorConfig;
use crate::error::CapabilityError;
use crate::language::TargetLanguage;
use crate::output::{Entity, StageKind, StageOutput, StageResults};
use crate::progress::ProgressCallback;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Fallback value of a failed translation.
pub const TRANSLATION_FAILED: &str = "Translation failed.";
/// Value of a summary skipped for short input.
pub const SUMMARY_TOO_SHORT: &str = "Text too short for summarization.";
/// Value of a summary the engine answered with nothing.
pub const SUMMARY_UNAVAILABLE: &str = "Summary unavailable.";

/// Engines and limits shared by the three stages.
#[derive(Clone)]
pub struct StagePipeline {
    pub translator: Arc<dyn Translator>,
    pub summarizer: Arc<dyn Summarizer>,
    pub entity_extractor: Arc<dyn EntityExtractor>,
    pub summary_min_length: usize,
    pub summary_max_length: usize,
    /// Transcripts shorter than this (in characters) are not summarised.
    pub summary_min_input_chars: usize,
    pub timeout: Duration,
    pub progress: Option<ProgressCallback>,
}

impl StagePipeline {
    pub fn new(
        translator: Arc<dyn Translator>,
        summarizer: Arc<dyn Summarizer>,
        entity_extractor: Arc<dyn EntityExtractor>,
        config: &ProcessorConfig,
    ) -> Self {
        Self {
            translator,
            summarizer,
            entity_extractor,
            summary_min_length: config.summary_min_length,
            summary_max_length: config.summary_max_length,
            summary_min_input_chars: config.summary_min_input_chars,
            timeout: config.capability_timeout(),
            progress: config.progress_callback.clone(),
        }
    }

    /// Run all three stages over `transcript`.
    pub async fn run(&self, transcript: &str, target: TargetLanguage) -> StageResults {
        let (translation, summary, entities) = tokio::join!(
            self.translate(transcript, target),
            self.summarize(transcript),
            self.extract_entities(transcript),
        );
        StageResults {
            translation,
            summary,
            entities,
        }
    }

    /// Translate the transcript into `target`.
    pub async fn translate(&self, text: &str, target: TargetLanguage) -> StageOutput<String> {
        let out = if text.trim().is_empty() {
            StageOutput::skipped(String::new(), "empty transcript")
        } else {
            match self
                .guarded(self.translator.translate(text, target.code()))
                .await
            {
                Ok(translated) => StageOutput::ok(translated.trim().to_string()),
                Err(e) => {
                    warn!("Translation to {} failed: {}", target, e);
                    StageOutput::failed(TRANSLATION_FAILED.to_string(), e.to_string())
                }
            }
        };
        self.report(StageKind::Translate, &out);
        out
    }

    /// Summarise the transcript, skipping text below the length threshold.
    pub async fn summarize(&self, text: &str) -> StageOutput<String> {
        let chars = text.chars().count();
        let out = if chars < self.summary_min_input_chars {
            debug!(
                "Skipping summary: {} chars < {}",
                chars, self.summary_min_input_chars
            );
            StageOutput::skipped(
                SUMMARY_TOO_SHORT.to_string(),
                format!("{} characters", chars),
            )
        } else {
            match self
                .guarded(self.summarizer.summarize(
                    text,
                    self.summary_min_length,
                    self.summary_max_length,
                ))
                .await
            {
                Ok(summary) if summary.trim().is_empty() => StageOutput::failed(
                    SUMMARY_UNAVAILABLE.to_string(),
                    "engine returned an empty summary",
                ),
                Ok(summary) => StageOutput::ok(summary.trim().to_string()),
                Err(e) => {
                    warn!("Summarization failed: {}", e);
                    StageOutput::failed(format!("Summarization failed: {}", e), e.to_string())
                }
            }
        };
        self.report(StageKind::Summarize, &out);
        out
    }

    /// Extract named entities. Empty input yields an empty list.
    pub async fn extract_entities(&self, text: &str) -> StageOutput<Vec<Entity>> {
        let out = if text.trim().is_empty() {
            StageOutput::ok(Vec::new())
        } else {
            match self.guarded(self.entity_extractor.extract_entities(text)).await {
                Ok(entities) => StageOutput::ok(entities),
                Err(e) => {
                    warn!("Entity extraction failed: {}", e);
                    StageOutput::failed(Vec::new(), e.to_string())
                }
            }
        };
        self.report(StageKind::ExtractEntities, &out);
        out
    }

    /// Apply the per-capability timeout.
    async fn guarded<T>(
        &self,
        call: impl Future<Output = Result<T, CapabilityError>>,
    ) -> Result<T, CapabilityError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| CapabilityError::Timeout {
                secs: self.timeout.as_secs(),
            })?
    }

    fn report<T>(&self, stage: StageKind, out: &StageOutput<T>) {
        if let Some(ref cb) = self.progress {
            cb.on_stage_complete(stage, !out.is_failed());
        }
    }
}
