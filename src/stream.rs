//! Streaming transcription API: emit chunks as they complete.
//!
//! ## Why stream?
//!
//! A two-hour recording is 120 recognition calls. A stream lets callers show
//! partial transcripts immediately, drive progress displays, or write chunks
//! to disk as they arrive instead of waiting for the whole job.
//!
//! Chunks arrive in completion order, not index order; sort by
//! `ChunkResult::index` (or hand the collected results to
//! [`assemble_transcript`](crate::pipeline::assemble::assemble_transcript))
//! when order matters. Per-chunk containment and temp-file cleanup are the
//! same as for the eager API.

use crate::error::MediaDocError;
use crate::language::SourceLanguage;
use crate::output::{ChunkOutcome, ChunkResult};
use crate::pipeline::chunk::ChunkPlan;
use crate::pipeline::input::{resolve_input, InputKind, Job, ResolvedInput};
use crate::pipeline::transcribe::transcribe_chunk;
use crate::process::MediaProcessor;
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of chunk results.
pub type ChunkStream = Pin<Box<dyn Stream<Item = ChunkResult> + Send>>;

impl MediaProcessor {
    /// Transcribe `input`, streaming chunk results as they are ready.
    ///
    /// A document yields a single result holding its extracted text.
    ///
    /// # Returns
    /// - `Ok(ChunkStream)` — one `ChunkResult` per chunk, failures included
    /// - `Err(MediaDocError)` — fatal error (missing file, undecodable audio, ...)
    pub async fn transcribe_stream(
        &self,
        input: impl AsRef<Path>,
        kind: InputKind,
        language: SourceLanguage,
    ) -> Result<ChunkStream, MediaDocError> {
        let input = input.as_ref();
        info!("Starting streaming transcription: {}", input.display());

        // ── Resolve input ────────────────────────────────────────────────────
        let job = Job::new(input, kind, language, Default::default());
        let resolved = resolve_input(&job)?;

        if let ResolvedInput::Document { path, format } = &resolved {
            let start = Instant::now();
            let text = self.read_document(path, *format).await?;
            let result = ChunkResult {
                index: 0,
                start_ms: 0,
                end_ms: 0,
                outcome: ChunkOutcome::Text(text),
                duration_ms: start.elapsed().as_millis() as u64,
            };
            return Ok(Box::pin(stream::once(async move { result })));
        }

        // ── Decode and plan ──────────────────────────────────────────────────
        let audio = self.load_audio(&resolved).await?;
        let plan = ChunkPlan::new(Arc::new(audio), self.config().chunk_duration_ms);
        let ctx = Arc::new(self.transcribe_context(language.code(), plan.len()).await?);
        if let Some(ref cb) = self.config().progress_callback {
            cb.on_job_start(plan.len());
        }

        // ── Build the stream ─────────────────────────────────────────────────
        let concurrency = self.config().concurrency.max(1);
        let s = stream::iter(plan.chunks().map(move |chunk| {
            let ctx = Arc::clone(&ctx);
            async move { transcribe_chunk(chunk, &ctx).await }
        }))
        .buffer_unordered(concurrency);

        Ok(Box::pin(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{
        AudioExtractor, DocumentFormat, DocumentReader, DocumentRenderer, Engines,
        EntityExtractor, SpeechToText, Summarizer, Translator,
    };
    use crate::config::ProcessorConfig;
    use crate::error::CapabilityError;
    use crate::output::Entity;
    use crate::pipeline::audio::{write_wav, DecodedAudio};
    use async_trait::async_trait;
    use tempfile::TempPath;

    struct Echo;

    #[async_trait]
    impl SpeechToText for Echo {
        async fn transcribe(&self, audio: &Path, _: &str) -> Result<String, CapabilityError> {
            let reader = hound::WavReader::open(audio).map_err(|e| CapabilityError::failed(e.to_string()))?;
            Ok(format!("{} samples", reader.len()))
        }
    }

    #[async_trait]
    impl Translator for Echo {
        async fn translate(&self, t: &str, _: &str) -> Result<String, CapabilityError> {
            Ok(t.to_string())
        }
    }

    #[async_trait]
    impl Summarizer for Echo {
        async fn summarize(&self, t: &str, _: usize, _: usize) -> Result<String, CapabilityError> {
            Ok(t.to_string())
        }
    }

    #[async_trait]
    impl EntityExtractor for Echo {
        async fn extract_entities(&self, _: &str) -> Result<Vec<Entity>, CapabilityError> {
            Ok(Vec::new())
        }
    }

    #[async_trait]
    impl DocumentReader for Echo {
        async fn read_text(&self, _: &Path, format: DocumentFormat) -> Result<String, CapabilityError> {
            Ok(format!("text of a {format}\r\n\r\n\r\n"))
        }
    }

    #[async_trait]
    impl AudioExtractor for Echo {
        async fn extract_audio_track(&self, _: &Path, _: &Path) -> Result<TempPath, CapabilityError> {
            Err(CapabilityError::failed("no extractor in tests"))
        }
    }

    #[async_trait]
    impl DocumentRenderer for Echo {
        async fn render(&self, _: &str, _: &Path) -> Result<(), CapabilityError> {
            Ok(())
        }
    }

    /// Never answers.
    struct Stuck;

    #[async_trait]
    impl DocumentReader for Stuck {
        async fn read_text(&self, _: &Path, _: DocumentFormat) -> Result<String, CapabilityError> {
            std::future::pending().await
        }
    }

    fn engines() -> Engines {
        let echo = Arc::new(Echo);
        Engines {
            speech_to_text: echo.clone(),
            translator: echo.clone(),
            summarizer: echo.clone(),
            entity_extractor: echo.clone(),
            document_reader: echo.clone(),
            audio_extractor: echo.clone(),
            renderer: echo,
        }
    }

    fn processor(scratch: &Path) -> MediaProcessor {
        let config = ProcessorConfig::builder()
            .chunk_duration_ms(1_000)
            .scratch_dir(scratch)
            .build()
            .unwrap();
        MediaProcessor::new(config, engines())
    }

    #[tokio::test]
    async fn streams_every_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let wav = dir.path().join("talk.wav");
        let audio = DecodedAudio::new(vec![0; 2_500], 1_000, 1);
        write_wav(std::fs::File::create(&wav).unwrap(), &audio, &audio.samples).unwrap();

        let scratch = dir.path().join("scratch");
        let stream = processor(&scratch)
            .transcribe_stream(&wav, InputKind::Audio, SourceLanguage::Hindi)
            .await
            .unwrap();
        let mut results: Vec<ChunkResult> = stream.collect().await;
        results.sort_by_key(|r| r.index);

        let texts: Vec<_> = results.iter().filter_map(|r| r.text()).collect();
        assert_eq!(texts, vec!["1000 samples", "1000 samples", "500 samples"]);
        assert_eq!(std::fs::read_dir(&scratch).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn document_is_a_single_result() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("report.pdf");
        std::fs::write(&pdf, b"%PDF-1.7").unwrap();

        let stream = processor(dir.path())
            .transcribe_stream(&pdf, InputKind::Document, SourceLanguage::default())
            .await
            .unwrap();
        let results: Vec<ChunkResult> = stream.collect().await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text(), Some("text of a pdf"));
    }

    #[tokio::test]
    async fn stuck_document_reader_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("report.pdf");
        std::fs::write(&pdf, b"%PDF-1.7").unwrap();

        let mut engines = engines();
        engines.document_reader = Arc::new(Stuck);
        let config = ProcessorConfig::builder()
            .scratch_dir(dir.path())
            .capability_timeout_secs(1)
            .build()
            .unwrap();
        let err = match MediaProcessor::new(config, engines)
            .transcribe_stream(&pdf, InputKind::Document, SourceLanguage::default())
            .await
        {
            Err(e) => e,
            Ok(_) => panic!("a stuck reader must not yield a stream"),
        };
        match err {
            MediaDocError::DocumentReadFailed { detail, .. } => {
                assert!(detail.contains("timed out after 1s"), "{detail}")
            }
            other => panic!("expected DocumentReadFailed, got {other:?}"),
        }
    }
}
