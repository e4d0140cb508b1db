//! Eager (whole-job) processing entry points.
//!
//! ## Why eager vs. streaming?
//!
//! [`MediaProcessor::process`] waits for every chunk, every stage and the
//! rendered artifact, then returns one [`JobOutput`]. Use
//! [`MediaProcessor::transcribe_stream`](crate::stream) instead when you only
//! need the transcript and want chunks as they finish.
//!
//! ## Job lifecycle
//!
//! ```text
//! Received ─▶ InputResolved ─▶ TranscriptReady ─▶ StagesComplete ─▶ ArtifactRendered ─▶ Responded
//! ```
//!
//! Linear, no back-edges, no automatic retry. Errors before `TranscriptReady`
//! fail the job; after it, only rendering can fail the job, and the stages
//! degrade instead of aborting.

use crate::capability::{DocumentFormat, Engines};
use crate::config::ProcessorConfig;
use crate::error::{CapabilityError, MediaDocError};
use crate::output::{ChunkResult, JobOutput, JobStats};
use crate::pipeline::artifact::ArtifactStore;
use crate::pipeline::assemble::assemble_transcript;
use crate::pipeline::audio::{decode_wav_file, DecodedAudio};
use crate::pipeline::chunk::ChunkPlan;
use crate::pipeline::input::{resolve_input, sanitized_extension, Job, ResolvedInput};
use crate::pipeline::postprocess::normalize_text;
use crate::pipeline::stages::StagePipeline;
use crate::pipeline::transcribe::{transcribe_chunks, TranscribeContext};
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Where a job is in its lifecycle. Only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Received,
    InputResolved,
    TranscriptReady,
    StagesComplete,
    ArtifactRendered,
    Responded,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Drives jobs through the pipeline with one shared set of engines.
///
/// Engines are built once and shared read-only by every job, so one
/// processor can serve many concurrent jobs.
#[derive(Clone)]
pub struct MediaProcessor {
    config: ProcessorConfig,
    engines: Engines,
    store: ArtifactStore,
}

impl fmt::Debug for MediaProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaProcessor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Transcript plus how it was obtained.
pub(crate) struct Transcript {
    pub text: String,
    pub chunks: Vec<ChunkResult>,
    pub duration_ms: u64,
}

impl MediaProcessor {
    pub fn new(config: ProcessorConfig, engines: Engines) -> Self {
        let store = ArtifactStore::new(
            config.output_dir.clone(),
            Arc::clone(&engines.renderer),
            config.capability_timeout(),
        );
        Self {
            config,
            engines,
            store,
        }
    }

    /// Build a processor with the default engines (see [`Engines::from_config`]).
    pub fn from_config(config: ProcessorConfig) -> Result<Self, MediaDocError> {
        let engines = Engines::from_config(&config)?;
        Ok(Self::new(config, engines))
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn engines(&self) -> &Engines {
        &self.engines
    }

    /// Run one job to completion.
    ///
    /// # Errors
    /// Returns `Err(MediaDocError)` only for fatal errors:
    /// - unsupported document format, missing or unreadable input
    /// - audio that cannot be extracted or decoded, documents that cannot be read
    /// - missing font, or a render/write failure of the artifact
    ///
    /// Failed chunks and failed stages never fail the job.
    pub async fn process(&self, job: &Job) -> Result<JobOutput, MediaDocError> {
        let total_start = Instant::now();
        self.enter(JobState::Received, job);

        // Nothing is consumed if the artifact could never be rendered.
        self.store.preflight()?;

        // ── Resolve input ────────────────────────────────────────────────────
        let resolved = resolve_input(job)?;
        self.enter(JobState::InputResolved, job);

        // ── Obtain transcript ────────────────────────────────────────────────
        let transcript = self.obtain_transcript(&resolved, job).await?;
        self.enter(JobState::TranscriptReady, job);

        // ── Stages ───────────────────────────────────────────────────────────
        let stages_start = Instant::now();
        let results = self.stage_pipeline().run(&transcript.text, job.target_language).await;
        let stages_duration_ms = stages_start.elapsed().as_millis() as u64;
        self.enter(JobState::StagesComplete, job);

        // ── Render artifact ──────────────────────────────────────────────────
        let render_start = Instant::now();
        let artifact = self.store.render(&results.translation.value).await?;
        let render_duration_ms = render_start.elapsed().as_millis() as u64;
        self.enter(JobState::ArtifactRendered, job);

        // ── Stats ────────────────────────────────────────────────────────────
        let failed = transcript.chunks.iter().filter(|c| !c.is_ok()).count();
        let stats = JobStats {
            total_chunks: transcript.chunks.len(),
            failed_chunks: failed,
            transcript_chars: transcript.text.chars().count(),
            total_duration_ms: total_start.elapsed().as_millis() as u64,
            transcription_duration_ms: transcript.duration_ms,
            stages_duration_ms,
            render_duration_ms,
        };

        if let Some(ref cb) = self.config.progress_callback {
            cb.on_job_complete(stats.total_chunks, stats.failed_chunks);
        }
        info!(
            "Job complete: {} chars, {}/{} chunks failed, artifact {}, {}ms total",
            stats.transcript_chars,
            stats.failed_chunks,
            stats.total_chunks,
            artifact.filename,
            stats.total_duration_ms
        );
        self.enter(JobState::Responded, job);

        Ok(JobOutput {
            transcript: transcript.text,
            translation: results.translation,
            summary: results.summary,
            entities: results.entities,
            artifact,
            chunks: transcript.chunks,
            stats,
        })
    }

    /// Run a job on uploaded bytes.
    ///
    /// The payload is written to a temp file in the scratch directory that
    /// keeps only the sanitised extension of `filename`, and is removed when
    /// the job ends. Kind and languages are validated before anything is
    /// written.
    pub async fn process_upload(
        &self,
        bytes: &[u8],
        filename: &str,
        kind: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<JobOutput, MediaDocError> {
        let mut job = Job::from_request(kind, source_language, target_language, filename)?;

        let scratch = self.scratch_dir().await?;
        let suffix = sanitized_extension(filename)
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();
        let payload = bytes.to_vec();
        let upload = tokio::task::spawn_blocking(move || -> Result<_, String> {
            let mut file = tempfile::Builder::new()
                .prefix("upload_")
                .suffix(&suffix)
                .tempfile_in(&scratch)
                .map_err(|e| format!("tempfile: {e}"))?;
            file.write_all(&payload)
                .map_err(|e| format!("tempfile write: {e}"))?;
            Ok(file.into_temp_path())
        })
        .await
        .map_err(|e| MediaDocError::Internal(format!("Upload task panicked: {}", e)))?
        .map_err(MediaDocError::Internal)?;
        debug!("Upload '{}' stored as {}", filename, upload.display());

        job.input = upload.to_path_buf();
        // `upload` is dropped (and the file deleted) when `process` returns
        self.process(&job).await
    }

    /// Synchronous wrapper around [`MediaProcessor::process`].
    ///
    /// Creates a temporary tokio runtime internally.
    pub fn process_sync(&self, job: &Job) -> Result<JobOutput, MediaDocError> {
        tokio::runtime::Runtime::new()
            .map_err(|e| MediaDocError::Internal(format!("Failed to create tokio runtime: {}", e)))?
            .block_on(self.process(job))
    }

    /// Bytes of a previously rendered artifact.
    ///
    /// Rejects names that could leave the artifact directory.
    pub async fn fetch_artifact(&self, name: &str) -> Result<Vec<u8>, MediaDocError> {
        self.store.fetch(name).await
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn enter(&self, state: JobState, job: &Job) {
        info!("[{}] {} {}", state, job.kind, job.input.display());
    }

    fn stage_pipeline(&self) -> StagePipeline {
        StagePipeline::new(
            Arc::clone(&self.engines.translator),
            Arc::clone(&self.engines.summarizer),
            Arc::clone(&self.engines.entity_extractor),
            &self.config,
        )
    }

    /// The scratch directory, created on demand.
    pub(crate) async fn scratch_dir(&self) -> Result<std::path::PathBuf, MediaDocError> {
        let dir = self.config.scratch_dir();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| MediaDocError::OutputWriteFailed {
                path: dir.clone(),
                source,
            })?;
        Ok(dir)
    }

    async fn obtain_transcript(
        &self,
        resolved: &ResolvedInput,
        job: &Job,
    ) -> Result<Transcript, MediaDocError> {
        let start = Instant::now();
        match resolved {
            ResolvedInput::Document { path, format } => {
                let text = self.read_document(path, *format).await?;
                info!("Read {} document: {} chars", format, text.chars().count());
                Ok(Transcript {
                    text,
                    chunks: Vec::new(),
                    duration_ms: start.elapsed().as_millis() as u64,
                })
            }
            ResolvedInput::Wav(_) | ResolvedInput::Media(_) => {
                let audio = self.load_audio(resolved).await?;
                let chunks = self
                    .transcribe_audio(Arc::new(audio), job.source_language.code())
                    .await?;
                let text = assemble_transcript(&chunks);
                Ok(Transcript {
                    text,
                    chunks,
                    duration_ms: start.elapsed().as_millis() as u64,
                })
            }
        }
    }

    /// Read and normalise a document's text under the capability timeout.
    pub(crate) async fn read_document(
        &self,
        path: &Path,
        format: DocumentFormat,
    ) -> Result<String, MediaDocError> {
        let raw = self
            .guarded(self.engines.document_reader.read_text(path, format))
            .await
            .map_err(|e| {
                e.into_job_error(|detail| MediaDocError::DocumentReadFailed {
                    path: path.to_path_buf(),
                    detail,
                })
            })?;
        Ok(normalize_text(&raw))
    }

    /// Decode the job's audio, extracting it from its container first if needed.
    ///
    /// An extracted track lives in the scratch directory only until it is
    /// decoded; the file is removed on every path out of this function.
    pub(crate) async fn load_audio(&self, resolved: &ResolvedInput) -> Result<DecodedAudio, MediaDocError> {
        match resolved {
            ResolvedInput::Wav(path) => decode_blocking(path.clone()).await,
            ResolvedInput::Media(path) => {
                let scratch = self.scratch_dir().await?;
                let track = self
                    .guarded(self.engines.audio_extractor.extract_audio_track(path, &scratch))
                    .await
                    .map_err(|e| {
                        e.into_job_error(|detail| MediaDocError::AudioExtractionFailed {
                            path: path.clone(),
                            detail,
                        })
                    })?;
                debug!("Extracted audio track to {}", track.display());
                let audio = decode_blocking(track.to_path_buf()).await;
                drop(track);
                audio
            }
            ResolvedInput::Document { path, .. } => Err(MediaDocError::Internal(format!(
                "document '{}' has no audio",
                path.display()
            ))),
        }
    }

    /// Chunk and transcribe decoded audio. Results are in index order.
    async fn transcribe_audio(
        &self,
        audio: Arc<DecodedAudio>,
        language: &str,
    ) -> Result<Vec<ChunkResult>, MediaDocError> {
        let plan = ChunkPlan::new(audio, self.config.chunk_duration_ms);
        let ctx = self.transcribe_context(language, plan.len()).await?;
        info!(
            "Transcribing {} chunk(s) of {}ms, concurrency {}",
            plan.len(),
            plan.chunk_ms(),
            self.config.concurrency
        );

        if let Some(ref cb) = self.config.progress_callback {
            cb.on_job_start(plan.len());
        }
        Ok(transcribe_chunks(plan.chunks(), &ctx, self.config.concurrency).await)
    }

    pub(crate) async fn transcribe_context(
        &self,
        language: &str,
        total_chunks: usize,
    ) -> Result<TranscribeContext, MediaDocError> {
        Ok(TranscribeContext {
            speech_to_text: Arc::clone(&self.engines.speech_to_text),
            language: language.to_string(),
            scratch_dir: self.scratch_dir().await?,
            timeout: self.config.capability_timeout(),
            total_chunks,
            progress: self.config.progress_callback.clone(),
        })
    }

    /// Apply the per-capability timeout.
    async fn guarded<T>(
        &self,
        call: impl std::future::Future<Output = Result<T, CapabilityError>>,
    ) -> Result<T, CapabilityError> {
        let timeout = self.config.capability_timeout();
        tokio::time::timeout(timeout, call)
            .await
            .map_err(|_| CapabilityError::Timeout {
                secs: timeout.as_secs(),
            })?
    }
}

async fn decode_blocking(path: std::path::PathBuf) -> Result<DecodedAudio, MediaDocError> {
    tokio::task::spawn_blocking(move || decode_wav_file(&path))
        .await
        .map_err(|e| MediaDocError::Internal(format!("Decode task panicked: {}", e)))?
}

/// Run one job with engines built from `config`.
///
/// Convenience for one-off jobs; long-lived callers should build a
/// [`MediaProcessor`] once and reuse it.
pub async fn process(job: &Job, config: &ProcessorConfig) -> Result<JobOutput, MediaDocError> {
    MediaProcessor::from_config(config.clone())?.process(job).await
}

/// Run one job on the file at `input`, parsing kind and languages from strings.
pub async fn process_file(
    input: impl AsRef<Path>,
    kind: &str,
    source_language: &str,
    target_language: &str,
    config: &ProcessorConfig,
) -> Result<JobOutput, MediaDocError> {
    let job = Job::from_request(kind, source_language, target_language, input.as_ref())?;
    process(&job, config).await
}
