//! Whole-job integration tests with in-process fake engines.
//!
//! No network, ffmpeg or pdfium is needed: every capability is a fake that
//! records how often it was called. Audio is generated on the fly at a low
//! sample rate so long recordings stay small.

use async_trait::async_trait;
use edgequake_media2doc::engines::{FfmpegExtractor, FileDocumentReader};
use edgequake_media2doc::pipeline::audio::{write_wav, DecodedAudio};
use edgequake_media2doc::pipeline::stages::{SUMMARY_TOO_SHORT, TRANSLATION_FAILED};
use edgequake_media2doc::{
    AudioExtractor, CapabilityError, DocumentFormat, DocumentReader, DocumentRenderer, Engines,
    Entity, EntityExtractor, ErrorKind, InputKind, Job, JobProgressCallback, MediaDocError,
    MediaProcessor, ProcessorConfig, SourceLanguage, SpeechToText, StageKind, StageStatus,
    Summarizer, TargetLanguage, Translator,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::{TempDir, TempPath};

const RATE: u32 = 100;

// ── Fakes ────────────────────────────────────────────────────────────────────

/// Every engine at once. Each chunk of generated audio carries its 1-based
/// number as sample value, which the recogniser reads back.
#[derive(Default)]
struct Fakes {
    stt_calls: AtomicUsize,
    translate_calls: AtomicUsize,
    entity_calls: AtomicUsize,
    reads: AtomicUsize,
    extractions: AtomicUsize,
    failing_chunk: Option<i16>,
    failing_translation: bool,
    corrupt_track: bool,
}

#[async_trait]
impl SpeechToText for Fakes {
    async fn transcribe(&self, audio: &Path, _: &str) -> Result<String, CapabilityError> {
        self.stt_calls.fetch_add(1, Ordering::SeqCst);
        let mut reader =
            hound::WavReader::open(audio).map_err(|e| CapabilityError::failed(e.to_string()))?;
        let marker = reader
            .samples::<i16>()
            .next()
            .transpose()
            .map_err(|e| CapabilityError::failed(e.to_string()))?
            .unwrap_or(0);
        if Some(marker) == self.failing_chunk {
            return Err(CapabilityError::failed("recogniser rejected the audio"));
        }
        Ok(format!("  this is the recognised speech of chunk number {marker} from the fake engine  "))
    }
}

#[async_trait]
impl Translator for Fakes {
    async fn translate(&self, text: &str, target: &str) -> Result<String, CapabilityError> {
        self.translate_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_translation {
            return Err(CapabilityError::failed("provider unavailable"));
        }
        Ok(format!("[{target}] {text}"))
    }
}

#[async_trait]
impl Summarizer for Fakes {
    async fn summarize(&self, text: &str, _: usize, _: usize) -> Result<String, CapabilityError> {
        Ok(text.split_whitespace().take(5).collect::<Vec<_>>().join(" "))
    }
}

#[async_trait]
impl EntityExtractor for Fakes {
    async fn extract_entities(&self, _: &str) -> Result<Vec<Entity>, CapabilityError> {
        self.entity_calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![Entity::new("Chennai", "GPE")])
    }
}

#[async_trait]
impl DocumentReader for Fakes {
    async fn read_text(&self, _: &Path, format: DocumentFormat) -> Result<String, CapabilityError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(format!("Minutes ({format})\r\n\r\n\r\n\r\nAll present.   \n"))
    }
}

#[async_trait]
impl AudioExtractor for Fakes {
    async fn extract_audio_track(
        &self,
        _: &Path,
        scratch_dir: &Path,
    ) -> Result<TempPath, CapabilityError> {
        self.extractions.fetch_add(1, Ordering::SeqCst);
        let file = tempfile::Builder::new()
            .prefix("audio_")
            .suffix(".wav")
            .tempfile_in(scratch_dir)?;
        if self.corrupt_track {
            std::fs::write(file.path(), b"RIFF? not a wave header")?;
            return Ok(file.into_temp_path());
        }
        let audio = marked_audio(90_000, 60_000);
        write_wav(file.as_file(), &audio, &audio.samples)
            .map_err(|e| CapabilityError::failed(e.to_string()))?;
        Ok(file.into_temp_path())
    }
}

/// Writes the text verbatim so tests can read back what was rendered.
#[async_trait]
impl DocumentRenderer for Fakes {
    async fn render(&self, text: &str, output: &Path) -> Result<(), CapabilityError> {
        tokio::fs::write(output, text).await?;
        Ok(())
    }
}

#[derive(Default)]
struct Tracker {
    started: AtomicUsize,
    errors: AtomicUsize,
    stages: AtomicUsize,
}

impl JobProgressCallback for Tracker {
    fn on_job_start(&self, total_chunks: usize) {
        self.started.store(total_chunks, Ordering::SeqCst);
    }
    fn on_chunk_error(&self, _: usize, _: usize, _: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);
    }
    fn on_stage_complete(&self, _: StageKind, _: bool) {
        self.stages.fetch_add(1, Ordering::SeqCst);
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn scratch(&self) -> PathBuf {
        self.path("scratch")
    }

    fn outputs(&self) -> PathBuf {
        self.path("outputs")
    }

    fn config(&self) -> ProcessorConfig {
        ProcessorConfig::builder()
            .chunk_duration_ms(60_000)
            .concurrency(3)
            .scratch_dir(self.scratch())
            .output_dir(self.outputs())
            .build()
            .unwrap()
    }

    fn scratch_entries(&self) -> usize {
        std::fs::read_dir(self.scratch())
            .map(|d| d.count())
            .unwrap_or(0)
    }

    fn write_audio(&self, name: &str, audio: &DecodedAudio) -> PathBuf {
        let path = self.path(name);
        write_wav(
            std::fs::File::create(&path).unwrap(),
            audio,
            &audio.samples,
        )
        .unwrap();
        path
    }
}

/// Mono audio of `duration_ms` where every sample of chunk `i` equals `i + 1`.
fn marked_audio(duration_ms: u64, chunk_ms: u64) -> DecodedAudio {
    let frames_per_chunk = chunk_ms * RATE as u64 / 1000;
    let frames = duration_ms * RATE as u64 / 1000;
    let samples = (0..frames)
        .map(|f| (f / frames_per_chunk + 1) as i16)
        .collect();
    DecodedAudio::new(samples, RATE, 1)
}

fn engines(fakes: Arc<Fakes>) -> Engines {
    Engines {
        speech_to_text: fakes.clone(),
        translator: fakes.clone(),
        summarizer: fakes.clone(),
        entity_extractor: fakes.clone(),
        document_reader: fakes.clone(),
        audio_extractor: fakes.clone(),
        renderer: fakes,
    }
}

fn speech(n: i16) -> String {
    format!("this is the recognised speech of chunk number {n} from the fake engine")
}

// ── Audio jobs ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn failed_chunk_is_left_out_of_the_transcript() {
    let ws = Workspace::new();
    let fakes = Arc::new(Fakes {
        failing_chunk: Some(2),
        ..Default::default()
    });
    let tracker = Arc::new(Tracker::default());
    let mut config = ws.config();
    config.progress_callback = Some(tracker.clone());
    let processor = MediaProcessor::new(config, engines(fakes.clone()));

    let input = ws.write_audio("interview.wav", &marked_audio(150_000, 60_000));
    let job = Job::new(&input, InputKind::Audio, SourceLanguage::Tamil, TargetLanguage::English);
    let output = processor.process(&job).await.unwrap();

    assert_eq!(output.transcript, format!("{} {}", speech(1), speech(3)));
    assert_eq!(output.stats.total_chunks, 3);
    assert_eq!(output.stats.failed_chunks, 1);
    assert_eq!(fakes.stt_calls.load(Ordering::SeqCst), 3);

    let indices: Vec<_> = output.chunks.iter().map(|c| c.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
    assert!(output.chunks[1].error().is_some());
    assert_eq!((output.chunks[2].start_ms, output.chunks[2].end_ms), (120_000, 150_000));

    assert_eq!(output.translation.status, StageStatus::Ok);
    assert!(output.translation.value.starts_with("[en] "));
    assert_eq!(output.summary.status, StageStatus::Ok);
    assert_eq!(output.entities.value, vec![Entity::new("Chennai", "GPE")]);

    let name = &output.artifact.filename;
    assert!(name.starts_with("output_") && name.ends_with(".pdf"), "{name}");
    assert!(output.artifact.path.starts_with(ws.outputs()));

    assert_eq!(tracker.started.load(Ordering::SeqCst), 3);
    assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
    assert_eq!(tracker.stages.load(Ordering::SeqCst), 3);
    assert_eq!(ws.scratch_entries(), 0);
}

#[tokio::test]
async fn empty_audio_gives_an_empty_transcript() {
    let ws = Workspace::new();
    let fakes = Arc::new(Fakes::default());
    let processor = MediaProcessor::new(ws.config(), engines(fakes.clone()));

    let input = ws.write_audio("silence.wav", &DecodedAudio::new(Vec::new(), RATE, 1));
    let job = Job::new(&input, InputKind::Audio, SourceLanguage::default(), TargetLanguage::Hindi);
    let output = processor.process(&job).await.unwrap();

    assert_eq!(output.transcript, "");
    assert!(output.chunks.is_empty());
    assert_eq!(fakes.stt_calls.load(Ordering::SeqCst), 0);

    assert_eq!(output.translation.value, "");
    assert!(matches!(output.translation.status, StageStatus::Skipped { .. }));
    assert_eq!(output.summary.value, SUMMARY_TOO_SHORT);
    assert!(output.entities.value.is_empty());
    assert_eq!(fakes.translate_calls.load(Ordering::SeqCst), 0);
    assert_eq!(fakes.entity_calls.load(Ordering::SeqCst), 0);
    assert!(output.artifact.path.is_file());
}

#[tokio::test]
async fn failed_translation_is_rendered_as_its_fallback() {
    let ws = Workspace::new();
    let fakes = Arc::new(Fakes {
        failing_translation: true,
        ..Default::default()
    });
    let processor = MediaProcessor::new(ws.config(), engines(fakes));

    let input = ws.write_audio("talk.wav", &marked_audio(30_000, 60_000));
    let job = Job::new(&input, InputKind::Audio, SourceLanguage::Hindi, TargetLanguage::Tamil);
    let output = processor.process(&job).await.unwrap();

    assert_eq!(output.transcript, speech(1));
    assert_eq!(output.translation.value, TRANSLATION_FAILED);
    assert!(output.translation.is_failed());
    assert_eq!(output.summary.status, StageStatus::Ok);

    let bytes = processor
        .fetch_artifact(&output.artifact.filename)
        .await
        .unwrap();
    assert_eq!(bytes, TRANSLATION_FAILED.as_bytes());
}

#[tokio::test]
async fn video_track_is_removed_after_the_job() {
    let ws = Workspace::new();
    let fakes = Arc::new(Fakes::default());
    let processor = MediaProcessor::new(ws.config(), engines(fakes.clone()));

    let input = ws.path("lecture.mp4");
    std::fs::write(&input, b"not really a container").unwrap();
    let job = Job::new(&input, InputKind::Video, SourceLanguage::Bengali, TargetLanguage::English);
    let output = processor.process(&job).await.unwrap();

    assert_eq!(fakes.extractions.load(Ordering::SeqCst), 1);
    assert_eq!(output.stats.total_chunks, 2);
    assert_eq!(output.transcript, format!("{} {}", speech(1), speech(2)));
    assert_eq!(ws.scratch_entries(), 0);
}

#[tokio::test]
async fn undecodable_video_track_is_fatal_and_removed() {
    let ws = Workspace::new();
    let fakes = Arc::new(Fakes {
        corrupt_track: true,
        ..Default::default()
    });
    let processor = MediaProcessor::new(ws.config(), engines(fakes.clone()));

    let input = ws.path("lecture.mp4");
    std::fs::write(&input, b"not really a container").unwrap();
    let job = Job::new(&input, InputKind::Video, SourceLanguage::Bengali, TargetLanguage::English);
    let err = processor.process(&job).await.unwrap_err();

    assert!(matches!(err, MediaDocError::AudioDecodeFailed { .. }), "{err:?}");
    assert_eq!(err.kind(), ErrorKind::BadInput);
    assert_eq!(fakes.extractions.load(Ordering::SeqCst), 1);
    assert_eq!(fakes.stt_calls.load(Ordering::SeqCst), 0);
    assert_eq!(ws.scratch_entries(), 0);
}

#[tokio::test]
async fn upload_is_stored_under_a_sanitised_name_and_removed() {
    let ws = Workspace::new();
    let fakes = Arc::new(Fakes::default());
    let processor = MediaProcessor::new(ws.config(), engines(fakes));

    let mut bytes = std::io::Cursor::new(Vec::new());
    let audio = marked_audio(10_000, 60_000);
    write_wav(&mut bytes, &audio, &audio.samples).unwrap();

    let output = processor
        .process_upload(bytes.get_ref(), "../../etc/evil name.WAV", "audio", "en-US", "en")
        .await
        .unwrap();

    assert_eq!(output.transcript, speech(1));
    assert_eq!(ws.scratch_entries(), 0);
}

#[tokio::test]
async fn concurrent_jobs_get_distinct_artifacts() {
    let ws = Workspace::new();
    let fakes = Arc::new(Fakes::default());
    let processor = MediaProcessor::new(ws.config(), engines(fakes));
    let input = ws.write_audio("talk.wav", &marked_audio(20_000, 60_000));

    let jobs = (0..8).map(|_| {
        let processor = processor.clone();
        let job = Job::new(&input, InputKind::Audio, SourceLanguage::EnglishUs, TargetLanguage::English);
        tokio::spawn(async move { processor.process(&job).await })
    });
    let mut names = Vec::new();
    for handle in futures::future::join_all(jobs).await {
        names.push(handle.unwrap().unwrap().artifact.filename);
    }
    names.sort();
    names.dedup();
    assert_eq!(names.len(), 8);
    assert_eq!(std::fs::read_dir(ws.outputs()).unwrap().count(), 8);
}

// ── Document jobs ────────────────────────────────────────────────────────────

#[tokio::test]
async fn documents_bypass_speech_recognition() {
    let ws = Workspace::new();
    let fakes = Arc::new(Fakes::default());
    let processor = MediaProcessor::new(ws.config(), engines(fakes.clone()));

    for name in ["minutes.docx", "minutes.PDF"] {
        let input = ws.path(name);
        std::fs::write(&input, b"placeholder").unwrap();
        let job = Job::new(&input, InputKind::Document, SourceLanguage::default(), TargetLanguage::English);
        let output = processor.process(&job).await.unwrap();

        let format = if name.ends_with("docx") { "docx" } else { "pdf" };
        assert_eq!(output.transcript, format!("Minutes ({format})\n\nAll present."));
        assert!(output.chunks.is_empty());
    }
    assert_eq!(fakes.reads.load(Ordering::SeqCst), 2);
    assert_eq!(fakes.stt_calls.load(Ordering::SeqCst), 0);
    assert_eq!(fakes.extractions.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unsupported_document_format_is_rejected() {
    let ws = Workspace::new();
    let fakes = Arc::new(Fakes::default());
    let processor = MediaProcessor::new(ws.config(), engines(fakes.clone()));

    let input = ws.path("notes.docx.txt");
    std::fs::write(&input, b"plain").unwrap();
    let job = Job::new(&input, InputKind::Document, SourceLanguage::default(), TargetLanguage::English);
    let err = processor.process(&job).await.unwrap_err();

    assert!(matches!(err, MediaDocError::UnsupportedDocumentFormat { .. }));
    assert_eq!(err.kind(), ErrorKind::BadInput);
    assert_eq!(fakes.reads.load(Ordering::SeqCst), 0);
}

// ── Fatal errors ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn bad_requests_fail_before_any_file_is_touched() {
    let err = Job::from_request("spreadsheet", "en-US", "en", "/nonexistent").unwrap_err();
    assert!(matches!(err, MediaDocError::UnsupportedInputKind { .. }));
    assert_eq!(err.kind(), ErrorKind::BadInput);

    let err = Job::from_request("audio", "xx-XX", "en", "/nonexistent").unwrap_err();
    assert!(matches!(err, MediaDocError::UnsupportedLanguage { .. }));
}

#[tokio::test]
async fn missing_file_is_reported() {
    let ws = Workspace::new();
    let processor = MediaProcessor::new(ws.config(), engines(Arc::new(Fakes::default())));
    let job = Job::new(ws.path("gone.wav"), InputKind::Audio, SourceLanguage::default(), TargetLanguage::English);
    let err = processor.process(&job).await.unwrap_err();
    assert!(matches!(err, MediaDocError::FileNotFound { .. }));
}

#[tokio::test]
async fn missing_font_fails_before_transcription() {
    let ws = Workspace::new();
    let fakes = Arc::new(Fakes::default());
    let mut engines = engines(fakes.clone());
    engines.renderer = Arc::new(edgequake_media2doc::engines::PdfRenderer::new(
        ws.path("NoSuchFont.ttf"),
        None,
    ));
    let processor = MediaProcessor::new(ws.config(), engines);

    let input = ws.write_audio("talk.wav", &marked_audio(30_000, 60_000));
    let job = Job::new(&input, InputKind::Audio, SourceLanguage::default(), TargetLanguage::English);
    let err = processor.process(&job).await.unwrap_err();

    assert!(matches!(err, MediaDocError::FontNotFound { .. }));
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(fakes.stt_calls.load(Ordering::SeqCst), 0);
    assert_eq!(fakes.translate_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_pdfium_is_a_configuration_error() {
    let ws = Workspace::new();
    let fakes = Arc::new(Fakes::default());
    let mut engines = engines(fakes.clone());
    engines.document_reader = Arc::new(FileDocumentReader::new(Some(ws.path("no-pdfium"))));
    let processor = MediaProcessor::new(ws.config(), engines);

    let input = ws.path("report.pdf");
    std::fs::write(&input, b"%PDF-1.4 placeholder").unwrap();
    let job = Job::new(&input, InputKind::Document, SourceLanguage::default(), TargetLanguage::English);
    let err = processor.process(&job).await.unwrap_err();

    assert!(matches!(err, MediaDocError::PdfiumBindingFailed(_)), "{err:?}");
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(fakes.translate_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_ffmpeg_is_a_configuration_error() {
    let ws = Workspace::new();
    let fakes = Arc::new(Fakes::default());
    let mut engines = engines(fakes.clone());
    engines.audio_extractor = Arc::new(FfmpegExtractor::new(ws.path("no-ffmpeg")));
    let processor = MediaProcessor::new(ws.config(), engines);

    let input = ws.path("lecture.mp4");
    std::fs::write(&input, b"not really a container").unwrap();
    let job = Job::new(&input, InputKind::Video, SourceLanguage::default(), TargetLanguage::English);
    let err = processor.process(&job).await.unwrap_err();

    assert!(matches!(err, MediaDocError::EngineNotConfigured { .. }), "{err:?}");
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(fakes.stt_calls.load(Ordering::SeqCst), 0);
    assert_eq!(ws.scratch_entries(), 0);
}

#[tokio::test]
async fn artifact_fetch_rejects_traversal_even_when_target_exists() {
    let ws = Workspace::new();
    let processor = MediaProcessor::new(ws.config(), engines(Arc::new(Fakes::default())));
    std::fs::create_dir_all(ws.outputs()).unwrap();
    std::fs::write(ws.path("secret.txt"), b"do not serve").unwrap();

    for name in ["../secret.txt", "..\\secret.txt", "/etc/passwd", ""] {
        let err = processor.fetch_artifact(name).await.unwrap_err();
        assert!(
            matches!(err, MediaDocError::InvalidArtifactName { .. }),
            "{name:?} gave {err:?}"
        );
    }

    let err = processor.fetch_artifact("output_missing.pdf").await.unwrap_err();
    assert!(matches!(err, MediaDocError::ArtifactNotFound { .. }));
}
