//! Transcription stage: speech-to-text for each chunk, one failure at a time.
//!
//! Every chunk is written to its own temporary WAV in the scratch directory,
//! handed to the [`SpeechToText`] engine, and deleted again. The temp file is
//! a [`tempfile::NamedTempFile`], so deletion happens on success, on failure,
//! and on cancellation alike. Random file names keep concurrent jobs sharing
//! one scratch directory from colliding.
//!
//! ## Containment
//!
//! [`transcribe_chunk`] never returns an error. Write failures, engine
//! errors and timeouts all become [`ChunkOutcome::Failed`] and the job moves
//! on to the next chunk.

use crate::capability::SpeechToText;
use crate::error::{CapabilityError, ChunkError};
use crate::output::{ChunkOutcome, ChunkResult};
use crate::pipeline::audio::write_wav;
use crate::pipeline::chunk::AudioChunk;
use crate::progress::ProgressCallback;
use futures::stream::{self, StreamExt};
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Everything a chunk needs besides its audio, shared across all chunks of a job.
#[derive(Clone)]
pub struct TranscribeContext {
    pub speech_to_text: Arc<dyn SpeechToText>,
    /// Locale code passed to the engine, e.g. `ta-IN`.
    pub language: String,
    pub scratch_dir: PathBuf,
    pub timeout: Duration,
    pub total_chunks: usize,
    pub progress: Option<ProgressCallback>,
}

/// Transcribe one chunk. Always returns a result.
pub async fn transcribe_chunk(chunk: AudioChunk, ctx: &TranscribeContext) -> ChunkResult {
    let start = Instant::now();
    let index = chunk.index;

    if let Some(ref cb) = ctx.progress {
        cb.on_chunk_start(index, ctx.total_chunks);
    }

    let outcome = match recognise(&chunk, ctx).await {
        Ok(text) => {
            let text = text.trim().to_string();
            debug!(
                "Chunk {}: {} chars in {:?}",
                index,
                text.len(),
                start.elapsed()
            );
            if let Some(ref cb) = ctx.progress {
                cb.on_chunk_complete(index, ctx.total_chunks, text.len());
            }
            ChunkOutcome::Text(text)
        }
        Err(e) => {
            warn!("Failed on chunk {}: {}", index, e);
            if let Some(ref cb) = ctx.progress {
                cb.on_chunk_error(index, ctx.total_chunks, &e.to_string());
            }
            ChunkOutcome::Failed(e)
        }
    };

    ChunkResult {
        index,
        start_ms: chunk.start_ms,
        end_ms: chunk.end_ms,
        outcome,
        duration_ms: start.elapsed().as_millis() as u64,
    }
}

/// Persist, recognise, release.
async fn recognise(chunk: &AudioChunk, ctx: &TranscribeContext) -> Result<String, ChunkError> {
    let index = chunk.index;
    let temp = persist_chunk(chunk.clone(), ctx.scratch_dir.clone()).await?;

    let result = tokio::time::timeout(
        ctx.timeout,
        ctx.speech_to_text.transcribe(temp.path(), &ctx.language),
    )
    .await;

    // Released before the outcome is inspected so no path below can skip it.
    if let Err(e) = temp.close() {
        warn!("Chunk {}: could not delete temporary audio: {}", index, e);
    }

    match result {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(CapabilityError::Timeout { secs })) => Err(ChunkError::Timeout { index, secs }),
        Ok(Err(e)) => Err(ChunkError::RecognitionFailed {
            index,
            detail: e.to_string(),
        }),
        Err(_) => Err(ChunkError::Timeout {
            index,
            secs: ctx.timeout.as_secs(),
        }),
    }
}

/// Write the chunk to a fresh `chunk_*.wav` in the scratch directory.
async fn persist_chunk(chunk: AudioChunk, scratch_dir: PathBuf) -> Result<NamedTempFile, ChunkError> {
    let index = chunk.index;
    tokio::task::spawn_blocking(move || {
        let mut temp = tempfile::Builder::new()
            .prefix("chunk_")
            .suffix(".wav")
            .tempfile_in(&scratch_dir)
            .map_err(|e| e.to_string())?;
        write_wav(BufWriter::new(temp.as_file_mut()), chunk.source(), chunk.samples())
            .map_err(|e| e.to_string())?;
        Ok::<_, String>(temp)
    })
    .await
    .map_err(|e| ChunkError::WriteFailed {
        index,
        detail: format!("write task panicked: {e}"),
    })?
    .map_err(|detail| ChunkError::WriteFailed { index, detail })
}

/// Transcribe every chunk, at most `concurrency` at a time.
///
/// Results come back sorted by chunk index regardless of completion order.
pub async fn transcribe_chunks(
    chunks: impl Iterator<Item = AudioChunk>,
    ctx: &TranscribeContext,
    concurrency: usize,
) -> Vec<ChunkResult> {
    let mut results: Vec<ChunkResult> = stream::iter(chunks.map(|chunk| transcribe_chunk(chunk, ctx)))
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    results.sort_by_key(|r| r.index);
    results
}
