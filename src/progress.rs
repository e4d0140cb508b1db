//! Progress-callback trait for per-chunk and per-stage job events.
//!
//! Inject an [`Arc<dyn JobProgressCallback>`] via
//! [`crate::config::ProcessorConfigBuilder::progress_callback`] to receive
//! events as the pipeline transcribes each chunk and runs each stage.
//!
//! Callers can forward events to a channel, a WebSocket, or a terminal
//! progress bar without the library knowing how the host application
//! communicates. The trait is `Send + Sync` because chunks are transcribed
//! concurrently.
//!
//! # Example
//!
//! ```rust
//! use edgequake_media2doc::{JobProgressCallback, ProcessorConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl JobProgressCallback for CountingCallback {
//!     fn on_chunk_complete(&self, index: usize, total_chunks: usize, text_len: usize) {
//!         let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
//!         eprintln!("chunk {} ({}/{}) → {} chars", index, done, total_chunks, text_len);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { completed: AtomicUsize::new(0) });
//!
//! let config = ProcessorConfig::builder()
//!     .progress_callback(counter as Arc<dyn JobProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::output::StageKind;
use std::sync::Arc;

/// Called by the pipeline as it processes a job.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
///
/// # Thread safety
///
/// With `concurrency > 1`, `on_chunk_start`, `on_chunk_complete`, and
/// `on_chunk_error` may be called concurrently and out of index order.
pub trait JobProgressCallback: Send + Sync {
    /// Called once the input is resolved.
    ///
    /// # Arguments
    /// * `total_chunks` — number of audio chunks that will be transcribed
    ///   (0 for documents)
    fn on_job_start(&self, total_chunks: usize) {
        let _ = total_chunks;
    }

    /// Called just before a chunk is handed to the speech-to-text engine.
    ///
    /// # Arguments
    /// * `index`        — 0-based chunk index
    /// * `total_chunks` — total chunks in the job
    fn on_chunk_start(&self, index: usize, total_chunks: usize) {
        let _ = (index, total_chunks);
    }

    /// Called when a chunk is transcribed.
    ///
    /// # Arguments
    /// * `index`        — 0-based chunk index
    /// * `total_chunks` — total chunks
    /// * `text_len`     — byte length of the recognised text
    fn on_chunk_complete(&self, index: usize, total_chunks: usize, text_len: usize) {
        let _ = (index, total_chunks, text_len);
    }

    /// Called when a chunk fails. The job continues without its text.
    fn on_chunk_error(&self, index: usize, total_chunks: usize, error: &str) {
        let _ = (index, total_chunks, error);
    }

    /// Called after each transformation stage, `ok = false` when it degraded.
    fn on_stage_complete(&self, stage: StageKind, ok: bool) {
        let _ = (stage, ok);
    }

    /// Called once the artifact is written.
    ///
    /// # Arguments
    /// * `total_chunks`  — chunks attempted
    /// * `failed_chunks` — chunks that contributed no text
    fn on_job_complete(&self, total_chunks: usize, failed_chunks: usize) {
        let _ = (total_chunks, failed_chunks);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl JobProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ProcessorConfig`].
pub type ProgressCallback = Arc<dyn JobProgressCallback>;
