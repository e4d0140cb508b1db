//! Output types produced by the pipeline.
//!
//! Everything here is `Serialize` so the CLI's `--json` mode and any HTTP
//! layer can hand the result straight to a client.

use crate::error::ChunkError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Outcome of transcribing one audio chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum ChunkOutcome {
    Text(String),
    Failed(ChunkError),
}

/// One chunk's transcription result, tagged with its position in the audio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkResult {
    /// 0-based chunk index; defines assembly order.
    pub index: usize,
    pub start_ms: u64,
    pub end_ms: u64,
    pub outcome: ChunkOutcome,
    /// Wall-clock time spent on this chunk.
    pub duration_ms: u64,
}

impl ChunkResult {
    /// Recognised text, or `None` for a failed chunk.
    pub fn text(&self) -> Option<&str> {
        match &self.outcome {
            ChunkOutcome::Text(t) => Some(t),
            ChunkOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ChunkError> {
        match &self.outcome {
            ChunkOutcome::Text(_) => None,
            ChunkOutcome::Failed(e) => Some(e),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, ChunkOutcome::Text(_))
    }
}

/// The three transformation stages run over a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Translate,
    Summarize,
    ExtractEntities,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StageKind::Translate => "translate",
            StageKind::Summarize => "summarize",
            StageKind::ExtractEntities => "extract-entities",
        })
    }
}

/// Structured status of a stage, next to its user-facing value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageStatus {
    Ok,
    /// The stage chose not to call its engine (input too short, empty).
    Skipped { reason: String },
    /// The engine failed or timed out; `value` holds the fallback.
    Failed { reason: String },
}

/// Result of one stage. Always present, even when the engine failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageOutput<T> {
    pub value: T,
    pub status: StageStatus,
}

impl<T> StageOutput<T> {
    pub fn ok(value: T) -> Self {
        Self {
            value,
            status: StageStatus::Ok,
        }
    }

    pub fn skipped(value: T, reason: impl Into<String>) -> Self {
        Self {
            value,
            status: StageStatus::Skipped {
                reason: reason.into(),
            },
        }
    }

    pub fn failed(value: T, reason: impl Into<String>) -> Self {
        Self {
            value,
            status: StageStatus::Failed {
                reason: reason.into(),
            },
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, StageStatus::Failed { .. })
    }
}

/// A named entity found in the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    /// spaCy-style label: PERSON, ORG, GPE, DATE, ...
    pub label: String,
}

impl Entity {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
        }
    }
}

/// Results of the three transformation stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageResults {
    pub translation: StageOutput<String>,
    pub summary: StageOutput<String>,
    pub entities: StageOutput<Vec<Entity>>,
}

/// A rendered output document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    /// Unique file name inside the artifact directory; the only handle a
    /// client ever sees.
    pub filename: String,
    #[serde(skip)]
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Aggregate statistics for one job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobStats {
    /// Audio chunks attempted (0 for documents).
    pub total_chunks: usize,
    /// Chunks that contributed no text.
    pub failed_chunks: usize,
    /// Length of the transcript in characters.
    pub transcript_chars: usize,
    pub total_duration_ms: u64,
    pub transcription_duration_ms: u64,
    pub stages_duration_ms: u64,
    pub render_duration_ms: u64,
}

/// Complete result of a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobOutput {
    pub transcript: String,
    pub translation: StageOutput<String>,
    pub summary: StageOutput<String>,
    pub entities: StageOutput<Vec<Entity>>,
    pub artifact: Artifact,
    /// Per-chunk results in index order (empty for documents).
    pub chunks: Vec<ChunkResult>,
    pub stats: JobStats,
}
