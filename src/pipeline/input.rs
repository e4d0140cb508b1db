//! Input resolution: validate the job request before any resource is used.
//!
//! The declared input kind and both languages are parsed when the [`Job`] is
//! built, so a bad request is rejected before the file is even opened. Input
//! resolution then checks the file itself and, for documents, picks the
//! reader format from the extension.

use crate::capability::DocumentFormat;
use crate::error::MediaDocError;
use crate::language::{SourceLanguage, TargetLanguage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// What the user says the uploaded file is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Audio,
    Video,
    Document,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InputKind::Audio => "audio",
            InputKind::Video => "video",
            InputKind::Document => "document",
        })
    }
}

impl FromStr for InputKind {
    type Err = MediaDocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "audio" => Ok(InputKind::Audio),
            "video" => Ok(InputKind::Video),
            "document" => Ok(InputKind::Document),
            _ => Err(MediaDocError::UnsupportedInputKind {
                kind: s.to_string(),
            }),
        }
    }
}

/// One user request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub input: PathBuf,
    pub kind: InputKind,
    pub source_language: SourceLanguage,
    pub target_language: TargetLanguage,
}

impl Job {
    pub fn new(
        input: impl Into<PathBuf>,
        kind: InputKind,
        source_language: SourceLanguage,
        target_language: TargetLanguage,
    ) -> Self {
        Self {
            input: input.into(),
            kind,
            source_language,
            target_language,
        }
    }

    /// Build a job from the raw string fields of a request.
    ///
    /// Fails with `UnsupportedInputKind` / `UnsupportedLanguage` without
    /// touching the file system.
    pub fn from_request(
        kind: &str,
        source_language: &str,
        target_language: &str,
        input: impl Into<PathBuf>,
    ) -> Result<Self, MediaDocError> {
        Ok(Self {
            input: input.into(),
            kind: kind.parse()?,
            source_language: source_language.parse()?,
            target_language: target_language.parse()?,
        })
    }
}

/// How the orchestrator gets from the input file to a transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedInput {
    /// A WAV file that can be decoded directly.
    Wav(PathBuf),
    /// A container (video, or non-WAV audio) whose audio must be extracted first.
    Media(PathBuf),
    /// A document read by the document-reader engine.
    Document { path: PathBuf, format: DocumentFormat },
}

/// Lower-cased final extension of `path`, or an empty string.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

/// Resolve a job's input file for its declared kind.
pub fn resolve_input(job: &Job) -> Result<ResolvedInput, MediaDocError> {
    let path = &job.input;
    check_readable(path)?;

    let resolved = match job.kind {
        InputKind::Audio if extension_of(path) == "wav" => ResolvedInput::Wav(path.clone()),
        InputKind::Audio | InputKind::Video => ResolvedInput::Media(path.clone()),
        InputKind::Document => {
            // Only the last extension counts: `notes.DOCX.bak` is a .bak file.
            let ext = extension_of(path);
            let format = DocumentFormat::from_extension(&ext).ok_or_else(|| {
                MediaDocError::UnsupportedDocumentFormat {
                    path: path.clone(),
                    extension: ext.clone(),
                }
            })?;
            ResolvedInput::Document {
                path: path.clone(),
                format,
            }
        }
    };

    debug!("Resolved {} input: {:?}", job.kind, resolved);
    Ok(resolved)
}

/// Validate that the file exists and can be opened.
fn check_readable(path: &Path) -> Result<(), MediaDocError> {
    if !path.is_file() {
        return Err(MediaDocError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    match std::fs::File::open(path) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(MediaDocError::PermissionDenied {
                path: path.to_path_buf(),
            })
        }
        Err(_) => Err(MediaDocError::FileNotFound {
            path: path.to_path_buf(),
        }),
    }
}

/// Extension of an uploaded file name, restricted to ASCII alphanumerics.
///
/// Only the extension of client-supplied names is ever used; the rest of the
/// name never reaches the file system.
pub fn sanitized_extension(filename: &str) -> Option<String> {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let (_, ext) = base.rsplit_once('.')?;
    if ext.is_empty() || ext.len() > 8 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
