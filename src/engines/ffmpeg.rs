//! Audio-track extraction with the `ffmpeg` command-line tool.
//!
//! Produces 16 kHz mono 16-bit WAV, the format speech recognisers expect.
//! Also used to transcode non-WAV audio uploads (mp3, m4a, ogg) so the rest
//! of the pipeline only ever decodes WAV.

use crate::capability::AudioExtractor;
use crate::error::{CapabilityError, MediaDocError};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::TempPath;
use tokio::process::Command;
use tracing::debug;

/// Runs `ffmpeg` as a child process.
#[derive(Debug, Clone)]
pub struct FfmpegExtractor {
    binary: PathBuf,
}

impl Default for FfmpegExtractor {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FfmpegExtractor {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

/// Arguments converting `input` into 16 kHz mono WAV at `output`.
fn extract_args(input: &Path, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-nostdin", "-hide_banner", "-loglevel", "error", "-y", "-i"]
        .into_iter()
        .map(OsString::from)
        .collect();
    args.push(input.as_os_str().to_owned());
    args.extend(
        ["-vn", "-ac", "1", "-ar", "16000", "-c:a", "pcm_s16le", "-f", "wav"]
            .into_iter()
            .map(OsString::from),
    );
    args.push(output.as_os_str().to_owned());
    args
}

#[async_trait]
impl AudioExtractor for FfmpegExtractor {
    async fn extract_audio_track(
        &self,
        media: &Path,
        scratch_dir: &Path,
    ) -> Result<TempPath, CapabilityError> {
        let out = tempfile::Builder::new()
            .prefix("audio_")
            .suffix(".wav")
            .tempfile_in(scratch_dir)?
            .into_temp_path();

        debug!("Extracting audio from {} to {}", media.display(), out.display());
        let output = Command::new(&self.binary)
            .args(extract_args(media, &out))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                // Spawning fails only when the executable is missing or not runnable.
                CapabilityError::unavailable(MediaDocError::EngineNotConfigured {
                    engine: "ffmpeg".into(),
                    hint: format!(
                        "could not run {}: {}. Install ffmpeg or set ffmpeg_path.",
                        self.binary.display(),
                        e
                    ),
                })
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CapabilityError::failed(format!(
                "ffmpeg failed: {}",
                stderr.lines().last().unwrap_or("unknown error")
            )));
        }

        Ok(out)
    }
}
