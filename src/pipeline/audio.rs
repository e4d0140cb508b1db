//! WAV decoding and encoding with `hound`.
//!
//! Decoded audio is kept as interleaved 16-bit PCM at the file's own sample
//! rate and channel count; nothing is resampled. The recogniser receives each
//! chunk in the same format the extractor (or the user) produced.

use crate::error::MediaDocError;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::io::{Read, Seek, Write};
use std::path::Path;
use tracing::debug;

/// A fully decoded audio stream.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Interleaved samples, `channels` per frame.
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl DecodedAudio {
    pub fn new(samples: Vec<i16>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels: channels.max(1),
        }
    }

    /// Number of frames (one sample per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Duration in milliseconds, rounded up so every frame lies inside it.
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        let frames = self.frames() as u64;
        (frames * 1000).div_ceil(self.sample_rate as u64)
    }

    /// Frame index at time `ms`, clamped to the end of the stream.
    pub fn frame_at(&self, ms: u64) -> usize {
        let frame = ms * self.sample_rate as u64 / 1000;
        (frame as usize).min(self.frames())
    }

    /// Samples of frames `[start, end)`.
    pub fn frame_slice(&self, start: usize, end: usize) -> &[i16] {
        let ch = self.channels as usize;
        &self.samples[start * ch..end * ch]
    }

    fn spec(&self) -> WavSpec {
        WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        }
    }
}

/// Decode a WAV file.
pub fn decode_wav_file(path: &Path) -> Result<DecodedAudio, MediaDocError> {
    let reader = WavReader::open(path).map_err(|e| MediaDocError::AudioDecodeFailed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    let audio = decode_wav(reader).map_err(|e| MediaDocError::AudioDecodeFailed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    debug!(
        "Decoded {}: {} Hz, {} ch, {} ms",
        path.display(),
        audio.sample_rate,
        audio.channels,
        audio.duration_ms()
    );
    Ok(audio)
}

/// Decode WAV data from any reader, converting every sample to `i16`.
pub fn decode_wav<R: Read>(mut reader: WavReader<R>) -> Result<DecodedAudio, hound::Error> {
    let spec = reader.spec();
    let samples: Vec<i16> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, bits) if bits <= 16 => {
            let shift = 16 - bits;
            reader
                .samples::<i16>()
                .map(|s| s.map(|v| v << shift))
                .collect::<Result<_, _>>()?
        }
        (SampleFormat::Int, bits) => {
            let shift = bits - 16;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| (v >> shift) as i16))
                .collect::<Result<_, _>>()?
        }
        (SampleFormat::Float, _) => reader
            .samples::<f32>()
            .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * i16::MAX as f32) as i16))
            .collect::<Result<_, _>>()?,
    };

    Ok(DecodedAudio::new(samples, spec.sample_rate, spec.channels))
}

/// Encode a slice of `audio`'s samples as a 16-bit WAV into `writer`.
pub fn write_wav<W: Write + Seek>(
    writer: W,
    audio: &DecodedAudio,
    samples: &[i16],
) -> Result<(), hound::Error> {
    let mut wav = WavWriter::new(writer, audio.spec())?;
    for &s in samples {
        wav.write_sample(s)?;
    }
    wav.finalize()
}
