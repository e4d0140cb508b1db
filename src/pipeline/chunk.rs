//! Chunk splitting: cut decoded audio into fixed-duration segments.
//!
//! Chunks partition `[0, duration)` with no gaps and no overlaps; every chunk
//! except the last is exactly `chunk_ms` long. The iterator is lazy and
//! holds only an `Arc` to the decoded audio, so chunks are cheap handles that
//! can be moved into concurrent tasks, and a fresh pass is one
//! [`ChunkPlan::chunks`] call away.

use crate::pipeline::audio::DecodedAudio;
use std::ops::Range;
use std::sync::Arc;

/// One segment of a job's audio.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// 0-based position; defines assembly order.
    pub index: usize,
    pub start_ms: u64,
    pub end_ms: u64,
    audio: Arc<DecodedAudio>,
    frames: Range<usize>,
}

impl AudioChunk {
    pub fn duration_ms(&self) -> u64 {
        self.end_ms - self.start_ms
    }

    /// Interleaved samples of this chunk.
    pub fn samples(&self) -> &[i16] {
        self.audio.frame_slice(self.frames.start, self.frames.end)
    }

    /// The audio this chunk was cut from (for its sample rate and channels).
    pub fn source(&self) -> &DecodedAudio {
        &self.audio
    }
}

/// How a decoded stream is divided.
#[derive(Debug, Clone)]
pub struct ChunkPlan {
    audio: Arc<DecodedAudio>,
    chunk_ms: u64,
}

impl ChunkPlan {
    /// `chunk_ms` of 0 is treated as 1.
    pub fn new(audio: Arc<DecodedAudio>, chunk_ms: u64) -> Self {
        Self {
            audio,
            chunk_ms: chunk_ms.max(1),
        }
    }

    pub fn chunk_ms(&self) -> u64 {
        self.chunk_ms
    }

    /// `ceil(duration / chunk_ms)`; 0 for empty audio.
    pub fn len(&self) -> usize {
        self.audio.duration_ms().div_ceil(self.chunk_ms) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A new pass over the chunks, in ascending time order.
    pub fn chunks(&self) -> Chunks {
        Chunks {
            audio: Arc::clone(&self.audio),
            chunk_ms: self.chunk_ms,
            duration_ms: self.audio.duration_ms(),
            next: 0,
            count: self.len(),
        }
    }
}

/// Lazy iterator over the chunks of a [`ChunkPlan`].
#[derive(Debug, Clone)]
pub struct Chunks {
    audio: Arc<DecodedAudio>,
    chunk_ms: u64,
    duration_ms: u64,
    next: usize,
    count: usize,
}

impl Iterator for Chunks {
    type Item = AudioChunk;

    fn next(&mut self) -> Option<AudioChunk> {
        if self.next >= self.count {
            return None;
        }
        let index = self.next;
        self.next += 1;

        let start_ms = index as u64 * self.chunk_ms;
        let end_ms = (start_ms + self.chunk_ms).min(self.duration_ms);
        let frames = self.audio.frame_at(start_ms)..self.audio.frame_at(end_ms);

        Some(AudioChunk {
            index,
            start_ms,
            end_ms,
            audio: Arc::clone(&self.audio),
            frames,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.count - self.next;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Chunks {}

/// Convenience: split `audio` into chunks of `chunk_ms`.
pub fn split_audio(audio: Arc<DecodedAudio>, chunk_ms: u64) -> Chunks {
    ChunkPlan::new(audio, chunk_ms).chunks()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn silence(ms: u64, rate: u32, channels: u16) -> Arc<DecodedAudio> {
        let frames = (ms * rate as u64 / 1000) as usize;
        Arc::new(DecodedAudio::new(
            vec![0; frames * channels as usize],
            rate,
            channels,
        ))
    }

    #[test]
    fn empty_audio_yields_no_chunks() {
        let plan = ChunkPlan::new(silence(0, 16_000, 1), 60_000);
        assert!(plan.is_empty());
        assert_eq!(plan.chunks().count(), 0);
    }

    #[test]
    fn hundred_fifty_seconds_make_three_chunks() {
        let chunks: Vec<_> = split_audio(silence(150_000, 8_000, 1), 60_000).collect();
        assert_eq!(chunks.len(), 3);
        let durations: Vec<u64> = chunks.iter().map(|c| c.duration_ms()).collect();
        assert_eq!(durations, vec![60_000, 60_000, 30_000]);
        assert_eq!(chunks[2].samples().len(), 30 * 8_000);
    }

    #[test]
    fn chunks_partition_the_stream() {
        for (ms, chunk_ms) in [(1_000, 300), (59_999, 60_000), (120_000, 60_000), (7_777, 1_000)] {
            let audio = silence(ms, 16_000, 2);
            let plan = ChunkPlan::new(Arc::clone(&audio), chunk_ms);
            let chunks: Vec<_> = plan.chunks().collect();

            let d = audio.duration_ms();
            assert_eq!(chunks.len() as u64, d.div_ceil(chunk_ms), "count for {ms}/{chunk_ms}");

            let mut cursor = 0;
            let mut samples = 0;
            for (i, c) in chunks.iter().enumerate() {
                assert_eq!(c.index, i);
                assert_eq!(c.start_ms, cursor, "gap or overlap at chunk {i}");
                if i + 1 < chunks.len() {
                    assert_eq!(c.duration_ms(), chunk_ms);
                }
                cursor = c.end_ms;
                samples += c.samples().len();
            }
            assert_eq!(cursor, d);
            assert_eq!(samples, audio.samples.len(), "every sample covered once");
        }
    }

    #[test]
    fn iteration_is_restartable() {
        let plan = ChunkPlan::new(silence(2_500, 8_000, 1), 1_000);
        let first: Vec<u64> = plan.chunks().map(|c| c.start_ms).collect();
        let second: Vec<u64> = plan.chunks().map(|c| c.start_ms).collect();
        assert_eq!(first, vec![0, 1_000, 2_000]);
        assert_eq!(first, second);

        let it = plan.chunks();
        assert_eq!(it.len(), 3);
        assert_eq!(it.clone().count(), it.count());
    }
}
