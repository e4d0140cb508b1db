//! Pipeline stages for media-to-document processing.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and keeps the engines behind
//! [`crate::capability`] out of the control flow.
//!
//! ## Data Flow
//!
//! ```text
//! audio (.wav) ──────────────┐
//! audio / video ─▶ extract ──┴─▶ decode ─▶ chunk ─▶ transcribe ─▶ assemble ─┐
//! document ─▶ read ─▶ normalise ─────────────────────────────────────────────┴─▶ stages ─▶ artifact
//! ```
//!
//! 1. [`input`]      — validate the job and pick the route by declared kind
//! 2. [`audio`]      — decode WAV into interleaved 16-bit samples
//! 3. [`chunk`]      — cut audio into fixed-duration segments
//! 4. [`transcribe`] — speech-to-text per chunk with per-chunk containment;
//!    the only stage that touches the scratch directory
//! 5. [`assemble`]   — ordered join of successful chunk texts
//! 6. [`postprocess`] — whitespace normalisation for document text and
//!    engine answers
//! 7. [`stages`]     — translation, summary and entity extraction, each total
//! 8. [`artifact`]   — unique output names, atomic writes, safe retrieval

pub mod artifact;
pub mod assemble;
pub mod audio;
pub mod chunk;
pub mod input;
pub mod postprocess;
pub mod stages;
pub mod transcribe;
