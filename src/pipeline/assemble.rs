//! Transcript assembly: ordered reduction of chunk results into one string.

use crate::output::ChunkResult;

/// Concatenate the text of successful chunks in index order.
///
/// Failed and whitespace-only chunks contribute nothing; the rest are
/// trimmed and joined with a single space. Never fails; the result may be
/// empty.
pub fn assemble_transcript(results: &[ChunkResult]) -> String {
    let mut ordered: Vec<&ChunkResult> = results.iter().collect();
    ordered.sort_by_key(|r| r.index);

    ordered
        .into_iter()
        .filter_map(|r| r.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
