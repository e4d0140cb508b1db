//! Post-processing: deterministic whitespace cleanup of extracted text and
//! engine answers.
//!
//! Document readers hand back text with CRLF line endings, trailing blanks,
//! runs of empty lines, and the odd zero-width character from the source
//! file. LLM engines occasionally wrap a bare answer in a code fence. These
//! rules fix such artefacts without changing the words themselves.
//!
//! ## Rule Order
//!
//! Line endings are normalised before per-line trimming, and invisible
//! characters are removed before blank lines are collapsed (a line holding
//! only a zero-width space is blank).

use once_cell::sync::Lazy;
use regex::Regex;

/// Normalise document or transcript text.
///
/// 1. Normalise line endings (CRLF / CR → LF)
/// 2. Remove invisible Unicode (zero-width spaces, BOM, soft hyphens)
/// 3. Trim trailing whitespace per line
/// 4. Collapse 3+ consecutive newlines down to one blank line
/// 5. Trim the whole text
pub fn normalize_text(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = remove_invisible_chars(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    s.trim().to_string()
}

/// Clean an LLM answer: drop an outer code fence, then trim.
pub fn clean_engine_answer(input: &str) -> String {
    strip_code_fences(input).trim().to_string()
}

// ── Rule: Strip outer code fences ────────────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[A-Za-z]*\n(.*?)\n?```\s*$").unwrap());

/// Remove one enclosing ```` ``` ```` fence (any info string) if present.
pub fn strip_code_fences(input: &str) -> String {
    let trimmed = input.trim();
    match RE_OUTER_FENCES.captures(trimmed) {
        Some(caps) => caps[1].to_string(),
        None => input.to_string(),
    }
}

// ── Rule: Normalise line endings ─────────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule: Remove invisible Unicode characters ────────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule: Trim trailing whitespace per line ──────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule: Collapse excessive blank lines ─────────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").to_string()
}
