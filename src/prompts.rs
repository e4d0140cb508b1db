//! Prompts for the LLM-backed translation, summary and entity engines.
//!
//! Every prompt lives here so a change to the engines' behaviour is one edit,
//! and unit tests can inspect the prompts without calling a model.

/// System prompt for translation.
pub const TRANSLATION_SYSTEM_PROMPT: &str = r#"You are a professional translator.

Rules:
- Translate the user's text into the requested language, completely and faithfully
- Preserve names, numbers and paragraph breaks
- Use the native script of the target language
- If the text is already in the target language, return it unchanged
- Output ONLY the translation: no notes, no quotation marks, no code fences"#;

/// System prompt for summarisation. `{min}` and `{max}` are word bounds.
pub const SUMMARY_SYSTEM_PROMPT: &str = r#"You summarise transcripts and documents.

Rules:
- Write a single concise summary of between {min} and {max} words
- Keep the language of the original text
- State only what the text says; add nothing
- Output ONLY the summary: no heading, no preamble, no code fences"#;

/// System prompt for named-entity extraction.
pub const ENTITY_SYSTEM_PROMPT: &str = r#"You are a named-entity recogniser.

Return every named entity in the user's text as a JSON array of objects with
exactly two string fields, "text" and "label", in order of first appearance.
Use these labels: PERSON, NORP, FAC, ORG, GPE, LOC, PRODUCT, EVENT,
WORK_OF_ART, LAW, LANGUAGE, DATE, TIME, PERCENT, MONEY, QUANTITY, ORDINAL,
CARDINAL.

Copy entity text exactly as written. If there are no entities return [].
Output ONLY the JSON array."#;

/// User message asking for a translation into `language` (display name).
pub fn translation_request(text: &str, language: &str) -> String {
    format!("Translate the following text into {}:\n\n{}", language, text)
}

/// The summary system prompt with its word bounds filled in.
pub fn summary_system_prompt(min_words: usize, max_words: usize) -> String {
    SUMMARY_SYSTEM_PROMPT
        .replace("{min}", &min_words.to_string())
        .replace("{max}", &max_words.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_bounds_are_filled() {
        let p = summary_system_prompt(40, 150);
        assert!(p.contains("between 40 and 150 words"));
        assert!(!p.contains('{'));
    }

    #[test]
    fn translation_request_names_language() {
        let m = translation_request("Good morning", "Tamil");
        assert!(m.starts_with("Translate the following text into Tamil:"));
        assert!(m.ends_with("Good morning"));
    }

    #[test]
    fn entity_prompt_asks_for_json() {
        assert!(ENTITY_SYSTEM_PROMPT.contains("\"text\""));
        assert!(ENTITY_SYSTEM_PROMPT.contains("\"label\""));
        assert!(ENTITY_SYSTEM_PROMPT.contains("[]"));
    }
}
