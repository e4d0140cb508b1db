//! Translation, summarisation and entity extraction through `edgequake-llm`.
//!
//! One [`LlmEngine`] implements all three text capabilities; the prompts are
//! in [`crate::prompts`]. Provider selection follows the same most-specific
//! to least-specific chain as every other edgequake tool, see
//! [`resolve_provider`].

use crate::capability::{EntityExtractor, Summarizer, Translator};
use crate::config::ProcessorConfig;
use crate::error::{CapabilityError, MediaDocError};
use crate::language::TargetLanguage;
use crate::output::Entity;
use crate::pipeline::postprocess::{clean_engine_answer, strip_code_fences};
use crate::prompts::{
    summary_system_prompt, translation_request, ENTITY_SYSTEM_PROMPT, TRANSLATION_SYSTEM_PROMPT,
};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

const DEFAULT_MODEL: &str = "gpt-4.1-nano";
const MAX_TOKENS: usize = 4096;

/// LLM-backed text engine.
#[derive(Clone)]
pub struct LlmEngine {
    provider: Arc<dyn LLMProvider>,
    temperature: f32,
}

impl LlmEngine {
    pub fn new(provider: Arc<dyn LLMProvider>, temperature: f32) -> Self {
        Self {
            provider,
            temperature,
        }
    }

    pub fn from_config(config: &ProcessorConfig) -> Result<Self, MediaDocError> {
        Ok(Self::new(resolve_provider(config)?, config.temperature))
    }

    async fn ask(&self, system: &str, user: &str) -> Result<String, CapabilityError> {
        let messages = vec![ChatMessage::system(system), ChatMessage::user(user)];
        let options = CompletionOptions {
            temperature: Some(self.temperature),
            max_tokens: Some(MAX_TOKENS),
            ..Default::default()
        };
        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| CapabilityError::failed(format!("{}", e)))?;
        debug!(
            "LLM: {} input tokens, {} output tokens",
            response.prompt_tokens, response.completion_tokens
        );
        Ok(response.content)
    }
}

#[async_trait]
impl Translator for LlmEngine {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, CapabilityError> {
        let language = target_language
            .parse::<TargetLanguage>()
            .map(|l| l.display_name().to_string())
            .unwrap_or_else(|_| target_language.to_string());
        let answer = self
            .ask(TRANSLATION_SYSTEM_PROMPT, &translation_request(text, &language))
            .await?;
        Ok(clean_engine_answer(&answer))
    }
}

#[async_trait]
impl Summarizer for LlmEngine {
    async fn summarize(
        &self,
        text: &str,
        min_length: usize,
        max_length: usize,
    ) -> Result<String, CapabilityError> {
        let answer = self
            .ask(&summary_system_prompt(min_length, max_length), text)
            .await?;
        Ok(clean_engine_answer(&answer))
    }
}

#[async_trait]
impl EntityExtractor for LlmEngine {
    async fn extract_entities(&self, text: &str) -> Result<Vec<Entity>, CapabilityError> {
        let answer = self.ask(ENTITY_SYSTEM_PROMPT, text).await?;
        parse_entities(&answer)
    }
}

#[derive(Deserialize)]
struct RawEntity {
    text: String,
    label: String,
}

/// Parse the model's JSON answer into entities, dropping blank entries.
pub fn parse_entities(answer: &str) -> Result<Vec<Entity>, CapabilityError> {
    let body = strip_code_fences(answer);
    let body = body.trim();
    if body.is_empty() {
        return Ok(Vec::new());
    }
    let raw: Vec<RawEntity> = serde_json::from_str(body)
        .map_err(|e| CapabilityError::failed(format!("unparseable entity list: {}", e)))?;
    Ok(raw
        .into_iter()
        .filter(|e| !e.text.trim().is_empty())
        .map(|e| Entity::new(e.text.trim(), e.label.trim().to_ascii_uppercase()))
        .collect())
}

/// Instantiate a named provider with the given model.
fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, MediaDocError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        MediaDocError::EngineNotConfigured {
            engine: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`), used as-is.
/// 2. **Named provider + model** (`config.provider_name`); the factory reads
///    the matching API key from the environment.
/// 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`),
///    checked before auto-detection so the model choice is honoured when
///    several API keys are present.
/// 4. **OpenAI** when `OPENAI_API_KEY` is set, else full auto-detection
///    (`ProviderFactory::from_env`).
pub fn resolve_provider(config: &ProcessorConfig) -> Result<Arc<dyn LLMProvider>, MediaDocError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        return create_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
            return create_provider("openai", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| MediaDocError::EngineNotConfigured {
            engine: "llm".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entities_from_plain_json() {
        let got = parse_entities(r#"[{"text": "Chennai", "label": "gpe"}, {"text": "Ravi", "label": "PERSON"}]"#)
            .unwrap();
        assert_eq!(
            got,
            vec![Entity::new("Chennai", "GPE"), Entity::new("Ravi", "PERSON")]
        );
    }

    #[test]
    fn entities_inside_code_fence() {
        let got = parse_entities("```json\n[{\"text\": \"ISRO\", \"label\": \"ORG\"}]\n```").unwrap();
        assert_eq!(got, vec![Entity::new("ISRO", "ORG")]);
    }

    #[test]
    fn empty_answers_mean_no_entities() {
        assert!(parse_entities("[]").unwrap().is_empty());
        assert!(parse_entities("  ").unwrap().is_empty());
        let got = parse_entities(r#"[{"text": " ", "label": "ORG"}]"#).unwrap();
        assert!(got.is_empty());
    }

    #[test]
    fn prose_is_rejected() {
        assert!(parse_entities("I found no entities, sorry.").is_err());
    }
}
