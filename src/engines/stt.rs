//! Speech-to-text over an OpenAI-compatible `/audio/transcriptions` API.
//!
//! Works with OpenAI Whisper, Groq, a local `faster-whisper-server`, or any
//! endpoint that accepts the same multipart form.

use crate::capability::SpeechToText;
use crate::config::ProcessorConfig;
use crate::error::{CapabilityError, MediaDocError};
use crate::language::SourceLanguage;
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

const DEFAULT_STT_URL: &str = "https://api.openai.com/v1";
const DEFAULT_STT_MODEL: &str = "whisper-1";

/// Remote speech-to-text client.
#[derive(Clone)]
pub struct WhisperApiStt {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for WhisperApiStt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperApiStt")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl WhisperApiStt {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Build from config, falling back to `STT_API_URL`, `STT_API_KEY` /
    /// `OPENAI_API_KEY` and `STT_MODEL`.
    pub fn from_config(config: &ProcessorConfig) -> Result<Self, MediaDocError> {
        let base_url = config
            .stt_api_url
            .clone()
            .or_else(|| non_empty_env("STT_API_URL"))
            .unwrap_or_else(|| DEFAULT_STT_URL.to_string());
        let api_key = config
            .stt_api_key
            .clone()
            .or_else(|| non_empty_env("STT_API_KEY"))
            .or_else(|| non_empty_env("OPENAI_API_KEY"))
            .ok_or_else(|| MediaDocError::EngineNotConfigured {
                engine: "speech-to-text".to_string(),
                hint: "Set STT_API_KEY (or OPENAI_API_KEY), or pass --stt-api-key.".to_string(),
            })?;
        let model = config
            .stt_model
            .clone()
            .or_else(|| non_empty_env("STT_MODEL"))
            .unwrap_or_else(|| DEFAULT_STT_MODEL.to_string());

        Ok(Self::new(base_url, api_key, model))
    }

    fn endpoint(&self) -> String {
        format!("{}/audio/transcriptions", self.base_url)
    }
}

#[async_trait]
impl SpeechToText for WhisperApiStt {
    async fn transcribe(&self, audio: &Path, language: &str) -> Result<String, CapabilityError> {
        let wav = tokio::fs::read(audio).await?;
        let part = reqwest::multipart::Part::bytes(wav)
            .file_name("chunk.wav")
            .mime_str("audio/wav")
            .map_err(|e| CapabilityError::failed(e.to_string()))?;

        let mut form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone());
        // The API takes ISO-639-1; locales like `ta-IN` are narrowed first.
        let iso = language
            .parse::<SourceLanguage>()
            .map(|l| l.iso_639_1().to_string())
            .unwrap_or_else(|_| language.split('-').next().unwrap_or(language).to_string());
        if !iso.is_empty() {
            form = form.text("language", iso);
        }

        let res = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| CapabilityError::failed(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(CapabilityError::failed(format!(
                "STT API error {}: {}",
                status, body
            )));
        }

        let json: serde_json::Value = res
            .json()
            .await
            .map_err(|e| CapabilityError::failed(e.to_string()))?;
        let text = transcript_text(&json)?;
        debug!("STT returned {} chars", text.len());
        Ok(text)
    }
}

/// Pull the `text` field out of a transcription response.
fn transcript_text(json: &serde_json::Value) -> Result<String, CapabilityError> {
    json.get("text")
        .and_then(|t| t.as_str())
        .map(|t| t.trim().to_string())
        .ok_or_else(|| CapabilityError::failed(format!("STT response has no text: {}", json)))
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
