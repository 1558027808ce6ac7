//! `SpeechSynthesizer` trait and the OpenAI-compatible `/v1/audio/speech`
//! client.

use async_trait::async_trait;

use crate::config::SpeechConfig;
use crate::provider::{authorize, check_status, http_client, ProviderError};

/// One synthesis request.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    pub text: String,
    pub voice: String,
    /// Container format, e.g. `"mp3"`.
    pub format: String,
    /// Provider engine, e.g. `"neural"`.
    pub engine: String,
    /// BCP-47 language, e.g. `"fr-FR"`.
    pub language: String,
}

impl SpeechRequest {
    /// Fill format, engine and language from `config`.
    pub fn from_config(config: &SpeechConfig, text: &str, voice: &str) -> Self {
        Self {
            text: text.to_string(),
            voice: voice.to_string(),
            format: config.output_format.clone(),
            engine: config.engine.clone(),
            language: config.language.clone(),
        }
    }
}

/// Produces encoded audio bytes for a piece of text.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>, ProviderError>;
}

/// Calls an OpenAI-compatible `/v1/audio/speech` endpoint.
///
/// `engine` and `language` are forwarded as extra body fields; providers that
/// do not know them ignore them.
pub struct ApiSynthesizer {
    client: reqwest::Client,
    config: SpeechConfig,
}

impl ApiSynthesizer {
    pub fn from_config(config: &SpeechConfig) -> Self {
        Self {
            client: http_client(config.timeout_secs),
            config: config.clone(),
        }
    }

    fn body(&self, request: &SpeechRequest) -> serde_json::Value {
        serde_json::json!({
            "model":           self.config.model,
            "input":           request.text,
            "voice":           request.voice,
            "response_format": request.format,
            "engine":          request.engine,
            "language":        request.language,
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for ApiSynthesizer {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>, ProviderError> {
        let url = format!("{}/v1/audio/speech", self.config.base_url);

        let req = self.client.post(&url).json(&self.body(request));
        let response = authorize(req, self.config.api_key.as_deref()).send().await?;
        let response = check_status(response).await?;

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(bytes.to_vec())
    }
}
