//! `Embedder` trait and the OpenAI-compatible `/v1/embeddings` client.

use async_trait::async_trait;

use crate::config::EmbeddingConfig;
use crate::provider::{authorize, check_status, http_client, ProviderError};

/// Turns one text into a fixed-length vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError>;
}

/// Calls an OpenAI-compatible `/v1/embeddings` endpoint.
pub struct ApiEmbedder {
    client: reqwest::Client,
    config: EmbeddingConfig,
}

impl ApiEmbedder {
    pub fn from_config(config: &EmbeddingConfig) -> Self {
        Self {
            client: http_client(config.timeout_secs),
            config: config.clone(),
        }
    }
}

#[async_trait]
impl Embedder for ApiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let url = format!("{}/v1/embeddings", self.config.base_url);
        let body = serde_json::json!({
            "model": self.config.model,
            "input": text,
        });

        let req = self.client.post(&url).json(&body);
        let response = authorize(req, self.config.api_key.as_deref()).send().await?;
        let response = check_status(response).await?;

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        parse_embedding(&json)
    }
}

fn parse_embedding(json: &serde_json::Value) -> Result<Vec<f32>, ProviderError> {
    let values = json["data"][0]["embedding"]
        .as_array()
        .ok_or(ProviderError::EmptyResponse)?;

    let vector = values
        .iter()
        .map(|v| {
            v.as_f64()
                .map(|f| f as f32)
                .ok_or_else(|| ProviderError::Parse(format!("non-numeric embedding value {v}")))
        })
        .collect::<Result<Vec<f32>, _>>()?;

    if vector.is_empty() {
        return Err(ProviderError::EmptyResponse);
    }
    Ok(vector)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_first_embedding() {
        let json = serde_json::json!({
            "data": [{ "embedding": [0.5, -1.0, 2.0] }]
        });
        assert_eq!(parse_embedding(&json).unwrap(), vec![0.5, -1.0, 2.0]);
    }

    #[test]
    fn missing_data_is_empty_response() {
        let json = serde_json::json!({ "data": [] });
        assert!(matches!(
            parse_embedding(&json),
            Err(ProviderError::EmptyResponse)
        ));
    }

    #[test]
    fn non_numeric_value_is_parse_error() {
        let json = serde_json::json!({
            "data": [{ "embedding": [0.5, "x"] }]
        });
        assert!(matches!(parse_embedding(&json), Err(ProviderError::Parse(_))));
    }
}
