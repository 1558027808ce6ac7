//! External provider capabilities consumed by the pipeline.
//!
//! This module provides:
//! * [`TextGenerator`] / [`ApiGenerator`] — single-message text completion.
//! * [`Embedder`] / [`ApiEmbedder`] — fixed-length text embeddings.
//! * [`SpeechSynthesizer`] / [`ApiSynthesizer`] — text-to-speech clips.
//! * [`ProviderError`] — error variants shared by every provider call.
//!
//! Every pipeline component receives these as `Arc<dyn …>` at construction
//! so tests can substitute scripted fakes. The `Api*` implementations speak
//! the OpenAI-compatible REST wire format; connection details come from
//! [`crate::config`] and nothing is hardcoded.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use listening_comp::config::AppConfig;
//! use listening_comp::provider::{ApiGenerator, GenerationRequest, TextGenerator};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let generator = ApiGenerator::from_config(&config.generation);
//!
//!     let request = GenerationRequest::new("Bonjour ?", 0.1);
//!     let text = generator.generate(&request).await.unwrap();
//!     println!("{text}");
//! }
//! ```

pub mod embedder;
pub mod error;
pub mod generator;
pub mod speech;

#[cfg(test)]
pub mod mock;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use embedder::{ApiEmbedder, Embedder};
pub use error::ProviderError;
pub use generator::{ApiGenerator, GenerationRequest, TextGenerator};
pub use speech::{ApiSynthesizer, SpeechRequest, SpeechSynthesizer};

// ---------------------------------------------------------------------------
// Shared HTTP helpers
// ---------------------------------------------------------------------------

/// Build a client whose every request is bounded by `timeout_secs`.
///
/// A default client is used as a last-resort fallback if the builder fails.
pub(crate) fn http_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Attach `Authorization: Bearer …` only when `api_key` is a non-empty string.
pub(crate) fn authorize(
    request: reqwest::RequestBuilder,
    api_key: Option<&str>,
) -> reqwest::RequestBuilder {
    match api_key {
        Some(key) if !key.is_empty() => request.bearer_auth(key),
        _ => request,
    }
}

/// Turn a non-2xx response into [`ProviderError::Status`].
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::Status {
        status: status.as_u16(),
        body,
    })
}
