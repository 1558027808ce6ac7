//! Test doubles for the provider traits (compiled under `#[cfg(test)]` only).
//!
//! * [`MockGenerator`] replays a scripted list of responses and records every
//!   prompt it receives.
//! * [`MockEmbedder`] hashes words into a small bag-of-words vector so equal
//!   texts embed identically; it can be told to fail on a marker substring.
//! * [`MockSynthesizer`] returns `"[voice|text]"` as the audio bytes.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::provider::{
    Embedder, GenerationRequest, ProviderError, SpeechRequest, SpeechSynthesizer, TextGenerator,
};

// ---------------------------------------------------------------------------
// MockGenerator
// ---------------------------------------------------------------------------

pub struct MockGenerator {
    responses: Mutex<VecDeque<Result<String, ProviderError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockGenerator {
    /// Replay `responses` in order; once drained every call fails with
    /// [`ProviderError::EmptyResponse`].
    pub fn scripted<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_results(responses.into_iter().map(|s| Ok(s.into())))
    }

    pub fn with_results(results: impl IntoIterator<Item = Result<String, ProviderError>>) -> Self {
        Self {
            responses: Mutex::new(results.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self::with_results([Err(ProviderError::Timeout)])
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ProviderError::EmptyResponse))
    }
}

// ---------------------------------------------------------------------------
// MockEmbedder
// ---------------------------------------------------------------------------

pub struct MockEmbedder {
    dims: usize,
    fail_on: Option<String>,
}

impl MockEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims, fail_on: None }
    }

    /// Fail every text containing `marker`.
    pub fn failing_on(dims: usize, marker: &str) -> Self {
        Self {
            dims,
            fail_on: Some(marker.to_string()),
        }
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        if let Some(marker) = &self.fail_on {
            if text.contains(marker.as_str()) {
                return Err(ProviderError::Request("connection refused".into()));
            }
        }
        let mut vector = vec![0.0f32; self.dims];
        for word in text.split_whitespace() {
            let word = word.to_lowercase();
            let slot = word
                .bytes()
                .fold(7usize, |h, b| h.wrapping_mul(31).wrapping_add(b as usize));
            vector[slot % self.dims] += 1.0;
        }
        Ok(vector)
    }
}

// ---------------------------------------------------------------------------
// MockSynthesizer
// ---------------------------------------------------------------------------

pub struct MockSynthesizer {
    fail_on: Option<String>,
    requests: Mutex<Vec<SpeechRequest>>,
}

impl MockSynthesizer {
    pub fn new() -> Self {
        Self {
            fail_on: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(marker: &str) -> Self {
        Self {
            fail_on: Some(marker.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<SpeechRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(marker) = &self.fail_on {
            if request.text.contains(marker.as_str()) {
                return Err(ProviderError::Status {
                    status: 500,
                    body: "synthesis failed".into(),
                });
            }
        }
        Ok(format!("[{}|{}]", request.voice, request.text).into_bytes())
    }
}
