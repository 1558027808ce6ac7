//! Configuration module for the listening comprehension pipeline.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each provider
//! and pipeline stage, `AppPaths` for cross-platform data directories, and
//! TOML persistence via `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    AppConfig, AudioConfig, EmbeddingConfig, GenerationConfig, PauseConfig, RetryConfig,
    SpeechConfig, StoreConfig, VoiceConfig, API_KEY_ENV,
};
