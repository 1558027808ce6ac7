//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across tasks.
//! Missing keys take their default, so a settings file only needs the
//! values it changes.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

/// Environment variable that overrides every provider API key.
pub const API_KEY_ENV: &str = "LISTENING_COMP_API_KEY";

// ---------------------------------------------------------------------------
// GenerationConfig
// ---------------------------------------------------------------------------

/// Settings for the generative model used by the structurer, the question
/// generator and the conversation parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Base URL of an OpenAI-compatible API endpoint.
    pub base_url: String,
    /// API key — `None` for local providers.
    pub api_key: Option<String>,
    /// Model identifier sent with every request.
    pub model: String,
    /// Maximum seconds to wait for a completion before timing out.
    pub timeout_secs: u64,
    /// Sampling temperature for transcript structuring.
    pub structurer_temperature: f32,
    /// Sampling temperature for new question generation.
    pub question_temperature: f32,
    /// Sampling temperature for answer feedback.
    pub feedback_temperature: f32,
    /// Sampling temperature for conversation formatting.
    pub conversation_temperature: f32,
    /// Completion token cap for conversation formatting.
    pub conversation_max_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".into(),
            api_key: None,
            model: "gpt-4o-mini".into(),
            timeout_secs: 60,
            structurer_temperature: 0.0,
            question_temperature: 0.1,
            feedback_temperature: 0.1,
            conversation_temperature: 0.0,
            conversation_max_tokens: 2000,
        }
    }
}

// ---------------------------------------------------------------------------
// EmbeddingConfig
// ---------------------------------------------------------------------------

/// Settings for the embedding provider backing the vector store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    /// Vector length returned by `model`; also the length of the zero vector
    /// substituted when an embedding call fails.
    pub dimensions: usize,
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".into(),
            api_key: None,
            model: "text-embedding-3-small".into(),
            dimensions: 1536,
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechConfig
// ---------------------------------------------------------------------------

/// Voice ids keyed by speaker gender.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    pub male: String,
    pub female: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            male: "Remi".into(),
            female: "Lea".into(),
        }
    }
}

/// Settings for the speech synthesis provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    /// BCP-47 language code of the synthesized speech.
    pub language: String,
    /// Synthesis engine requested from the provider (e.g. `"neural"`).
    pub engine: String,
    /// Container format of each synthesized clip.
    pub output_format: String,
    pub voices: VoiceConfig,
    pub timeout_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".into(),
            api_key: None,
            model: "tts-1".into(),
            language: "fr-FR".into(),
            engine: "neural".into(),
            output_format: "mp3".into(),
            voices: VoiceConfig::default(),
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// StoreConfig
// ---------------------------------------------------------------------------

/// Settings for the persisted question index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding `<collection>.json`.
    pub persist_dir: PathBuf,
    /// Collection name; also the file stem of the persisted index.
    pub collection: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            persist_dir: AppPaths::new().store_dir,
            collection: "questions".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// AudioConfig
// ---------------------------------------------------------------------------

/// Pause lengths inserted between synthesized turns, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PauseConfig {
    /// Between two turns of different sections.
    pub section_ms: u64,
    /// Between two speakers inside the same section.
    pub speaker_ms: u64,
    /// After every turn except the last.
    pub sentence_ms: u64,
}

impl Default for PauseConfig {
    fn default() -> Self {
        Self {
            section_ms: 1500,
            speaker_ms: 500,
            sentence_ms: 500,
        }
    }
}

/// Settings for audio assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Directory receiving the finished question audio files.
    pub output_dir: PathBuf,
    /// Parent directory of the per-run clip directories.
    pub temp_dir: PathBuf,
    /// `ffmpeg` executable name or absolute path.
    pub ffmpeg_path: PathBuf,
    pub pauses: PauseConfig,
    /// Sample rate of generated silence clips in Hz.
    pub silence_sample_rate: u32,
    /// MP3 bitrate of generated silence clips (ffmpeg `-b:a` syntax).
    pub silence_bitrate: String,
    /// Maximum seconds a single ffmpeg invocation may run.
    pub process_timeout_secs: u64,
    /// Run directories older than this are removed before a new run starts.
    pub stale_run_secs: u64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        let paths = AppPaths::new();
        Self {
            output_dir: paths.audio_dir,
            temp_dir: paths.temp_dir,
            ffmpeg_path: PathBuf::from("ffmpeg"),
            pauses: PauseConfig::default(),
            silence_sample_rate: 24_000,
            silence_bitrate: "48k".into(),
            process_timeout_secs: 60,
            stale_run_secs: 3600,
        }
    }
}

impl AudioConfig {
    pub fn process_timeout(&self) -> Duration {
        Duration::from_secs(self.process_timeout_secs)
    }

    pub fn stale_run_age(&self) -> Duration {
        Duration::from_secs(self.stale_run_secs)
    }
}

// ---------------------------------------------------------------------------
// RetryConfig
// ---------------------------------------------------------------------------

/// Bounded retry settings shared by every parse-and-retry loop.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use listening_comp::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub generation: GenerationConfig,
    pub embedding: EmbeddingConfig,
    pub speech: SpeechConfig,
    pub store: StoreConfig,
    pub audio: AudioConfig,
    pub retry: RetryConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`,
    /// then apply the [`API_KEY_ENV`] override.
    ///
    /// Returns the defaults when the file does not exist yet so callers never
    /// need to special-case a missing file.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&AppPaths::new().settings_file)?;
        config.apply_api_key(std::env::var(API_KEY_ENV).ok());
        Ok(config)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Overwrite every provider key with `key` when it is a non-empty string.
    pub fn apply_api_key(&mut self, key: Option<String>) {
        let Some(key) = key.filter(|k| !k.trim().is_empty()) else {
            return;
        };
        self.generation.api_key = Some(key.clone());
        self.embedding.api_key = Some(key.clone());
        self.speech.api_key = Some(key);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(original.generation.base_url, loaded.generation.base_url);
        assert_eq!(original.generation.model, loaded.generation.model);
        assert_eq!(
            original.generation.conversation_max_tokens,
            loaded.generation.conversation_max_tokens
        );
        assert_eq!(original.embedding.dimensions, loaded.embedding.dimensions);
        assert_eq!(original.speech.voices.male, loaded.speech.voices.male);
        assert_eq!(original.store.collection, loaded.store.collection);
        assert_eq!(original.audio.pauses, loaded.audio.pauses);
        assert_eq!(original.retry.max_attempts, loaded.retry.max_attempts);
    }

    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        assert_eq!(config.generation.model, AppConfig::default().generation.model);
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.embedding.dimensions, 1536);
        assert_eq!(cfg.speech.language, "fr-FR");
        assert_eq!(cfg.speech.engine, "neural");
        assert_eq!(cfg.speech.output_format, "mp3");
        assert_eq!(cfg.speech.voices.male, "Remi");
        assert_eq!(cfg.speech.voices.female, "Lea");
        assert_eq!(cfg.audio.pauses.section_ms, 1500);
        assert_eq!(cfg.audio.pauses.speaker_ms, 500);
        assert_eq!(cfg.audio.pauses.sentence_ms, 500);
        assert_eq!(cfg.generation.structurer_temperature, 0.0);
        assert_eq!(cfg.generation.question_temperature, 0.1);
        assert!(cfg.generation.api_key.is_none());
    }

    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.generation.base_url = "http://localhost:11434".into();
        cfg.generation.model = "qwen2.5:7b".into();
        cfg.audio.pauses.section_ms = 2500;
        cfg.audio.ffmpeg_path = PathBuf::from("/opt/ffmpeg/bin/ffmpeg");
        cfg.retry.max_attempts = 5;

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.generation.base_url, "http://localhost:11434");
        assert_eq!(loaded.generation.model, "qwen2.5:7b");
        assert_eq!(loaded.audio.pauses.section_ms, 2500);
        assert_eq!(loaded.audio.ffmpeg_path, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
        assert_eq!(loaded.retry.max_attempts, 5);
    }

    #[test]
    fn partial_file_keeps_given_keys_and_defaults_the_rest() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("partial.toml");
        std::fs::write(
            &path,
            "[generation]\nbase_url = \"http://localhost:8080\"\napi_key = \"sk-file\"\n\n\
             [audio.pauses]\nsection_ms = 2000\n",
        )
        .expect("write");

        let cfg = AppConfig::load_from(&path).expect("load");
        assert_eq!(cfg.generation.base_url, "http://localhost:8080");
        assert_eq!(cfg.generation.api_key.as_deref(), Some("sk-file"));
        assert_eq!(cfg.generation.model, "gpt-4o-mini");
        assert_eq!(cfg.audio.pauses.section_ms, 2000);
        assert_eq!(cfg.audio.pauses.speaker_ms, 500);
        assert_eq!(cfg.embedding.dimensions, 1536);
        assert_eq!(cfg.retry.max_attempts, 3);
    }

    #[test]
    fn api_key_override_applies_to_every_provider() {
        let mut cfg = AppConfig::default();
        cfg.apply_api_key(Some("sk-test".into()));

        assert_eq!(cfg.generation.api_key.as_deref(), Some("sk-test"));
        assert_eq!(cfg.embedding.api_key.as_deref(), Some("sk-test"));
        assert_eq!(cfg.speech.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn blank_api_key_override_is_ignored() {
        let mut cfg = AppConfig::default();
        cfg.generation.api_key = Some("from-file".into());
        cfg.apply_api_key(Some("  ".into()));
        cfg.apply_api_key(None);

        assert_eq!(cfg.generation.api_key.as_deref(), Some("from-file"));
        assert!(cfg.speech.api_key.is_none());
    }
}
