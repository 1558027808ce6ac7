//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings):
//!   Windows: %APPDATA%\listening-comp\
//!   macOS:   ~/Library/Application Support/listening-comp/
//!   Linux:   ~/.config/listening-comp/
//!
//! Data dir (vector store, generated audio, clip scratch space):
//!   Windows: %LOCALAPPDATA%\listening-comp\
//!   macOS:   ~/Library/Application Support/listening-comp/
//!   Linux:   ~/.local/share/listening-comp/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Directory holding the persisted question index.
    pub store_dir: PathBuf,
    /// Directory where finished question audio files are written.
    pub audio_dir: PathBuf,
    /// Parent directory for per-run intermediate clip directories.
    pub temp_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "listening-comp";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("settings.toml");
        let store_dir = data_dir.join("vectorstore");
        let audio_dir = data_dir.join("audio");
        let temp_dir = audio_dir.join("temp");

        Self {
            config_dir,
            settings_file,
            store_dir,
            audio_dir,
            temp_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
