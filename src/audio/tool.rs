//! External audio tool used for silence generation and concatenation.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::AudioConfig;
use crate::error::ClipToolError;

/// Local clip operations that are delegated to an external program.
#[async_trait]
pub trait ClipTool: Send + Sync {
    /// Write `duration_ms` of silence to `out`.
    async fn silence(&self, duration_ms: u64, out: &Path) -> Result<(), ClipToolError>;

    /// Concatenate the clips listed in `manifest` into `out` without
    /// re-encoding.
    async fn concat(&self, manifest: &Path, out: &Path) -> Result<(), ClipToolError>;
}

// ---------------------------------------------------------------------------
// Ffmpeg
// ---------------------------------------------------------------------------

/// [`ClipTool`] backed by the `ffmpeg` binary.
pub struct Ffmpeg {
    program: PathBuf,
    sample_rate: u32,
    bitrate: String,
    timeout: Duration,
}

impl Ffmpeg {
    pub fn from_config(config: &AudioConfig) -> Self {
        Self {
            program: config.ffmpeg_path.clone(),
            sample_rate: config.silence_sample_rate,
            bitrate: config.silence_bitrate.clone(),
            timeout: config.process_timeout(),
        }
    }

    fn silence_args(&self, duration_ms: u64, out: &Path) -> Vec<OsString> {
        let source = format!(
            "anullsrc=r={}:cl=mono:d={:.3}",
            self.sample_rate,
            duration_ms as f64 / 1000.0
        );
        let mut args: Vec<OsString> = ["-y", "-f", "lavfi", "-i"].map(OsString::from).into();
        args.push(source.into());
        args.extend(["-c:a", "libmp3lame", "-b:a"].map(OsString::from));
        args.push(self.bitrate.clone().into());
        args.push(out.as_os_str().to_owned());
        args
    }

    fn concat_args(manifest: &Path, out: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-y", "-f", "concat", "-safe", "0", "-i"]
            .map(OsString::from)
            .into();
        args.push(manifest.as_os_str().to_owned());
        args.extend(["-c", "copy"].map(OsString::from));
        args.push(out.as_os_str().to_owned());
        args
    }

    async fn run(&self, args: Vec<OsString>) -> Result<(), ClipToolError> {
        let program = self.program.display().to_string();
        log::debug!("audio: running {program} {args:?}");

        let child = tokio::process::Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ClipToolError::Spawn {
                program: program.clone(),
                source,
            })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|source| ClipToolError::Spawn {
                program: program.clone(),
                source,
            })?,
            Err(_) => {
                return Err(ClipToolError::Timeout {
                    program,
                    secs: self.timeout.as_secs(),
                })
            }
        };

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(ClipToolError::Failed {
                program,
                status: output.status.to_string(),
                stderr: tail(&stderr, 5),
            })
        }
    }
}

#[async_trait]
impl ClipTool for Ffmpeg {
    async fn silence(&self, duration_ms: u64, out: &Path) -> Result<(), ClipToolError> {
        self.run(self.silence_args(duration_ms, out)).await
    }

    async fn concat(&self, manifest: &Path, out: &Path) -> Result<(), ClipToolError> {
        self.run(Self::concat_args(manifest, out)).await
    }
}

/// Last `n` non-empty lines of `text`.
fn tail(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    lines[lines.len().saturating_sub(n)..].join("\n")
}

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

/// `file '<path>'` line of a concat manifest, with single quotes escaped.
pub fn manifest_line(path: &Path) -> String {
    let escaped = path.display().to_string().replace('\'', r"'\''");
    format!("file '{escaped}'")
}

/// Write the concat manifest listing `clips` in order.
pub async fn write_manifest(clips: &[PathBuf], manifest: &Path) -> std::io::Result<()> {
    let mut body = String::new();
    for clip in clips {
        body.push_str(&manifest_line(clip));
        body.push('\n');
    }
    tokio::fs::write(manifest, body).await
}
