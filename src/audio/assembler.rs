//! Multi-speaker audio assembly for a question.
//!
//! ```text
//! QuestionRecord → ConversationParser → turns → plan_segments
//!   → speech clips (SpeechSynthesizer) + silence clips (ClipTool)
//!   → manifest → ClipTool::concat → question_<timestamp>_<id>.mp3
//! ```
//!
//! Intermediate clips live in a [`RunWorkspace`] that is removed whether the
//! run succeeds or not. On failure the partially written output file is
//! deleted as well.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::audio::plan::{plan_segments, Segment};
use crate::audio::tool::{write_manifest, ClipTool};
use crate::audio::workspace::{sweep_stale_runs, RunWorkspace};
use crate::config::{AudioConfig, SpeechConfig};
use crate::conversation::{ConversationParser, ConversationTurn, Gender};
use crate::error::AudioAssemblyError;
use crate::provider::{SpeechRequest, SpeechSynthesizer};
use crate::question::QuestionRecord;

pub struct AudioAssembler {
    parser: ConversationParser,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    tool: Arc<dyn ClipTool>,
    speech: SpeechConfig,
    audio: AudioConfig,
}

impl AudioAssembler {
    pub fn new(
        parser: ConversationParser,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        tool: Arc<dyn ClipTool>,
        speech: SpeechConfig,
        audio: AudioConfig,
    ) -> Self {
        Self {
            parser,
            synthesizer,
            tool,
            speech,
            audio,
        }
    }

    /// Produce the audio file for `record` and return its path.
    pub async fn assemble(&self, record: &QuestionRecord) -> Result<PathBuf, AudioAssemblyError> {
        sweep_stale_runs(&self.audio.temp_dir, self.audio.stale_run_age());
        let turns = self.parser.parse(record).await?;
        self.assemble_turns(&turns).await
    }

    /// Produce the audio file for already parsed `turns`.
    pub async fn assemble_turns(
        &self,
        turns: &[ConversationTurn],
    ) -> Result<PathBuf, AudioAssemblyError> {
        if turns.is_empty() {
            return Err(AudioAssemblyError::NoClips);
        }
        tokio::fs::create_dir_all(&self.audio.output_dir).await?;
        let workspace = RunWorkspace::create(&self.audio.temp_dir)?;
        let output = self.audio.output_dir.join(output_file_name(&self.speech.output_format));

        let result = self.render(turns, &workspace, &output).await;

        if result.is_err() {
            remove_partial(&output).await;
        }
        if let Err(e) = workspace.close() {
            log::warn!("audio: cannot remove run workspace: {e}");
        }

        result?;
        log::info!("audio: wrote {} ({} turns)", output.display(), turns.len());
        Ok(output)
    }

    async fn render(
        &self,
        turns: &[ConversationTurn],
        workspace: &RunWorkspace,
        output: &Path,
    ) -> Result<(), AudioAssemblyError> {
        let mut silences: HashMap<u64, PathBuf> = HashMap::new();
        let mut clips = Vec::new();

        for segment in plan_segments(turns) {
            let clip = match segment {
                Segment::Speech(index) => self.speech_clip(index, &turns[index], workspace).await?,
                Segment::Silence(pause) => {
                    let ms = pause.duration_ms(&self.audio.pauses);
                    if ms == 0 {
                        continue;
                    }
                    match silences.get(&ms) {
                        Some(path) => path.clone(),
                        None => {
                            let path = workspace.file(&format!("silence_{ms}ms.mp3"));
                            self.tool
                                .silence(ms, &path)
                                .await
                                .map_err(AudioAssemblyError::Silence)?;
                            silences.insert(ms, path.clone());
                            path
                        }
                    }
                }
            };

            if tokio::fs::metadata(&clip).await?.len() == 0 {
                log::warn!("audio: skipping empty clip {}", clip.display());
                continue;
            }
            clips.push(clip);
        }

        if clips.is_empty() {
            return Err(AudioAssemblyError::NoClips);
        }

        let manifest = workspace.file("list.txt");
        write_manifest(&clips, &manifest).await?;
        self.tool
            .concat(&manifest, output)
            .await
            .map_err(AudioAssemblyError::Concat)
    }

    async fn speech_clip(
        &self,
        index: usize,
        turn: &ConversationTurn,
        workspace: &RunWorkspace,
    ) -> Result<PathBuf, AudioAssemblyError> {
        let voice = self.voice_for(turn);
        let request = SpeechRequest::from_config(&self.speech, &turn.text, voice);
        let bytes = self
            .synthesizer
            .synthesize(&request)
            .await
            .map_err(|source| AudioAssemblyError::Synthesis { index, source })?;

        let path = workspace.file(&format!("speech_{index:03}.{}", self.speech.output_format));
        tokio::fs::write(&path, bytes).await?;
        log::debug!("audio: turn {index} {} as {voice}", turn.speaker);
        Ok(path)
    }

    /// The announcer always uses the male voice.
    fn voice_for(&self, turn: &ConversationTurn) -> &str {
        let gender = if turn.is_announcer() {
            Gender::Male
        } else {
            turn.gender
        };
        match gender {
            Gender::Male => &self.speech.voices.male,
            Gender::Female => &self.speech.voices.female,
        }
    }
}

/// `question_<YYYYmmdd_HHMMSS>_<8 hex>.<ext>`; the suffix keeps runs within
/// the same second apart.
fn output_file_name(extension: &str) -> String {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("question_{stamp}_{}.{extension}", &id[..8])
}

async fn remove_partial(output: &Path) {
    match tokio::fs::remove_file(output).await {
        Ok(()) => log::warn!("audio: removed partial output {}", output.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::error!("audio: cannot remove partial output {}: {e}", output.display()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
