//! Audio assembly: turns → speech and silence clips → one audio file.
//!
//! # Pipeline
//!
//! ```text
//! turns → plan_segments → speech (SpeechSynthesizer) / silence (ClipTool)
//!       → concat manifest → ClipTool::concat → output file
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use listening_comp::audio::{AudioAssembler, Ffmpeg};
//! use listening_comp::config::AppConfig;
//! use listening_comp::conversation::ConversationParser;
//! use listening_comp::provider::{ApiGenerator, ApiSynthesizer};
//! use listening_comp::question::QuestionRecord;
//!
//! # async fn run(record: QuestionRecord) -> anyhow::Result<()> {
//! let config = AppConfig::load()?;
//! let parser = ConversationParser::new(
//!     Arc::new(ApiGenerator::from_config(&config.generation)),
//!     &config.generation,
//!     config.retry.into(),
//! );
//! let assembler = AudioAssembler::new(
//!     parser,
//!     Arc::new(ApiSynthesizer::from_config(&config.speech)),
//!     Arc::new(Ffmpeg::from_config(&config.audio)),
//!     config.speech.clone(),
//!     config.audio.clone(),
//! );
//! let path = assembler.assemble(&record).await?;
//! println!("{}", path.display());
//! # Ok(())
//! # }
//! ```

pub mod assembler;
pub mod plan;
pub mod tool;
pub mod workspace;

pub use assembler::AudioAssembler;
pub use plan::{plan_segments, Pause, Segment};
pub use tool::{manifest_line, write_manifest, ClipTool, Ffmpeg};
pub use workspace::{sweep_stale_runs, RunWorkspace};
