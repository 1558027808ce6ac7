//! Command-line entry point for the listening-comprehension pipeline.
//!
//! # Startup sequence
//!
//! 1. Initialise logging (`RUST_LOG`, default `info`).
//! 2. Load [`AppConfig`] from `--config` or the platform settings file
//!    (defaults on first run), then apply the API key environment override.
//! 3. Build the HTTP providers the chosen subcommand needs.
//! 4. Run the subcommand and print its result to stdout.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use listening_comp::audio::{AudioAssembler, Ffmpeg};
use listening_comp::config::{AppConfig, API_KEY_ENV};
use listening_comp::conversation::ConversationParser;
use listening_comp::provider::{ApiEmbedder, ApiGenerator, ApiSynthesizer, TextGenerator};
use listening_comp::question::{QuestionGenerator, QuestionRecord};
use listening_comp::retry::RetryPolicy;
use listening_comp::store::QuestionVectorStore;
use listening_comp::transcript::{load_transcript, save_questions, TranscriptStructurer};

/// French listening-comprehension question pipeline.
#[derive(Parser, Debug)]
#[command(name = "listening-comp", version, about)]
struct Cli {
    /// Settings file to use instead of the platform default.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract `<question>` blocks from a transcript.
    Structure {
        transcript: PathBuf,
        /// Write the blocks here instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Index structured question files into the vector store.
    Index {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Show the stored questions nearest to a query.
    Search {
        query: String,
        #[arg(short, default_value_t = 3)]
        k: usize,
    },
    /// Generate a new question about a topic.
    Generate { topic: String },
    /// Grade a selected option (1-4) of a question.
    Feedback {
        #[command(flatten)]
        source: RecordSource,
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=4))]
        selected: u8,
    },
    /// Synthesize the audio for a question.
    Audio {
        #[command(flatten)]
        source: RecordSource,
    },
}

/// Where a question record comes from.
#[derive(Args, Debug)]
struct RecordSource {
    /// Stored question id (`{video_id}_{index}`).
    #[arg(long, conflicts_with = "record")]
    id: Option<String>,
    /// JSON file containing a question record.
    #[arg(long)]
    record: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    match cli.command {
        Command::Structure { transcript, output } => {
            let structurer = TranscriptStructurer::new(generator(&config), &config.generation);
            let text = load_transcript(&transcript)?;
            let blocks = structurer.structure(&text).await?;
            match output {
                Some(path) => save_questions(&blocks, &path)?,
                None => println!("{blocks}"),
            }
        }
        Command::Index { files } => {
            let mut store = open_store(&config)?;
            for file in &files {
                let indexed = store
                    .index_file(file)
                    .await
                    .with_context(|| format!("indexing {}", file.display()))?;
                println!("{}: {} questions", file.display(), indexed.len());
            }
            if store.degraded_count() > 0 {
                log::warn!(
                    "{} stored questions have zero-vector embeddings",
                    store.degraded_count()
                );
            }
        }
        Command::Search { query, k } => {
            let store = open_store(&config)?;
            for hit in store.search(&query, k).await {
                println!(
                    "{:.4}\t{}\t{}\t{}",
                    hit.similarity_score,
                    hit.id,
                    hit.record.question,
                    hit.record.correct_option().unwrap_or("-")
                );
            }
        }
        Command::Generate { topic } => {
            let questions = question_generator(&config)?;
            let Some(generated) = questions.generate(&topic).await else {
                bail!("no question could be generated for {topic:?}");
            };
            if generated.placeholder_options {
                log::warn!("generated question has placeholder options");
            }
            println!("{}", serde_json::to_string_pretty(&generated.record)?);
        }
        Command::Feedback { source, selected } => {
            let questions = question_generator(&config)?;
            let record = resolve_record(&source, Some(questions.store()))?;
            let feedback = questions.feedback(&record, selected).await;
            println!("{}", serde_json::to_string_pretty(&feedback)?);
        }
        Command::Audio { source } => {
            let store = if source.id.is_some() {
                Some(open_store(&config)?)
            } else {
                None
            };
            let record = resolve_record(&source, store.as_ref())?;
            let parser = ConversationParser::new(
                generator(&config),
                &config.generation,
                RetryPolicy::from(config.retry),
            );
            let assembler = AudioAssembler::new(
                parser,
                Arc::new(ApiSynthesizer::from_config(&config.speech)),
                Arc::new(Ffmpeg::from_config(&config.audio)),
                config.speech.clone(),
                config.audio.clone(),
            );
            let path = assembler.assemble(&record).await?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Wiring helpers
// ---------------------------------------------------------------------------

fn load_config(path: Option<&Path>) -> AppConfig {
    let loaded = match path {
        Some(path) => AppConfig::load_from(path).map(|mut config| {
            config.apply_api_key(std::env::var(API_KEY_ENV).ok());
            config
        }),
        None => AppConfig::load(),
    };
    loaded.unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        let mut config = AppConfig::default();
        config.apply_api_key(std::env::var(API_KEY_ENV).ok());
        config
    })
}

fn generator(config: &AppConfig) -> Arc<dyn TextGenerator> {
    Arc::new(ApiGenerator::from_config(&config.generation))
}

fn open_store(config: &AppConfig) -> Result<QuestionVectorStore> {
    let embedder = Arc::new(ApiEmbedder::from_config(&config.embedding));
    QuestionVectorStore::open(&config.store, embedder, config.embedding.dimensions)
        .context("opening the question store")
}

fn question_generator(config: &AppConfig) -> Result<QuestionGenerator> {
    Ok(QuestionGenerator::new(
        generator(config),
        open_store(config)?,
        &config.generation,
        RetryPolicy::from(config.retry),
    ))
}

fn resolve_record(
    source: &RecordSource,
    store: Option<&QuestionVectorStore>,
) -> Result<QuestionRecord> {
    match (&source.id, &source.record, store) {
        (Some(id), _, Some(store)) => store
            .get(id)
            .with_context(|| format!("no stored question with id {id}")),
        (_, Some(path), _) => {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            serde_json::from_str(&data)
                .with_context(|| format!("invalid record in {}", path.display()))
        }
        _ => bail!("pass either --id or --record"),
    }
}
