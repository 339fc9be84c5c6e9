//! Command-line front end — annotate one audio file.
//!
//! Usage:
//!   moratime audio.wav --transcript transcript.json
//!   moratime audio.wav --transcript transcript.json --mapping files/mapping.json \
//!       --config pipeline.json --output query.json

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use moratime::{MoraPipeline, PipelineConfig, TranscriptFile};

#[derive(Debug, Parser)]
#[command(name = "moratime", version, about = "Mora timing and pitch annotation")]
struct Args {
    /// WAV file to analyse.
    audio: PathBuf,

    /// Word-timestamped transcription (whisper_timestamped JSON layout).
    #[arg(long)]
    transcript: PathBuf,

    /// Symbol → consonant/vowel table. A missing file yields null phonetics.
    #[arg(long, default_value = "files/mapping.json")]
    mapping: PathBuf,

    /// Pipeline configuration (JSON). Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the audio query here instead of stdout.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("Cannot load config: {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    let pipeline = MoraPipeline::load(config, &args.mapping)
        .with_context(|| format!("Cannot load mapping: {}", args.mapping.display()))?;

    let query = pipeline
        .run(&args.audio, &TranscriptFile::new(&args.transcript))
        .with_context(|| format!("Annotation failed for {}", args.audio.display()))?;

    let json = serde_json::to_string_pretty(&query).context("Cannot serialise audio query")?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Cannot write {}", path.display()))?;
            info!(path = %path.display(), phrases = query.accent_phrases.len(), "saved audio query");
        }
        None => println!("{json}"),
    }
    Ok(())
}
